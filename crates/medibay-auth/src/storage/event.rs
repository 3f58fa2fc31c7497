//! Authentication audit-event storage trait.

use async_trait::async_trait;
use medibay_core::{AccountKey, EventKey};

use crate::AuthResult;
use crate::audit::AuditEvent;

/// Append-only storage for authentication audit events.
///
/// Events are immutable after creation except for the one-time witness
/// linkage.
#[async_trait]
pub trait AuthEventStore: Send + Sync {
    /// Appends one event.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn append(&self, event: AuditEvent) -> AuthResult<()>;

    /// Returns the most recent successful event for an account.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn last_successful(&self, key: AccountKey) -> AuthResult<Option<AuditEvent>>;

    /// Links a later witness event back to an original authentication
    /// event. The linkage may be set at most once.
    ///
    /// # Errors
    ///
    /// Returns `EntityNotFound` if the original event doesn't exist,
    /// `DataConflict` if it is already linked, or another error if the
    /// storage operation fails.
    async fn link_witness(&self, event: EventKey, witness: EventKey) -> AuthResult<()>;
}
