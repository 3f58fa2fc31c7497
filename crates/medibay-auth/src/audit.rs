//! Authentication audit events.
//!
//! Every authentication attempt, success or failure, persists exactly one
//! immutable [`AuditEvent`]. The only later mutation permitted is the
//! one-time witness-confirmation linkage.

use std::sync::Arc;

use medibay_core::{AccountKey, EventKey};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::AuthResult;
use crate::storage::AuthEventStore;
use crate::types::{AuthMethod, AuthPurpose};

/// One recorded authentication attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Event key.
    pub key: EventKey,

    /// Account the attempt was made against. Zero when resolution never
    /// produced an account.
    pub account_key: AccountKey,

    /// User id as resolved (never the typed password, never raw card
    /// data).
    pub user_id: String,

    /// When the attempt happened.
    #[serde(with = "time::serde::rfc3339")]
    pub occurred_at: OffsetDateTime,

    /// How the credential was presented.
    pub method: AuthMethod,

    /// Why the credential was presented.
    pub purpose: AuthPurpose,

    /// Whether the attempt succeeded. Set exactly once at creation.
    pub success: bool,

    /// Whether the attempt triggered lockout interpretation (warn or
    /// lock). Set exactly once at creation.
    pub lockout: bool,

    /// Failure reason, for failed attempts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,

    /// Key of the witness event later linked to this one, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub witness_event: Option<EventKey>,
}

impl AuditEvent {
    /// Creates an event for a successful attempt.
    #[must_use]
    pub fn success(
        account_key: AccountKey,
        user_id: impl Into<String>,
        method: AuthMethod,
        purpose: AuthPurpose,
    ) -> Self {
        Self {
            key: EventKey::generate(),
            account_key,
            user_id: user_id.into(),
            occurred_at: OffsetDateTime::now_utc(),
            method,
            purpose,
            success: true,
            lockout: false,
            failure_reason: None,
            witness_event: None,
        }
    }

    /// Creates an event for a failed attempt.
    #[must_use]
    pub fn failure(
        account_key: AccountKey,
        user_id: impl Into<String>,
        method: AuthMethod,
        purpose: AuthPurpose,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            key: EventKey::generate(),
            account_key,
            user_id: user_id.into(),
            occurred_at: OffsetDateTime::now_utc(),
            method,
            purpose,
            success: false,
            lockout: false,
            failure_reason: Some(reason.into()),
            witness_event: None,
        }
    }

    /// Flags the event as part of lockout interpretation.
    #[must_use]
    pub fn with_lockout(mut self, lockout: bool) -> Self {
        self.lockout = lockout;
        self
    }
}

/// Records authentication attempts and serves later lookups.
pub struct AuthenticationEventRecorder {
    store: Arc<dyn AuthEventStore>,
}

impl AuthenticationEventRecorder {
    /// Creates a recorder over the given event store.
    #[must_use]
    pub fn new(store: Arc<dyn AuthEventStore>) -> Self {
        Self { store }
    }

    /// Persists one event.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    pub async fn record(&self, event: AuditEvent) -> AuthResult<()> {
        tracing::debug!(
            event = %event.key,
            account = %event.account_key,
            success = event.success,
            lockout = event.lockout,
            "recording authentication event"
        );
        self.store.append(event).await
    }

    /// Returns the most recent successful attempt for an account, used to
    /// show last-sign-in information.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    pub async fn last_successful(&self, key: AccountKey) -> AuthResult<Option<AuditEvent>> {
        self.store.last_successful(key).await
    }

    /// Links a witness/co-sign event back to an original authentication
    /// event.
    ///
    /// # Errors
    ///
    /// Returns `EntityNotFound` if the original event doesn't exist or
    /// `DataConflict` if it is already linked.
    pub async fn link_witness(&self, event: EventKey, witness: EventKey) -> AuthResult<()> {
        self.store.link_witness(event, witness).await
    }
}
