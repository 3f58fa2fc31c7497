//! Session storage trait.

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::SessionEndReason;

/// Storage operations for active device/web sessions.
///
/// Session creation belongs to the hosting layer; this subsystem only
/// terminates sessions with a reason taxonomy.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Marks the session ended with the given reason.
    ///
    /// # Errors
    ///
    /// Returns `EntityNotFound` if the session doesn't exist, or another
    /// error if the storage operation fails.
    async fn end_session(&self, session_key: &str, reason: SessionEndReason) -> AuthResult<()>;
}
