//! In-memory session store.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use medibay_auth::AuthResult;
use medibay_auth::storage::SessionStore;
use medibay_auth::types::SessionEndReason;

/// Session store over a process-local map of session key to end reason.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, Option<SessionEndReason>>>,
}

impl MemorySessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store with the given active sessions.
    #[must_use]
    pub fn seeded(session_keys: Vec<&str>) -> Self {
        Self {
            sessions: RwLock::new(
                session_keys
                    .into_iter()
                    .map(|k| (k.to_string(), None))
                    .collect(),
            ),
        }
    }

    /// Returns the reason a session ended with, if it has ended, for
    /// inspection in tests.
    #[must_use]
    pub fn end_reason(&self, session_key: &str) -> Option<SessionEndReason> {
        self.sessions
            .read()
            .ok()
            .and_then(|sessions| sessions.get(session_key).copied().flatten())
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn end_session(&self, session_key: &str, reason: SessionEndReason) -> AuthResult<()> {
        let mut sessions = crate::write(&self.sessions)?;
        let slot = sessions.get_mut(session_key).ok_or_else(|| {
            medibay_core::ServiceError::entity_not_found("Session", session_key)
        })?;
        *slot = Some(reason);
        Ok(())
    }
}
