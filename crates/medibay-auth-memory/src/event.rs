//! In-memory authentication audit-event store.

use std::sync::RwLock;

use async_trait::async_trait;
use medibay_auth::AuthResult;
use medibay_auth::audit::AuditEvent;
use medibay_auth::storage::AuthEventStore;
use medibay_core::{AccountKey, EventKey, ServiceError};

/// Append-only event store over a process-local list.
#[derive(Default)]
pub struct MemoryEventStore {
    events: RwLock<Vec<AuditEvent>>,
}

impl MemoryEventStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of every recorded event, in append order, for
    /// inspection in tests.
    #[must_use]
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events
            .read()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl AuthEventStore for MemoryEventStore {
    async fn append(&self, event: AuditEvent) -> AuthResult<()> {
        let mut events = crate::write(&self.events)?;
        events.push(event);
        Ok(())
    }

    async fn last_successful(&self, key: AccountKey) -> AuthResult<Option<AuditEvent>> {
        let events = crate::read(&self.events)?;
        Ok(events
            .iter()
            .rev()
            .find(|e| e.success && e.account_key == key)
            .cloned())
    }

    async fn link_witness(&self, event: EventKey, witness: EventKey) -> AuthResult<()> {
        let mut events = crate::write(&self.events)?;
        let original = events
            .iter_mut()
            .find(|e| e.key == event)
            .ok_or_else(|| ServiceError::entity_not_found("AuditEvent", event.to_string()))?;
        if original.witness_event.is_some() {
            return Err(ServiceError::data_conflict(
                "authentication event already has a witness linkage",
            ));
        }
        original.witness_event = Some(witness);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medibay_auth::types::{AuthMethod, AuthPurpose};

    #[tokio::test]
    async fn test_last_successful_skips_failures() {
        let store = MemoryEventStore::new();
        let key = AccountKey::generate();

        let success =
            AuditEvent::success(key, "jdoe", AuthMethod::Password, AuthPurpose::SignIn);
        let success_key = success.key;
        store.append(success).await.unwrap();
        store
            .append(AuditEvent::failure(
                key,
                "jdoe",
                AuthMethod::Password,
                AuthPurpose::SignIn,
                "invalid password",
            ))
            .await
            .unwrap();

        let last = store.last_successful(key).await.unwrap().unwrap();
        assert_eq!(last.key, success_key);
    }

    #[tokio::test]
    async fn test_witness_linkage_set_at_most_once() {
        let store = MemoryEventStore::new();
        let event = AuditEvent::success(
            AccountKey::generate(),
            "jdoe",
            AuthMethod::Rfid,
            AuthPurpose::Witness,
        );
        let key = event.key;
        store.append(event).await.unwrap();

        store.link_witness(key, EventKey::generate()).await.unwrap();
        let err = store
            .link_witness(key, EventKey::generate())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::DataConflict { .. }));

        let err = store
            .link_witness(EventKey::generate(), EventKey::generate())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::EntityNotFound { .. }));
    }
}
