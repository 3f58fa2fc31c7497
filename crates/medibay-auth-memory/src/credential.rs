//! In-memory password-credential store.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use medibay_auth::AuthResult;
use medibay_auth::storage::CredentialStore;
use medibay_auth::types::PasswordRecord;
use medibay_core::{AccountKey, ServiceError};

struct Slot {
    current: PasswordRecord,
    /// Superseded records, most recent first.
    history: Vec<PasswordRecord>,
}

/// Credential store over a process-local map.
#[derive(Default)]
pub struct MemoryCredentialStore {
    slots: RwLock<HashMap<AccountKey, Slot>>,
}

impl MemoryCredentialStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with one active record per account.
    #[must_use]
    pub fn seeded(records: Vec<(AccountKey, PasswordRecord)>) -> Self {
        let slots = records
            .into_iter()
            .map(|(key, record)| {
                (
                    key,
                    Slot {
                        current: record,
                        history: Vec::new(),
                    },
                )
            })
            .collect();
        Self {
            slots: RwLock::new(slots),
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn current(&self, key: AccountKey) -> AuthResult<Option<PasswordRecord>> {
        let slots = crate::read(&self.slots)?;
        Ok(slots.get(&key).map(|slot| slot.current.clone()))
    }

    async fn history(&self, key: AccountKey, depth: u32) -> AuthResult<Vec<PasswordRecord>> {
        let slots = crate::read(&self.slots)?;
        Ok(slots
            .get(&key)
            .map(|slot| {
                slot.history
                    .iter()
                    .take(depth as usize)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn write(
        &self,
        key: AccountKey,
        mut record: PasswordRecord,
        expected_version: Option<u64>,
    ) -> AuthResult<()> {
        let mut slots = crate::write(&self.slots)?;
        match slots.get_mut(&key) {
            Some(slot) => {
                if expected_version != Some(slot.current.version) {
                    return Err(ServiceError::data_conflict(
                        "credential version mismatch, reload and retry",
                    ));
                }
                record.version = slot.current.version + 1;
                let superseded = std::mem::replace(&mut slot.current, record);
                slot.history.insert(0, superseded);
            }
            None => {
                if expected_version.is_some() {
                    return Err(ServiceError::data_conflict(
                        "credential version mismatch, reload and retry",
                    ));
                }
                record.version = 1;
                slots.insert(
                    key,
                    Slot {
                        current: record,
                        history: Vec::new(),
                    },
                );
            }
        }
        Ok(())
    }
}
