//! In-memory account store.

use std::sync::RwLock;

use async_trait::async_trait;
use medibay_auth::AuthResult;
use medibay_auth::federation::FederationProfile;
use medibay_auth::storage::AccountStore;
use medibay_auth::types::Account;
use medibay_core::{AccountKey, ServiceError};
use time::OffsetDateTime;

struct Entry {
    account: Account,
    failures: u32,
    last_success: Option<OffsetDateTime>,
}

/// Account store over a process-local list.
///
/// Insertion order is preserved, so multi-match resolution sees accounts
/// in the order they were seeded.
#[derive(Default)]
pub struct MemoryAccountStore {
    entries: RwLock<Vec<Entry>>,
}

impl MemoryAccountStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with the given accounts.
    #[must_use]
    pub fn seeded(accounts: Vec<Account>) -> Self {
        let entries = accounts
            .into_iter()
            .map(|account| Entry {
                account,
                failures: 0,
                last_success: None,
            })
            .collect();
        Self {
            entries: RwLock::new(entries),
        }
    }

    /// Returns the last successful authentication time recorded for an
    /// account, for inspection in tests.
    #[must_use]
    pub fn last_success(&self, key: AccountKey) -> Option<OffsetDateTime> {
        self.entries
            .read()
            .ok()
            .and_then(|entries| {
                entries
                    .iter()
                    .find(|e| e.account.key == key)
                    .and_then(|e| e.last_success)
            })
    }

    /// Returns the consecutive failure count for an account, for
    /// inspection in tests.
    #[must_use]
    pub fn failure_count(&self, key: AccountKey) -> u32 {
        self.entries
            .read()
            .map(|entries| {
                entries
                    .iter()
                    .find(|e| e.account.key == key)
                    .map_or(0, |e| e.failures)
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn find_by_key(&self, key: AccountKey) -> AuthResult<Option<Account>> {
        let entries = crate::read(&self.entries)?;
        Ok(entries
            .iter()
            .find(|e| e.account.key == key)
            .map(|e| e.account.clone()))
    }

    async fn find_local_by_user_id(&self, user_id: &str) -> AuthResult<Option<Account>> {
        let entries = crate::read(&self.entries)?;
        Ok(entries
            .iter()
            .find(|e| e.account.is_local() && e.account.user_id == user_id)
            .map(|e| e.account.clone()))
    }

    async fn find_domain_by_user_id(
        &self,
        domain: &str,
        user_id: &str,
    ) -> AuthResult<Option<Account>> {
        let entries = crate::read(&self.entries)?;
        Ok(entries
            .iter()
            .find(|e| {
                e.account.domain.as_deref() == Some(domain) && e.account.user_id == user_id
            })
            .map(|e| e.account.clone()))
    }

    async fn find_all_by_user_id(&self, user_id: &str) -> AuthResult<Vec<Account>> {
        let entries = crate::read(&self.entries)?;
        Ok(entries
            .iter()
            .filter(|e| e.account.user_id == user_id)
            .map(|e| e.account.clone())
            .collect())
    }

    async fn find_by_scan_code(&self, scan_code: &str) -> AuthResult<Option<Account>> {
        let entries = crate::read(&self.entries)?;
        Ok(entries
            .iter()
            .find(|e| e.account.scan_code.as_deref() == Some(scan_code))
            .map(|e| e.account.clone()))
    }

    async fn upsert_support_account(&self, profile: &FederationProfile) -> AuthResult<Account> {
        let mut entries = crate::write(&self.entries)?;
        let user_id = profile.user_id.to_lowercase();

        if let Some(entry) = entries
            .iter_mut()
            .find(|e| e.account.support_user && e.account.user_id == user_id)
        {
            if !entry.account.is_synced() {
                entry.account.key = AccountKey::generate();
            }
            entry.account.first_name = profile.first_name.clone();
            entry.account.last_name = profile.last_name.clone();
            return Ok(entry.account.clone());
        }

        let mut builder = Account::builder(&user_id).support_user(true);
        if let Some(first) = &profile.first_name {
            builder = builder.first_name(first);
        }
        if let Some(last) = &profile.last_name {
            builder = builder.last_name(last);
        }
        let account = builder.build();
        entries.push(Entry {
            account: account.clone(),
            failures: 0,
            last_success: None,
        });
        Ok(account)
    }

    async fn record_failure(&self, key: AccountKey) -> AuthResult<u32> {
        let mut entries = crate::write(&self.entries)?;
        let entry = entries
            .iter_mut()
            .find(|e| e.account.key == key)
            .ok_or_else(|| ServiceError::entity_not_found("Account", key.to_string()))?;
        entry.failures += 1;
        Ok(entry.failures)
    }

    async fn clear_failures(&self, key: AccountKey) -> AuthResult<()> {
        let mut entries = crate::write(&self.entries)?;
        if let Some(entry) = entries.iter_mut().find(|e| e.account.key == key) {
            entry.failures = 0;
        }
        Ok(())
    }

    async fn set_locked(&self, key: AccountKey, locked: bool) -> AuthResult<()> {
        let mut entries = crate::write(&self.entries)?;
        let entry = entries
            .iter_mut()
            .find(|e| e.account.key == key)
            .ok_or_else(|| ServiceError::entity_not_found("Account", key.to_string()))?;
        entry.account.locked = locked;
        Ok(())
    }

    async fn touch_last_success(&self, key: AccountKey, at: OffsetDateTime) -> AuthResult<()> {
        let mut entries = crate::write(&self.entries)?;
        if let Some(entry) = entries.iter_mut().find(|e| e.account.key == key) {
            entry.last_success = Some(at);
        }
        Ok(())
    }

    async fn set_card_serial(&self, key: AccountKey, serial: &str) -> AuthResult<()> {
        self.update(key, |account| {
            account.card_serial = Some(serial.to_string());
        })
    }

    async fn set_rfid_card_serial(&self, key: AccountKey, serial: &str) -> AuthResult<()> {
        self.update(key, |account| {
            account.rfid_card_serial = Some(serial.to_string());
        })
    }

    async fn set_fingerprint(&self, key: AccountKey, template: &str) -> AuthResult<()> {
        self.update(key, |account| {
            account.fingerprint = Some(template.to_string());
        })
    }
}

impl MemoryAccountStore {
    fn update(&self, key: AccountKey, apply: impl FnOnce(&mut Account)) -> AuthResult<()> {
        let mut entries = crate::write(&self.entries)?;
        let entry = entries
            .iter_mut()
            .find(|e| e.account.key == key)
            .ok_or_else(|| ServiceError::entity_not_found("Account", key.to_string()))?;
        apply(&mut entry.account);
        Ok(())
    }
}
