//! Account storage trait.

use async_trait::async_trait;
use medibay_core::AccountKey;
use time::OffsetDateTime;

use crate::AuthResult;
use crate::federation::FederationProfile;
use crate::types::Account;

/// Storage operations for accounts.
///
/// User ids passed to the lookup methods are trimmed and lowercased by the
/// resolver before they arrive here.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Finds an account by surrogate key.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_key(&self, key: AccountKey) -> AuthResult<Option<Account>>;

    /// Finds the local (non-domain) account with the given user id.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_local_by_user_id(&self, user_id: &str) -> AuthResult<Option<Account>>;

    /// Finds the account with the given user id inside one domain.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_domain_by_user_id(
        &self,
        domain: &str,
        user_id: &str,
    ) -> AuthResult<Option<Account>>;

    /// Finds every account matching the user id across the local store and
    /// all domains.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_all_by_user_id(&self, user_id: &str) -> AuthResult<Vec<Account>>;

    /// Finds an account by device scan code.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_scan_code(&self, scan_code: &str) -> AuthResult<Option<Account>>;

    /// Creates or updates the local surrogate for a federated support
    /// account, keyed by its canonical profile. Returns the stored account
    /// with its non-zero surrogate key.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn upsert_support_account(&self, profile: &FederationProfile) -> AuthResult<Account>;

    /// Records one authentication failure and returns the new consecutive
    /// failure count.
    ///
    /// # Errors
    ///
    /// Returns an error if the account doesn't exist or the storage
    /// operation fails.
    async fn record_failure(&self, key: AccountKey) -> AuthResult<u32>;

    /// Clears the consecutive failure count after a success.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn clear_failures(&self, key: AccountKey) -> AuthResult<()>;

    /// Sets or clears the locked flag.
    ///
    /// # Errors
    ///
    /// Returns an error if the account doesn't exist or the storage
    /// operation fails.
    async fn set_locked(&self, key: AccountKey, locked: bool) -> AuthResult<()>;

    /// Updates the last-successful-authentication timestamp.
    /// Last-write-wins under concurrent requests for the same account.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn touch_last_success(&self, key: AccountKey, at: OffsetDateTime) -> AuthResult<()>;

    /// Associates a badge card serial with the account.
    ///
    /// # Errors
    ///
    /// Returns an error if the account doesn't exist or the storage
    /// operation fails.
    async fn set_card_serial(&self, key: AccountKey, serial: &str) -> AuthResult<()>;

    /// Associates an RFID card serial with the account.
    ///
    /// # Errors
    ///
    /// Returns an error if the account doesn't exist or the storage
    /// operation fails.
    async fn set_rfid_card_serial(&self, key: AccountKey, serial: &str) -> AuthResult<()>;

    /// Associates a fingerprint template reference with the account.
    ///
    /// # Errors
    ///
    /// Returns an error if the account doesn't exist or the storage
    /// operation fails.
    async fn set_fingerprint(&self, key: AccountKey, template: &str) -> AuthResult<()>;
}
