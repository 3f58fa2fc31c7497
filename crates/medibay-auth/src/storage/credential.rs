//! Password-credential storage traits.

use async_trait::async_trait;
use medibay_core::AccountKey;

use crate::AuthResult;
use crate::types::PasswordRecord;

/// Storage operations for password credentials.
///
/// Each account holds exactly one active record; superseded records form
/// an ordered append-only history.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Returns the active password record for an account.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn current(&self, key: AccountKey) -> AuthResult<Option<PasswordRecord>>;

    /// Returns up to `depth` superseded records, most recent first.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn history(&self, key: AccountKey, depth: u32) -> AuthResult<Vec<PasswordRecord>>;

    /// Writes a new active record, moving the previous one into history.
    ///
    /// The write is guarded by optimistic concurrency: `expected_version`
    /// must match the current record's version (`None` when the account
    /// has no record yet).
    ///
    /// # Errors
    ///
    /// Returns `DataConflict` if the version check fails (retryable), or
    /// another error if the storage operation fails.
    async fn write(
        &self,
        key: AccountKey,
        record: PasswordRecord,
        expected_version: Option<u64>,
    ) -> AuthResult<()>;
}

/// Dictionary lookup consumed by the content-check rule.
#[async_trait]
pub trait DictionaryStore: Send + Sync {
    /// Returns `true` if the candidate matches a known dictionary word.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn contains_word(&self, candidate: &str) -> AuthResult<bool>;
}
