//! Identity-domain storage trait.

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::IdentityDomain;

/// Storage operations for configured identity domains.
#[async_trait]
pub trait DomainStore: Send + Sync {
    /// Finds the domain entry for a fully-qualified name.
    ///
    /// At most one entry exists per name.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_name(&self, name: &str) -> AuthResult<Option<IdentityDomain>>;

    /// Lists every configured domain.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn list(&self) -> AuthResult<Vec<IdentityDomain>>;
}
