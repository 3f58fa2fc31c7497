//! In-memory identity-domain store.

use std::sync::RwLock;

use async_trait::async_trait;
use medibay_auth::AuthResult;
use medibay_auth::storage::DomainStore;
use medibay_auth::types::IdentityDomain;

/// Domain store over a process-local list.
#[derive(Default)]
pub struct MemoryDomainStore {
    domains: RwLock<Vec<IdentityDomain>>,
}

impl MemoryDomainStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with the given domains.
    #[must_use]
    pub fn seeded(domains: Vec<IdentityDomain>) -> Self {
        Self {
            domains: RwLock::new(domains),
        }
    }
}

#[async_trait]
impl DomainStore for MemoryDomainStore {
    async fn find_by_name(&self, name: &str) -> AuthResult<Option<IdentityDomain>> {
        let domains = crate::read(&self.domains)?;
        Ok(domains.iter().find(|d| d.name == name).cloned())
    }

    async fn list(&self) -> AuthResult<Vec<IdentityDomain>> {
        let domains = crate::read(&self.domains)?;
        Ok(domains.clone())
    }
}
