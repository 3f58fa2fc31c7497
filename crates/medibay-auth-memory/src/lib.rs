//! In-memory storage backend for the medibay authentication subsystem.
//!
//! This crate implements every storage trait of `medibay-auth` over plain
//! process memory. It backs the integration tests and small embedded
//! deployments that run without a relational repository.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use medibay_auth::{Account, CredentialResolver};
//! use medibay_auth_memory::{MemoryAccountStore, MemoryDomainStore};
//!
//! let resolver = CredentialResolver::new(
//!     Arc::new(MemoryAccountStore::seeded(vec![Account::new("jdoe")])),
//!     Arc::new(MemoryDomainStore::new()),
//! );
//! ```

mod account;
mod credential;
mod dictionary;
mod domain;
mod event;
mod session;

pub use account::MemoryAccountStore;
pub use credential::MemoryCredentialStore;
pub use dictionary::MemoryDictionaryStore;
pub use domain::MemoryDomainStore;
pub use event::MemoryEventStore;
pub use session::MemorySessionStore;

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use medibay_auth::AuthResult;
use medibay_core::ServiceError;

// Lock poisoning surfaces as a storage failure rather than a panic, the
// same way a backend connection error would.
pub(crate) fn read<T>(lock: &RwLock<T>) -> AuthResult<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|_| ServiceError::unhandled("memory store lock poisoned"))
}

pub(crate) fn write<T>(lock: &RwLock<T>) -> AuthResult<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|_| ServiceError::unhandled("memory store lock poisoned"))
}
