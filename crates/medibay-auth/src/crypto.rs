//! Password encryption providers.
//!
//! The platform consumes encryption through a narrow contract keyed by an
//! algorithm identifier: `hash(text, salt)` and `verify(text, salt, hash)`.
//! Two providers ship with the subsystem: Argon2id (PHC-formatted hashes,
//! salt managed inside the hash string) and the legacy salted SHA-256
//! scheme still present on older credential records.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use rand::RngCore;
use sha2::{Digest, Sha256};

use medibay_core::ServiceError;

use crate::AuthResult;
use crate::types::EncryptionAlgorithm;

/// Contract of an encryption provider.
///
/// Implementations must be deterministic under `verify`: for any supported
/// algorithm, `verify(p, s, hash(p, s))` is `true` and `verify` with a
/// wrong password is `false`.
pub trait PasswordEncryptor: std::fmt::Debug + Send + Sync {
    /// Which algorithm this provider implements.
    fn algorithm(&self) -> EncryptionAlgorithm;

    /// Hashes `text` with an optional salt.
    ///
    /// # Errors
    ///
    /// Returns `Unhandled` if the underlying primitive fails.
    fn hash(&self, text: &str, salt: Option<&str>) -> AuthResult<String>;

    /// Verifies `text` against a stored hash.
    fn verify(&self, text: &str, salt: Option<&str>, hash: &str) -> bool;
}

/// Generates a random hex salt for providers that keep the salt outside
/// the hash string.
#[must_use]
pub fn generate_salt() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Argon2id provider producing PHC-formatted hashes.
///
/// The salt parameter is ignored: Argon2 embeds its own random salt in the
/// PHC string.
#[derive(Debug, Default)]
pub struct Argon2Encryptor;

impl PasswordEncryptor for Argon2Encryptor {
    fn algorithm(&self) -> EncryptionAlgorithm {
        EncryptionAlgorithm::Argon2id
    }

    fn hash(&self, text: &str, _salt: Option<&str>) -> AuthResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(text.as_bytes(), &salt)
            .map_err(|e| ServiceError::unhandled(format!("argon2 hashing failed: {e}")))?;
        Ok(hash.to_string())
    }

    fn verify(&self, text: &str, _salt: Option<&str>, hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            return false;
        };
        Argon2::default()
            .verify_password(text.as_bytes(), &parsed)
            .is_ok()
    }
}

/// Legacy salted SHA-256 provider.
///
/// Kept only to verify credential records created before the Argon2id
/// migration; new records are never written with this algorithm.
#[derive(Debug, Default)]
pub struct LegacySha256Encryptor;

impl LegacySha256Encryptor {
    fn digest(text: &str, salt: Option<&str>) -> String {
        let mut hasher = Sha256::new();
        if let Some(salt) = salt {
            hasher.update(salt.as_bytes());
        }
        hasher.update(text.as_bytes());
        hex::encode(hasher.finalize())
    }
}

impl PasswordEncryptor for LegacySha256Encryptor {
    fn algorithm(&self) -> EncryptionAlgorithm {
        EncryptionAlgorithm::LegacySha256
    }

    fn hash(&self, text: &str, salt: Option<&str>) -> AuthResult<String> {
        Ok(Self::digest(text, salt))
    }

    fn verify(&self, text: &str, salt: Option<&str>, hash: &str) -> bool {
        // Hex comparison of fixed-length digests; hashes are not secret
        // inputs here, the stored hash is already known to the caller.
        Self::digest(text, salt) == hash
    }
}

/// Registry resolving providers per algorithm identifier.
pub struct EncryptorRegistry {
    providers: Vec<Box<dyn PasswordEncryptor>>,
}

impl EncryptorRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Creates a registry with both shipped providers registered.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new()
            .register(Box::new(Argon2Encryptor))
            .register(Box::new(LegacySha256Encryptor))
    }

    /// Registers a provider.
    #[must_use]
    pub fn register(mut self, provider: Box<dyn PasswordEncryptor>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Resolves the provider for an algorithm.
    ///
    /// # Errors
    ///
    /// Returns `EntityNotFound` when no provider is registered for the
    /// algorithm.
    pub fn get(&self, algorithm: EncryptionAlgorithm) -> AuthResult<&dyn PasswordEncryptor> {
        self.providers
            .iter()
            .map(AsRef::as_ref)
            .find(|p| p.algorithm() == algorithm)
            .ok_or_else(|| {
                ServiceError::entity_not_found("EncryptionProvider", algorithm.as_str())
            })
    }
}

impl Default for EncryptorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
