//! Password credential records.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Identifier of the encryption provider a record was hashed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncryptionAlgorithm {
    /// Legacy salted SHA-256 scheme. Passwords are capped at 8 characters
    /// and may not contain punctuation or symbols.
    LegacySha256,
    /// Argon2id with PHC-formatted hashes.
    Argon2id,
}

impl EncryptionAlgorithm {
    /// Stable identifier used in persisted records.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LegacySha256 => "legacy-sha256",
            Self::Argon2id => "argon2id",
        }
    }

    /// Returns `true` for the legacy scheme.
    #[must_use]
    pub fn is_legacy(&self) -> bool {
        matches!(self, Self::LegacySha256)
    }
}

impl std::fmt::Display for EncryptionAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A stored password credential.
///
/// Exactly one record is active per account; superseded records form an
/// ordered append-only history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordRecord {
    /// Hash in the provider's own format.
    pub hash: String,

    /// Salt, for providers that keep it outside the hash string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salt: Option<String>,

    /// Which provider produced the hash.
    pub algorithm: EncryptionAlgorithm,

    /// When the user last changed the password themselves. `None` means
    /// the user has never self-changed it (provisioned or reset by an
    /// administrator), which by definition means the password is expired
    /// and must be changed at next login.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub last_self_change: Option<OffsetDateTime>,

    /// When the record was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// Optimistic-concurrency token, bumped on every write.
    #[serde(default)]
    pub version: u64,
}

impl PasswordRecord {
    /// Creates a new record for a freshly hashed password.
    #[must_use]
    pub fn new(
        hash: impl Into<String>,
        salt: Option<String>,
        algorithm: EncryptionAlgorithm,
    ) -> Self {
        Self {
            hash: hash.into(),
            salt,
            algorithm,
            last_self_change: None,
            created_at: OffsetDateTime::now_utc(),
            version: 0,
        }
    }

    /// Marks the record as self-changed at the given instant.
    #[must_use]
    pub fn self_changed_at(mut self, at: OffsetDateTime) -> Self {
        self.last_self_change = Some(at);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_algorithm_identifiers() {
        assert_eq!(EncryptionAlgorithm::LegacySha256.as_str(), "legacy-sha256");
        assert_eq!(EncryptionAlgorithm::Argon2id.as_str(), "argon2id");
        assert!(EncryptionAlgorithm::LegacySha256.is_legacy());
        assert!(!EncryptionAlgorithm::Argon2id.is_legacy());
    }

    #[test]
    fn test_new_record_never_self_changed() {
        let record = PasswordRecord::new("$argon2id$...", None, EncryptionAlgorithm::Argon2id);
        assert!(record.last_self_change.is_none());
        assert_eq!(record.version, 0);
    }
}
