//! Surrogate key newtypes.
//!
//! Accounts synced down from the server carry a non-zero surrogate key. A
//! zero key means "not yet known to this device": federation-backed support
//! accounts start life with a zero key until their first successful login
//! provisions a local surrogate.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Surrogate key of a local account.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct AccountKey(Uuid);

impl AccountKey {
    /// The zero key: an account that has not yet synced to this device.
    pub const ZERO: Self = Self(Uuid::nil());

    /// Generates a fresh surrogate key.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wraps an existing identifier.
    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns `true` for the zero ("not yet synced") key.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_nil()
    }

    /// Returns the underlying identifier.
    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for AccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Key of an authentication audit event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventKey(Uuid);

impl EventKey {
    /// Generates a fresh event key.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wraps an existing identifier.
    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the underlying identifier.
    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for EventKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
