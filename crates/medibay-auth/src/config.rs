//! Credential-policy configuration.
//!
//! System-wide settings for password-policy enforcement and lockout
//! interpretation. Settings are plain serde types passed to the policy
//! engine per call; the engine itself holds no mutable state.
//!
//! # Example (TOML)
//!
//! ```toml
//! [policy]
//! minimum_length = 8
//! minimum_uppercase = 1
//! minimum_digits = 1
//! history_depth = 5
//! minimum_age = "1day"
//! expiration = "90days"
//! content_check = false
//!
//! [policy.lockout]
//! warn_threshold = 3
//! lock_threshold = 5
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Upper bound on password length for the modern algorithm.
pub const MAX_PASSWORD_LENGTH: usize = 50;

/// Length cap for the legacy algorithm.
pub const LEGACY_MAX_PASSWORD_LENGTH: usize = 8;

/// Minimum number of differing positions between old and new password
/// required under content-check mode.
pub const MIN_CHARACTER_DIFFERENCE: usize = 4;

/// System-wide password-policy settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PolicySettings {
    /// Minimum password length (modern algorithm only; the legacy
    /// algorithm carries its own fixed rule).
    pub minimum_length: u32,

    /// Minimum number of uppercase characters. 0 means not required.
    pub minimum_uppercase: u32,

    /// Minimum number of lowercase characters. 0 means not required.
    pub minimum_lowercase: u32,

    /// Minimum number of digit characters. 0 means not required.
    pub minimum_digits: u32,

    /// Minimum number of punctuation/symbol characters. 0 means not
    /// required.
    pub minimum_special: u32,

    /// How many historical passwords a new password must differ from.
    /// `None` skips the history rule entirely.
    pub history_depth: Option<u32>,

    /// Minimum time between self-service changes. `None` skips the rule.
    #[serde(with = "humantime_serde")]
    pub minimum_age: Option<Duration>,

    /// Maximum password age before a change is forced. `None` means the
    /// password never expires (unless it was never self-changed).
    #[serde(with = "humantime_serde")]
    pub expiration: Option<Duration>,

    /// Stricter content-check mode (regulated/DoD deployments): substring
    /// personal-info matching, dictionary lookup, and the
    /// character-difference rule.
    pub content_check: bool,

    /// Lockout interpretation thresholds.
    pub lockout: LockoutSettings,
}

impl Default for PolicySettings {
    fn default() -> Self {
        Self {
            minimum_length: 8,
            minimum_uppercase: 1,
            minimum_lowercase: 1,
            minimum_digits: 1,
            minimum_special: 0,
            history_depth: Some(5),
            minimum_age: Some(Duration::from_secs(24 * 3600)),
            expiration: Some(Duration::from_secs(90 * 24 * 3600)),
            content_check: false,
            lockout: LockoutSettings::default(),
        }
    }
}

impl PolicySettings {
    /// Settings with every optional rule disabled, as a test baseline.
    #[must_use]
    pub fn permissive() -> Self {
        Self {
            minimum_length: 1,
            minimum_uppercase: 0,
            minimum_lowercase: 0,
            minimum_digits: 0,
            minimum_special: 0,
            history_depth: None,
            minimum_age: None,
            expiration: None,
            content_check: false,
            lockout: LockoutSettings::default(),
        }
    }

    /// Enables content-check mode.
    #[must_use]
    pub fn with_content_check(mut self, enabled: bool) -> Self {
        self.content_check = enabled;
        self
    }

    /// Sets the history depth.
    #[must_use]
    pub fn with_history_depth(mut self, depth: Option<u32>) -> Self {
        self.history_depth = depth;
        self
    }

    /// Sets the expiration duration.
    #[must_use]
    pub fn with_expiration(mut self, expiration: Option<Duration>) -> Self {
        self.expiration = expiration;
        self
    }

    /// Sets the minimum age between self-service changes.
    #[must_use]
    pub fn with_minimum_age(mut self, minimum_age: Option<Duration>) -> Self {
        self.minimum_age = minimum_age;
        self
    }
}

/// Failure-count thresholds for lockout interpretation.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LockoutSettings {
    /// Consecutive failures at which the outcome escalates to
    /// `WarnAccountLockout`.
    pub warn_threshold: u32,

    /// Consecutive failures at which the account locks and the outcome
    /// becomes `AccountLocking`.
    pub lock_threshold: u32,
}

impl Default for LockoutSettings {
    fn default() -> Self {
        Self {
            warn_threshold: 3,
            lock_threshold: 5,
        }
    }
}
