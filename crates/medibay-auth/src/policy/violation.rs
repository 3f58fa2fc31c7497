//! Password-policy rule violations.

use thiserror::Error;

/// One violated password-policy rule.
///
/// Violations are values, not errors: a validation pass collects every
/// applicable violation and callers aggregate them into a single
/// `PolicyViolation` service error listing all of them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleViolation {
    /// The supplied current password did not verify against the stored
    /// hash. When present, this is the only violation reported.
    #[error("The current password does not match")]
    CurrentPasswordMismatch,

    /// The new password matches (or, under content-check mode, contains)
    /// the user id or a name part.
    #[error("The password must not match or contain your user id, first name, or last name")]
    MatchesPersonalInfo,

    /// The new password matches one of the last `depth` stored hashes.
    #[error("The password must differ from your previous {depth} passwords")]
    ReusedFromHistory {
        /// Configured history depth.
        depth: u32,
    },

    /// Too few character positions differ from the old password.
    #[error("The password must differ from the old password in at least {required} positions")]
    InsufficientDifference {
        /// Required number of differing positions.
        required: usize,
    },

    /// The new password matches a known dictionary word.
    #[error("The password must not be a dictionary word")]
    DictionaryWord,

    /// The password was self-changed too recently.
    #[error("The password was changed too recently and cannot be changed again yet")]
    ChangedTooRecently,

    /// Legacy-algorithm format rule: replaces the generic length rule.
    #[error("The password must be at most 8 characters and contain no punctuation or symbols")]
    LegacyFormat,

    /// Shorter than the configured minimum.
    #[error("The password must be at least {minimum} characters long")]
    TooShort {
        /// Configured minimum length.
        minimum: u32,
    },

    /// Longer than the fixed upper bound.
    #[error("The password must be at most {maximum} characters long")]
    TooLong {
        /// Fixed maximum length.
        maximum: usize,
    },

    /// One or more character-class minimums were not met. The message
    /// carries only the clauses for thresholds that are configured.
    #[error("The password must contain {requirements}")]
    Complexity {
        /// Synthesized requirement clauses, comma-joined.
        requirements: String,
    },
}

/// Renders a violation list as ordered human-readable messages.
#[must_use]
pub fn messages(violations: &[RuleViolation]) -> Vec<String> {
    violations.iter().map(ToString::to_string).collect()
}
