//! Password-policy enforcement.
//!
//! The engine validates a candidate password against system-wide policy
//! settings and an account's credential history. Rule evaluation order and
//! error aggregation are load-bearing: a hospital security audit depends
//! on consistent lockout and complexity behavior, so every applicable
//! violation from one pass is reported, in rule order, never just the
//! first.
//!
//! The engine is an explicitly constructed instance holding no mutable
//! state; [`PolicySettings`] are passed per call.

mod violation;

pub use violation::{RuleViolation, messages};

use std::sync::Arc;

use medibay_core::ServiceError;
use time::OffsetDateTime;

use crate::AuthResult;
use crate::config::{
    LEGACY_MAX_PASSWORD_LENGTH, MAX_PASSWORD_LENGTH, MIN_CHARACTER_DIFFERENCE, PolicySettings,
};
use crate::crypto::EncryptorRegistry;
use crate::storage::DictionaryStore;
use crate::types::{Account, EncryptionAlgorithm, PasswordRecord};

/// Input to one validation pass.
pub struct ValidationContext<'a> {
    /// The account whose credential is changing.
    pub account: &'a Account,

    /// Candidate password.
    pub new_password: &'a str,

    /// Current password as typed, for self-service changes.
    pub current_password: Option<&'a str>,

    /// Active stored record, when the account has one. Counts as the
    /// first entry for the history-uniqueness rule.
    pub record: Option<&'a PasswordRecord>,

    /// Superseded records, most recent first.
    pub history: &'a [PasswordRecord],

    /// Algorithm the new password will be stored with; selects the
    /// length-rule variant.
    pub algorithm: EncryptionAlgorithm,

    /// Whether this is a self-service change (enables the
    /// current-password-match rule).
    pub self_service: bool,

    /// Evaluation instant.
    pub now: OffsetDateTime,
}

/// Validates candidate passwords against policy settings and history.
pub struct PasswordPolicyEngine {
    registry: Arc<EncryptorRegistry>,
    dictionary: Arc<dyn DictionaryStore>,
}

impl PasswordPolicyEngine {
    /// Creates an engine over the given encryption providers and
    /// dictionary lookup.
    #[must_use]
    pub fn new(registry: Arc<EncryptorRegistry>, dictionary: Arc<dyn DictionaryStore>) -> Self {
        Self {
            registry,
            dictionary,
        }
    }

    /// Validates a candidate password.
    ///
    /// Rules evaluate in a fixed order. Only the current-password-match
    /// rule short-circuits: when the supplied current password does not
    /// verify, the remaining rules are meaningless and a single violation
    /// is returned. All other rules are evaluated and their results
    /// unioned.
    ///
    /// # Errors
    ///
    /// Returns an error for storage or provider failures. Rule failures
    /// are values in the returned list, never errors.
    pub async fn validate(
        &self,
        settings: &PolicySettings,
        ctx: &ValidationContext<'_>,
    ) -> AuthResult<Vec<RuleViolation>> {
        // Rule 1: current-password match (self-service only).
        if ctx.self_service {
            if let (Some(current), Some(record)) = (ctx.current_password, ctx.record) {
                let provider = self.registry.get(record.algorithm)?;
                if !provider.verify(current, record.salt.as_deref(), &record.hash) {
                    return Ok(vec![RuleViolation::CurrentPasswordMismatch]);
                }
            }
        }

        let mut violations = Vec::new();
        let new_password = ctx.new_password;

        // Rule 2: identity similarity.
        if self.matches_personal_info(settings, ctx.account, new_password)? {
            violations.push(RuleViolation::MatchesPersonalInfo);
        }

        // Rule 3: history uniqueness. The active record counts as the
        // first stored hash.
        if let Some(depth) = settings.history_depth.filter(|d| *d > 0) {
            let recent = ctx.record.into_iter().chain(ctx.history.iter());
            for stored in recent.take(depth as usize) {
                let provider = self.registry.get(stored.algorithm)?;
                if provider.verify(new_password, stored.salt.as_deref(), &stored.hash) {
                    violations.push(RuleViolation::ReusedFromHistory { depth });
                    break;
                }
            }
        }

        // Rule 4: character difference from the old password.
        if settings.content_check {
            if let Some(old) = ctx.current_password {
                if character_difference(old, new_password) < MIN_CHARACTER_DIFFERENCE {
                    violations.push(RuleViolation::InsufficientDifference {
                        required: MIN_CHARACTER_DIFFERENCE,
                    });
                }
            }
        }

        // Rule 5: dictionary word.
        if settings.content_check
            && self
                .dictionary
                .contains_word(&new_password.to_lowercase())
                .await?
        {
            violations.push(RuleViolation::DictionaryWord);
        }

        // Rule 6: minimum age, unless the current password is already
        // expired.
        if let (Some(minimum_age), Some(record)) = (settings.minimum_age, ctx.record) {
            if !self.is_expired(record.last_self_change, settings, ctx.now) {
                if let Some(last) = record.last_self_change {
                    if ctx.now < last + minimum_age {
                        violations.push(RuleViolation::ChangedTooRecently);
                    }
                }
            }
        }

        // Rule 7: length, algorithm-specific.
        let length = new_password.chars().count();
        match ctx.algorithm {
            EncryptionAlgorithm::LegacySha256 => {
                if length > LEGACY_MAX_PASSWORD_LENGTH
                    || new_password.chars().any(|c| c.is_ascii_punctuation())
                {
                    violations.push(RuleViolation::LegacyFormat);
                }
            }
            EncryptionAlgorithm::Argon2id => {
                if length < settings.minimum_length as usize {
                    violations.push(RuleViolation::TooShort {
                        minimum: settings.minimum_length,
                    });
                }
                if length > MAX_PASSWORD_LENGTH {
                    violations.push(RuleViolation::TooLong {
                        maximum: MAX_PASSWORD_LENGTH,
                    });
                }
            }
        }

        // Rule 8: complexity.
        if let Some(requirements) = complexity_requirements(settings) {
            if !complexity_met(settings, new_password) {
                violations.push(RuleViolation::Complexity { requirements });
            }
        }

        Ok(violations)
    }

    /// Pure expiration check.
    ///
    /// A never-self-changed password is expired by definition: the user
    /// must change it immediately. Otherwise the password expires once
    /// `now` passes `last_self_change + expiration`, when a duration is
    /// configured.
    #[must_use]
    pub fn is_expired(
        &self,
        last_self_change: Option<OffsetDateTime>,
        settings: &PolicySettings,
        now: OffsetDateTime,
    ) -> bool {
        match last_self_change {
            None => true,
            Some(last) => match settings.expiration {
                Some(duration) => now > last + duration,
                None => false,
            },
        }
    }

    /// Ordered human-readable rule descriptions reflecting the current
    /// settings, in evaluation order.
    #[must_use]
    pub fn describe_rules(
        &self,
        settings: &PolicySettings,
        algorithm: EncryptionAlgorithm,
    ) -> Vec<String> {
        let mut rules = Vec::new();

        if settings.content_check {
            rules.push(
                "Must not contain your user id, first name, or last name".to_string(),
            );
        } else {
            rules.push("Must not match your user id, first name, or last name".to_string());
        }

        if let Some(depth) = settings.history_depth.filter(|d| *d > 0) {
            rules.push(format!("Must differ from your previous {depth} passwords"));
        }

        if settings.content_check {
            rules.push(format!(
                "Must differ from the old password in at least {MIN_CHARACTER_DIFFERENCE} positions"
            ));
            rules.push("Must not be a dictionary word".to_string());
        }

        if let Some(minimum_age) = settings.minimum_age {
            rules.push(format!(
                "Can be changed at most once every {}",
                format_days(minimum_age)
            ));
        }

        match algorithm {
            EncryptionAlgorithm::LegacySha256 => rules.push(format!(
                "Must be at most {LEGACY_MAX_PASSWORD_LENGTH} characters and contain no punctuation or symbols"
            )),
            EncryptionAlgorithm::Argon2id => rules.push(format!(
                "Must be between {} and {MAX_PASSWORD_LENGTH} characters long",
                settings.minimum_length
            )),
        }

        if let Some(requirements) = complexity_requirements(settings) {
            rules.push(format!("Must contain {requirements}"));
        }

        if let Some(expiration) = settings.expiration {
            rules.push(format!("Expires every {}", format_days(expiration)));
        }

        rules
    }

    /// Rule 2: equality against user id and name parts; containment when
    /// content-check mode is enabled.
    fn matches_personal_info(
        &self,
        settings: &PolicySettings,
        account: &Account,
        new_password: &str,
    ) -> AuthResult<bool> {
        let terms = [
            Some(account.user_id.as_str()),
            account.last_name.as_deref(),
            account.first_name.as_deref(),
        ];
        for term in terms.into_iter().flatten().filter(|t| !t.is_empty()) {
            if new_password.eq_ignore_ascii_case(term) {
                return Ok(true);
            }
            if settings.content_check {
                let pattern = regex::RegexBuilder::new(&regex::escape(term))
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| ServiceError::unhandled(format!("identity pattern: {e}")))?;
                if pattern.is_match(new_password) {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }
}

/// Per-position case-insensitive character difference, with the shorter
/// input right-padded to equal length.
pub(crate) fn character_difference(old: &str, new: &str) -> usize {
    let old: Vec<char> = old.to_lowercase().chars().collect();
    let new: Vec<char> = new.to_lowercase().chars().collect();
    let len = old.len().max(new.len());
    (0..len)
        .filter(|&i| old.get(i) != new.get(i))
        .count()
}

/// Synthesizes the complexity requirement string from the clauses whose
/// thresholds are configured, comma-joined with the trailing comma
/// trimmed. Returns `None` when no class is required.
fn complexity_requirements(settings: &PolicySettings) -> Option<String> {
    let mut requirements = String::new();
    for (count, noun) in [
        (settings.minimum_uppercase, "uppercase character"),
        (settings.minimum_lowercase, "lowercase character"),
        (settings.minimum_digits, "digit"),
        (settings.minimum_special, "punctuation or symbol character"),
    ] {
        if count > 0 {
            let plural = if count == 1 { "" } else { "s" };
            requirements.push_str(&format!("at least {count} {noun}{plural}, "));
        }
    }
    let requirements = requirements.trim_end_matches(", ");
    if requirements.is_empty() {
        None
    } else {
        Some(requirements.to_string())
    }
}

/// Rule 8 check: every configured character-class minimum is met.
fn complexity_met(settings: &PolicySettings, password: &str) -> bool {
    let uppercase = password.chars().filter(|c| c.is_uppercase()).count();
    let lowercase = password.chars().filter(|c| c.is_lowercase()).count();
    let digits = password.chars().filter(char::is_ascii_digit).count();
    let special = password.chars().filter(char::is_ascii_punctuation).count();

    uppercase >= settings.minimum_uppercase as usize
        && lowercase >= settings.minimum_lowercase as usize
        && digits >= settings.minimum_digits as usize
        && special >= settings.minimum_special as usize
}

fn format_days(duration: std::time::Duration) -> String {
    let days = duration.as_secs() / 86_400;
    if days == 1 {
        "1 day".to_string()
    } else {
        format!("{days} days")
    }
}

// Engine tests over the in-memory dictionary store live in
// `tests/policy_tests.rs`: `medibay-auth-memory` depends on this crate,
// so they must link the library build rather than the unit-test build.
// Only the private-helper tests stay here.
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_character_difference() {
        // Only the trailing digit differs.
        assert_eq!(character_difference("Password1", "Password2"), 1);
        // Every position differs.
        assert_eq!(character_difference("abcd", "wxyz"), 4);
        // Case-insensitive comparison.
        assert_eq!(character_difference("ABCD", "abcd"), 0);
        // Shorter input is right-padded; padded positions differ.
        assert_eq!(character_difference("ab", "abcd"), 2);
    }

    #[test]
    fn test_complexity_message_omits_zero_thresholds() {
        let mut settings = PolicySettings::permissive();
        settings.minimum_uppercase = 2;

        let requirements = complexity_requirements(&settings).unwrap();
        assert_eq!(requirements, "at least 2 uppercase characters");
        assert!(!requirements.contains("lowercase"));
        assert!(!requirements.contains("digit"));
        assert!(!requirements.ends_with(','));
    }
}
