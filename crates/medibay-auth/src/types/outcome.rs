//! Authentication result codes and outcomes.

use serde::{Deserialize, Serialize};

use super::Account;

/// Closed set of terminal authentication results.
///
/// Resolution and authentication failures are values of this enumeration,
/// never errors: a hospital security audit depends on the lockout and
/// disambiguation behavior being consistent and inspectable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultCode {
    /// No account matched the presented credential.
    NotFound,
    /// Resolution or authentication succeeded.
    Successful,
    /// The user's only affiliations are domains currently disabled.
    InactiveDomain,
    /// More than one account legitimately matched; the caller must offer a
    /// choice.
    MultipleUserId,
    /// The credential did not verify, or the account cannot authenticate.
    AuthenticationFailed,
    /// The credential did not verify and the account is close to the
    /// lockout threshold.
    WarnAccountLockout,
    /// The credential did not verify and the failure crossed the lockout
    /// threshold; the account is now locked.
    AccountLocking,
    /// The credential verified but the password is expired and must be
    /// changed before proceeding.
    ChangePasswordRequired,
}

impl ResultCode {
    /// Returns `true` for results that let the user proceed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Successful | Self::ChangePasswordRequired)
    }

    /// Returns `true` for results produced by lockout interpretation.
    #[must_use]
    pub fn is_lockout(&self) -> bool {
        matches!(self, Self::WarnAccountLockout | Self::AccountLocking)
    }
}

impl std::fmt::Display for ResultCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(f, "not-found"),
            Self::Successful => write!(f, "successful"),
            Self::InactiveDomain => write!(f, "inactive-domain"),
            Self::MultipleUserId => write!(f, "multiple-user-id"),
            Self::AuthenticationFailed => write!(f, "authentication-failed"),
            Self::WarnAccountLockout => write!(f, "warn-account-lockout"),
            Self::AccountLocking => write!(f, "account-locking"),
            Self::ChangePasswordRequired => write!(f, "change-password-required"),
        }
    }
}

/// Result of resolving a typed user id to accounts.
#[derive(Debug, Clone)]
pub struct ResolutionResult {
    /// Terminal code of the resolution step.
    pub code: ResultCode,
    /// The single resolved account, when resolution succeeded (or the
    /// first matched account for `InactiveDomain`).
    pub account: Option<Account>,
    /// Candidate list for `MultipleUserId`, with inactive local accounts
    /// already dropped.
    pub candidates: Vec<Account>,
}

impl ResolutionResult {
    /// A successful resolution to exactly one account.
    #[must_use]
    pub fn successful(account: Account) -> Self {
        Self {
            code: ResultCode::Successful,
            account: Some(account),
            candidates: Vec::new(),
        }
    }

    /// No account matched.
    #[must_use]
    pub fn not_found() -> Self {
        Self {
            code: ResultCode::NotFound,
            account: None,
            candidates: Vec::new(),
        }
    }

    /// All of the user's domains are disabled. Carries the first matched
    /// account for reporting.
    #[must_use]
    pub fn inactive_domain(first_match: Account) -> Self {
        Self {
            code: ResultCode::InactiveDomain,
            account: Some(first_match),
            candidates: Vec::new(),
        }
    }

    /// True ambiguity: the caller must present a choice.
    #[must_use]
    pub fn multiple(candidates: Vec<Account>) -> Self {
        Self {
            code: ResultCode::MultipleUserId,
            account: None,
            candidates,
        }
    }
}

/// Terminal outcome of an authentication flow.
#[derive(Debug, Clone)]
pub struct AuthenticationOutcome {
    /// Terminal result code.
    pub code: ResultCode,
    /// The resolved account, when one was determined.
    pub account: Option<Account>,
    /// Candidate list for `MultipleUserId`.
    pub candidates: Vec<Account>,
    /// Human-readable failure reason, for failed outcomes.
    pub failure_reason: Option<String>,
    /// Opaque access token returned by the federation collaborator, when
    /// federation was used.
    pub access_token: Option<String>,
}

impl AuthenticationOutcome {
    /// A successful authentication of the given account.
    #[must_use]
    pub fn successful(account: Account) -> Self {
        Self {
            code: ResultCode::Successful,
            account: Some(account),
            candidates: Vec::new(),
            failure_reason: None,
            access_token: None,
        }
    }

    /// A failed outcome with the given code and reason.
    #[must_use]
    pub fn failed(code: ResultCode, account: Option<Account>, reason: impl Into<String>) -> Self {
        Self {
            code,
            account,
            candidates: Vec::new(),
            failure_reason: Some(reason.into()),
            access_token: None,
        }
    }

    /// Lifts a resolution result into an outcome.
    #[must_use]
    pub fn from_resolution(resolution: ResolutionResult) -> Self {
        Self {
            code: resolution.code,
            account: resolution.account,
            candidates: resolution.candidates,
            failure_reason: None,
            access_token: None,
        }
    }

    /// Attaches a federation access token.
    #[must_use]
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Returns `true` for outcomes that let the user proceed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.code.is_success()
    }
}
