//! Method-specific credential verification.
//!
//! After resolution produces exactly one account, the orchestrator hands
//! the presented credential to the verifier registered for its method.
//! Password verification ships with the subsystem; card, smart-card, and
//! fingerprint checks are hardware-backed collaborators implementing the
//! same contract.

use std::sync::Arc;

use async_trait::async_trait;

use crate::AuthResult;
use crate::crypto::EncryptorRegistry;
use crate::storage::CredentialStore;
use crate::types::{Account, AuthMethod, PresentedCredential};

/// Decision returned by one verification attempt.
///
/// Rejection is a value, not an error: the orchestrator interprets it
/// through lockout thresholds before classifying the outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifierDecision {
    /// The credential verified. May carry an opaque access token when the
    /// verifier consulted a federated identity server.
    Verified {
        /// Opaque federation access token, if one was issued.
        access_token: Option<String>,
    },
    /// The credential did not verify.
    Rejected {
        /// Human-readable reason, recorded in the audit event.
        reason: String,
    },
}

impl VerifierDecision {
    /// A plain verification with no federation token.
    #[must_use]
    pub fn verified() -> Self {
        Self::Verified { access_token: None }
    }

    /// A verification carrying a federation access token.
    #[must_use]
    pub fn verified_with_token(token: impl Into<String>) -> Self {
        Self::Verified {
            access_token: Some(token.into()),
        }
    }

    /// A rejection with the given reason.
    #[must_use]
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected {
            reason: reason.into(),
        }
    }
}

/// Contract of a method-specific credential check.
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// Which presentation method this verifier handles.
    fn method(&self) -> AuthMethod;

    /// Checks the presented credential against the resolved account.
    ///
    /// # Errors
    ///
    /// Returns an error for storage or provider failures. A wrong
    /// credential is a [`VerifierDecision::Rejected`] value, never an
    /// error.
    async fn verify(
        &self,
        account: &Account,
        credential: &PresentedCredential,
    ) -> AuthResult<VerifierDecision>;
}

/// Password check against the account's stored credential record.
pub struct PasswordCredentialVerifier {
    credentials: Arc<dyn CredentialStore>,
    registry: Arc<EncryptorRegistry>,
}

impl PasswordCredentialVerifier {
    /// Creates a verifier over the given credential store and encryption
    /// providers.
    #[must_use]
    pub fn new(credentials: Arc<dyn CredentialStore>, registry: Arc<EncryptorRegistry>) -> Self {
        Self {
            credentials,
            registry,
        }
    }
}

#[async_trait]
impl CredentialVerifier for PasswordCredentialVerifier {
    fn method(&self) -> AuthMethod {
        AuthMethod::Password
    }

    async fn verify(
        &self,
        account: &Account,
        credential: &PresentedCredential,
    ) -> AuthResult<VerifierDecision> {
        let Some(password) = credential.password.as_deref() else {
            return Ok(VerifierDecision::rejected("no password presented"));
        };

        let Some(record) = self.credentials.current(account.key).await? else {
            return Ok(VerifierDecision::rejected("no password credential on file"));
        };

        let provider = self.registry.get(record.algorithm)?;
        if provider.verify(password, record.salt.as_deref(), &record.hash) {
            Ok(VerifierDecision::verified())
        } else {
            Ok(VerifierDecision::rejected("invalid password"))
        }
    }
}

// Verifier tests live in `tests/verifier_tests.rs`: they use the
// in-memory store from `medibay-auth-memory`, which depends on this
// crate, so they must link the library build rather than the unit-test
// build.
