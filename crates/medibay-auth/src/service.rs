//! Authentication orchestration.
//!
//! [`AuthenticationService`] drives the end-to-end flow: resolve the
//! presented credential to one account, invoke the method-specific
//! verifier, reconcile a federated support identity on first login, and
//! classify the outcome into one result code. Every terminal transition
//! writes exactly one audit event, with two channel-specific exceptions
//! described on [`AuthenticationService::authenticate`].

use std::sync::Arc;

use medibay_core::{AccountKey, EventKey, ServiceError};
use time::OffsetDateTime;

use crate::AuthResult;
use crate::audit::{AuditEvent, AuthenticationEventRecorder};
use crate::config::PolicySettings;
use crate::crypto::EncryptorRegistry;
use crate::federation::FederationClient;
use crate::policy::{PasswordPolicyEngine, ValidationContext, messages};
use crate::resolver::CredentialResolver;
use crate::storage::{
    AccountStore, AuthEventStore, CredentialStore, DictionaryStore, DomainStore, SessionStore,
};
use crate::types::{
    Account, AuthMethod, AuthenticationOutcome, Channel, EncryptionAlgorithm, PasswordRecord,
    PresentedCredential, RequestContext, ResolutionResult, ResultCode, SessionEndReason,
};
use crate::verifier::{CredentialVerifier, PasswordCredentialVerifier, VerifierDecision};

/// How the account for an authentication attempt is selected.
pub enum AccountSelector {
    /// Resolve the typed user id through the multi-source disambiguation
    /// algorithm.
    UserId,
    /// Match the presented identifier against enrolled device scan codes.
    ScanCode,
    /// The caller already chose an account (e.g. after a
    /// `MultipleUserId` prompt).
    Explicit(Account),
}

/// Orchestrates authentication, password change, session termination, and
/// credential enrollment.
pub struct AuthenticationService {
    accounts: Arc<dyn AccountStore>,
    credentials: Arc<dyn CredentialStore>,
    sessions: Arc<dyn SessionStore>,
    resolver: CredentialResolver,
    recorder: AuthenticationEventRecorder,
    policy: PasswordPolicyEngine,
    registry: Arc<EncryptorRegistry>,
    federation: Option<Arc<dyn FederationClient>>,
    verifiers: Vec<Arc<dyn CredentialVerifier>>,
    settings: PolicySettings,
}

impl AuthenticationService {
    /// Creates a service over the given stores with default policy
    /// settings, the shipped encryption providers, and the password
    /// verifier registered.
    #[must_use]
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        domains: Arc<dyn DomainStore>,
        credentials: Arc<dyn CredentialStore>,
        dictionary: Arc<dyn DictionaryStore>,
        events: Arc<dyn AuthEventStore>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        let registry = Arc::new(EncryptorRegistry::with_defaults());
        let password_verifier: Arc<dyn CredentialVerifier> = Arc::new(
            PasswordCredentialVerifier::new(credentials.clone(), registry.clone()),
        );
        Self {
            resolver: CredentialResolver::new(accounts.clone(), domains),
            recorder: AuthenticationEventRecorder::new(events),
            policy: PasswordPolicyEngine::new(registry.clone(), dictionary),
            accounts,
            credentials,
            sessions,
            registry,
            federation: None,
            verifiers: vec![password_verifier],
            settings: PolicySettings::default(),
        }
    }

    /// Replaces the policy settings.
    #[must_use]
    pub fn with_settings(mut self, settings: PolicySettings) -> Self {
        self.settings = settings;
        self
    }

    /// Attaches the federated identity client used for support accounts.
    #[must_use]
    pub fn with_federation(mut self, client: Arc<dyn FederationClient>) -> Self {
        self.federation = Some(client);
        self
    }

    /// Registers a method-specific verifier. A later registration for the
    /// same method takes precedence.
    #[must_use]
    pub fn with_verifier(mut self, verifier: Arc<dyn CredentialVerifier>) -> Self {
        self.verifiers.push(verifier);
        self
    }

    /// Authenticates a presented credential.
    ///
    /// Terminal resolution failures (`NotFound`, `InactiveDomain`,
    /// `MultipleUserId`) record an audit event on the web channel only;
    /// the device channel audits verification attempts but not failed
    /// lookups. A support-account verification failure before the account
    /// has a local surrogate key is not audited at all: there is no key
    /// to log against.
    ///
    /// All persistent writes happen after the verifier call returns, so a
    /// caller dropping the future mid-verification leaves no partial
    /// audit event and no mutated lockout counter.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed input or collaborator failures.
    /// Wrong credentials, lockout, and ambiguity are [`ResultCode`]
    /// values on the returned outcome, never errors.
    pub async fn authenticate(
        &self,
        ctx: &RequestContext,
        credential: &PresentedCredential,
        selector: AccountSelector,
    ) -> AuthResult<AuthenticationOutcome> {
        let user_id = credential.user_id.trim().to_lowercase();
        let resolution = self.select_account(credential, selector).await?;

        if resolution.code != ResultCode::Successful {
            let reason = match resolution.code {
                ResultCode::NotFound => "no matching account",
                ResultCode::InactiveDomain => "all affiliated domains are inactive",
                _ => "ambiguous user id",
            };
            if ctx.channel == Channel::Web {
                let key = resolution
                    .account
                    .as_ref()
                    .map_or(AccountKey::ZERO, |a| a.key);
                self.recorder
                    .record(AuditEvent::failure(
                        key,
                        &user_id,
                        credential.method,
                        credential.purpose,
                        reason,
                    ))
                    .await?;
            }
            return Ok(AuthenticationOutcome::from_resolution(resolution));
        }

        let Some(account) = resolution.account else {
            return Err(ServiceError::unhandled(
                "resolution reported success without an account",
            ));
        };

        if !account.active {
            return self
                .record_rejection(&account, credential, "account inactive")
                .await;
        }
        if account.locked {
            return self
                .record_rejection(&account, credential, "account locked")
                .await;
        }

        let verifier = self.verifier_for(credential.method)?;
        let decision = verifier.verify(&account, credential).await?;

        match decision {
            VerifierDecision::Rejected { reason } => {
                self.classify_failure(account, credential, reason).await
            }
            VerifierDecision::Verified { access_token } => {
                self.classify_success(ctx, account, credential, access_token)
                    .await
            }
        }
    }

    /// Re-checks lock and expiration status without re-entering a
    /// password. Read-only and idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if a storage operation fails.
    pub async fn verify_account_status(
        &self,
        _ctx: &RequestContext,
        account: &Account,
    ) -> AuthResult<AuthenticationOutcome> {
        let Some(current) = self.accounts.find_by_key(account.key).await? else {
            return Ok(AuthenticationOutcome::failed(
                ResultCode::NotFound,
                None,
                "no matching account",
            ));
        };

        if !current.active {
            return Ok(AuthenticationOutcome::failed(
                ResultCode::AuthenticationFailed,
                Some(current),
                "account inactive",
            ));
        }
        if current.locked {
            return Ok(AuthenticationOutcome::failed(
                ResultCode::AuthenticationFailed,
                Some(current),
                "account locked",
            ));
        }

        let record = self.credentials.current(current.key).await?;
        if let Some(record) = record {
            let now = OffsetDateTime::now_utc();
            if self
                .policy
                .is_expired(record.last_self_change, &self.settings, now)
            {
                let mut outcome = AuthenticationOutcome::successful(current);
                outcome.code = ResultCode::ChangePasswordRequired;
                return Ok(outcome);
            }
        }
        Ok(AuthenticationOutcome::successful(current))
    }

    /// Changes an account's password after full policy validation.
    ///
    /// The write is guarded by the current record's version; a lost race
    /// surfaces as a retryable `DataConflict`.
    ///
    /// # Errors
    ///
    /// Returns `PolicyViolation` carrying every violated rule,
    /// `ArgumentInvalid` for an unsynced account, `DataConflict` on a
    /// lost write race, or a storage error.
    pub async fn change_password(
        &self,
        _ctx: &RequestContext,
        account: &Account,
        old_password: &str,
        new_password: &str,
    ) -> AuthResult<()> {
        if !account.is_synced() {
            return Err(ServiceError::argument_invalid(
                "account has not synced to this device",
            ));
        }

        let now = OffsetDateTime::now_utc();
        let record = self.credentials.current(account.key).await?;
        let history = match self.settings.history_depth {
            Some(depth) => self.credentials.history(account.key, depth).await?,
            None => Vec::new(),
        };

        let context = ValidationContext {
            account,
            new_password,
            current_password: Some(old_password),
            record: record.as_ref(),
            history: &history,
            algorithm: EncryptionAlgorithm::Argon2id,
            self_service: true,
            now,
        };
        let violations = self.policy.validate(&self.settings, &context).await?;
        if !violations.is_empty() {
            tracing::debug!(
                account = %account.key,
                violations = violations.len(),
                "password change rejected by policy"
            );
            return Err(ServiceError::policy_violation(messages(&violations)));
        }

        let provider = self.registry.get(EncryptionAlgorithm::Argon2id)?;
        let hash = provider.hash(new_password, None)?;
        let new_record =
            PasswordRecord::new(hash, None, EncryptionAlgorithm::Argon2id).self_changed_at(now);
        self.credentials
            .write(account.key, new_record, record.map(|r| r.version))
            .await?;

        self.recorder
            .record(AuditEvent::success(
                account.key,
                &account.user_id,
                AuthMethod::Password,
                crate::types::AuthPurpose::ChangePassword,
            ))
            .await
    }

    /// Returns the ordered human-readable password rules in effect for an
    /// account.
    ///
    /// # Errors
    ///
    /// Returns an error if a storage operation fails.
    pub async fn list_password_rules(&self, account: &Account) -> AuthResult<Vec<String>> {
        let algorithm = match self.credentials.current(account.key).await? {
            Some(record) => record.algorithm,
            None => EncryptionAlgorithm::Argon2id,
        };
        Ok(self.policy.describe_rules(&self.settings, algorithm))
    }

    /// Ends a session with an explicit reason.
    ///
    /// # Errors
    ///
    /// Returns `EntityNotFound` if the session doesn't exist, or a
    /// storage error.
    pub async fn sign_out(
        &self,
        _ctx: &RequestContext,
        session_key: &str,
        reason: SessionEndReason,
    ) -> AuthResult<()> {
        tracing::debug!(session = session_key, %reason, "ending session");
        self.sessions.end_session(session_key, reason).await
    }

    /// Ends a session that idled past its timeout.
    ///
    /// # Errors
    ///
    /// Returns `EntityNotFound` if the session doesn't exist, or a
    /// storage error.
    pub async fn timeout_user(&self, ctx: &RequestContext, session_key: &str) -> AuthResult<()> {
        self.sign_out(ctx, session_key, SessionEndReason::Timeout).await
    }

    /// Ends a session after a device power failure.
    ///
    /// # Errors
    ///
    /// Returns `EntityNotFound` if the session doesn't exist, or a
    /// storage error.
    pub async fn power_fail_user(&self, ctx: &RequestContext, session_key: &str) -> AuthResult<()> {
        self.sign_out(ctx, session_key, SessionEndReason::PowerFailure)
            .await
    }

    /// Associates a badge card serial with an account.
    ///
    /// # Errors
    ///
    /// Returns `ArgumentInvalid` for a blank serial, `EntityNotFound` for
    /// an unknown account, or a storage error.
    pub async fn enroll_card_serial(&self, account: &Account, serial: &str) -> AuthResult<()> {
        let serial = non_blank(serial, "card serial")?;
        self.accounts.set_card_serial(account.key, serial).await
    }

    /// Associates an RFID card serial with an account.
    ///
    /// # Errors
    ///
    /// Returns `ArgumentInvalid` for a blank serial, `EntityNotFound` for
    /// an unknown account, or a storage error.
    pub async fn enroll_rfid_card_serial(&self, account: &Account, serial: &str) -> AuthResult<()> {
        let serial = non_blank(serial, "rfid card serial")?;
        self.accounts.set_rfid_card_serial(account.key, serial).await
    }

    /// Associates a fingerprint template reference with an account.
    ///
    /// # Errors
    ///
    /// Returns `ArgumentInvalid` for a blank template reference,
    /// `EntityNotFound` for an unknown account, or a storage error.
    pub async fn register_fingerprint(&self, account: &Account, template: &str) -> AuthResult<()> {
        let template = non_blank(template, "fingerprint template")?;
        self.accounts.set_fingerprint(account.key, template).await
    }

    /// Persists an externally-constructed audit event.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    pub async fn log_authentication_event(&self, event: AuditEvent) -> AuthResult<()> {
        self.recorder.record(event).await
    }

    /// Links a witness/co-sign event to an original authentication event.
    ///
    /// # Errors
    ///
    /// Returns `EntityNotFound` if the original event doesn't exist or
    /// `DataConflict` if it is already linked.
    pub async fn update_witness_authentication_event(
        &self,
        event: EventKey,
        witness: EventKey,
    ) -> AuthResult<()> {
        self.recorder.link_witness(event, witness).await
    }

    /// Returns the most recent successful attempt for an account.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    pub async fn last_successful_sign_in(
        &self,
        account: &Account,
    ) -> AuthResult<Option<AuditEvent>> {
        self.recorder.last_successful(account.key).await
    }

    async fn select_account(
        &self,
        credential: &PresentedCredential,
        selector: AccountSelector,
    ) -> AuthResult<ResolutionResult> {
        match selector {
            AccountSelector::UserId => self.resolver.resolve(&credential.user_id).await,
            AccountSelector::ScanCode => {
                let code = credential.user_id.trim();
                if code.is_empty() {
                    return Err(ServiceError::argument_invalid("scan code must not be empty"));
                }
                Ok(match self.accounts.find_by_scan_code(code).await? {
                    Some(account) => ResolutionResult::successful(account),
                    None => ResolutionResult::not_found(),
                })
            }
            AccountSelector::Explicit(account) => Ok(ResolutionResult::successful(account)),
        }
    }

    fn verifier_for(&self, method: AuthMethod) -> AuthResult<&dyn CredentialVerifier> {
        self.verifiers
            .iter()
            .rev()
            .map(AsRef::as_ref)
            .find(|v| v.method() == method)
            .ok_or_else(|| ServiceError::entity_not_found("CredentialVerifier", method.to_string()))
    }

    /// Rejection before verification (inactive or locked account). Always
    /// audited: the account is known and synced.
    async fn record_rejection(
        &self,
        account: &Account,
        credential: &PresentedCredential,
        reason: &str,
    ) -> AuthResult<AuthenticationOutcome> {
        self.recorder
            .record(AuditEvent::failure(
                account.key,
                &account.user_id,
                credential.method,
                credential.purpose,
                reason,
            ))
            .await?;
        Ok(AuthenticationOutcome::failed(
            ResultCode::AuthenticationFailed,
            Some(account.clone()),
            reason,
        ))
    }

    /// Interprets a verification failure through the lockout thresholds.
    async fn classify_failure(
        &self,
        account: Account,
        credential: &PresentedCredential,
        reason: String,
    ) -> AuthResult<AuthenticationOutcome> {
        // A support account failing before its first sync has no local key
        // to count failures against or to audit.
        if account.support_user && !account.is_synced() {
            return Ok(AuthenticationOutcome::failed(
                ResultCode::AuthenticationFailed,
                Some(account),
                reason,
            ));
        }

        let failures = self.accounts.record_failure(account.key).await?;
        let thresholds = &self.settings.lockout;
        let code = if failures >= thresholds.lock_threshold {
            self.accounts.set_locked(account.key, true).await?;
            tracing::warn!(
                account = %account.key,
                failures,
                "consecutive failures crossed the lockout threshold"
            );
            ResultCode::AccountLocking
        } else if failures >= thresholds.warn_threshold {
            ResultCode::WarnAccountLockout
        } else {
            ResultCode::AuthenticationFailed
        };

        self.recorder
            .record(
                AuditEvent::failure(
                    account.key,
                    &account.user_id,
                    credential.method,
                    credential.purpose,
                    &reason,
                )
                .with_lockout(code.is_lockout()),
            )
            .await?;
        Ok(AuthenticationOutcome::failed(code, Some(account), reason))
    }

    /// Finishes a verified attempt: support-account reconcile, zero-key
    /// guard, lockout reset, expiration check, audit.
    async fn classify_success(
        &self,
        _ctx: &RequestContext,
        mut account: Account,
        credential: &PresentedCredential,
        access_token: Option<String>,
    ) -> AuthResult<AuthenticationOutcome> {
        if account.support_user && !account.is_synced() {
            if let (Some(federation), Some(token)) = (&self.federation, access_token.as_deref()) {
                match federation.get_profile(token).await {
                    Ok(Some(profile)) => {
                        account = self.accounts.upsert_support_account(&profile).await?;
                        tracing::debug!(
                            account = %account.key,
                            user_id = %account.user_id,
                            "reconciled support account from federation profile"
                        );
                    }
                    Ok(None) => {}
                    // Clinical login availability must not depend on the
                    // federation link being up.
                    Err(error) => {
                        tracing::warn!(%error, "federation profile fetch failed");
                    }
                }
            }
        } else if !account.is_synced() {
            // A device never authenticates against an account it does not
            // yet locally recognize, even with valid credentials.
            let reason = "account has not synced to this device";
            self.recorder
                .record(AuditEvent::failure(
                    account.key,
                    &account.user_id,
                    credential.method,
                    credential.purpose,
                    reason,
                ))
                .await?;
            return Ok(AuthenticationOutcome::failed(
                ResultCode::AuthenticationFailed,
                Some(account),
                reason,
            ));
        }

        let now = OffsetDateTime::now_utc();
        if account.is_synced() {
            self.accounts.clear_failures(account.key).await?;
            self.accounts.touch_last_success(account.key, now).await?;
        }

        let mut code = ResultCode::Successful;
        if credential.method == AuthMethod::Password && account.is_synced() {
            if let Some(record) = self.credentials.current(account.key).await? {
                if self
                    .policy
                    .is_expired(record.last_self_change, &self.settings, now)
                {
                    code = ResultCode::ChangePasswordRequired;
                }
            }
        }

        self.recorder
            .record(AuditEvent::success(
                account.key,
                &account.user_id,
                credential.method,
                credential.purpose,
            ))
            .await?;

        let mut outcome = AuthenticationOutcome::successful(account);
        outcome.code = code;
        if let Some(token) = access_token {
            outcome = outcome.with_access_token(token);
        }
        Ok(outcome)
    }
}

fn non_blank<'a>(value: &'a str, what: &str) -> AuthResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::argument_invalid(format!(
            "{what} must not be empty"
        )));
    }
    Ok(trimmed)
}

// Orchestration tests over the in-memory stores live in
// `tests/service_tests.rs`: `medibay-auth-memory` depends on this crate,
// so they must link the library build rather than the unit-test build.
