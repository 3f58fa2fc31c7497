//! Authentication-service tests, moved out of `src/service.rs`.
//!
//! These tests use the in-memory stores. Because `medibay-auth-memory`
//! depends on `medibay-auth`, they must run as an integration test so
//! both sides link the same build of the library; as unit tests inside
//! `src/` the crate is compiled twice and the storage-trait types do not
//! unify.

use std::sync::Arc;

use async_trait::async_trait;
use time::OffsetDateTime;

use medibay_auth::AuthResult;
use medibay_auth::audit::AuditEvent;
use medibay_auth::config::{LockoutSettings, PolicySettings};
use medibay_auth::crypto::{LegacySha256Encryptor, PasswordEncryptor, generate_salt};
use medibay_auth::federation::{FederationClient, FederationProfile};
use medibay_auth::service::{AccountSelector, AuthenticationService};
use medibay_auth::storage::{AccountStore, CredentialStore};
use medibay_auth::types::{
    Account, AuthMethod, AuthPurpose, EncryptionAlgorithm, PasswordRecord, PresentedCredential,
    RequestContext, ResultCode, SessionEndReason,
};
use medibay_auth::verifier::{CredentialVerifier, VerifierDecision};
use medibay_auth_memory::{
    MemoryAccountStore, MemoryCredentialStore, MemoryDictionaryStore, MemoryDomainStore,
    MemoryEventStore, MemorySessionStore,
};
use medibay_core::{AccountKey, EventKey, ServiceError};

struct Fixture {
    accounts: Arc<MemoryAccountStore>,
    credentials: Arc<MemoryCredentialStore>,
    events: Arc<MemoryEventStore>,
    sessions: Arc<MemorySessionStore>,
    service: AuthenticationService,
}

fn fixture(accounts: Vec<Account>, records: Vec<(AccountKey, PasswordRecord)>) -> Fixture {
    let account_store = Arc::new(MemoryAccountStore::seeded(accounts));
    let credential_store = Arc::new(MemoryCredentialStore::seeded(records));
    let event_store = Arc::new(MemoryEventStore::new());
    let session_store = Arc::new(MemorySessionStore::seeded(vec!["session-1"]));

    let service = AuthenticationService::new(
        account_store.clone(),
        Arc::new(MemoryDomainStore::new()),
        credential_store.clone(),
        Arc::new(MemoryDictionaryStore::new()),
        event_store.clone(),
        session_store.clone(),
    );
    Fixture {
        accounts: account_store,
        credentials: credential_store,
        events: event_store,
        sessions: session_store,
        service,
    }
}

fn legacy_record(password: &str) -> PasswordRecord {
    let salt = generate_salt();
    let hash = LegacySha256Encryptor.hash(password, Some(&salt)).unwrap();
    PasswordRecord::new(hash, Some(salt), EncryptionAlgorithm::LegacySha256)
}

fn fresh_record(password: &str) -> PasswordRecord {
    legacy_record(password).self_changed_at(OffsetDateTime::now_utc())
}

struct StubVerifier {
    decision: VerifierDecision,
}

#[async_trait]
impl CredentialVerifier for StubVerifier {
    fn method(&self) -> AuthMethod {
        AuthMethod::Password
    }

    async fn verify(
        &self,
        _account: &Account,
        _credential: &PresentedCredential,
    ) -> AuthResult<VerifierDecision> {
        Ok(self.decision.clone())
    }
}

struct StubFederation {
    profile: Option<FederationProfile>,
    unreachable: bool,
}

#[async_trait]
impl FederationClient for StubFederation {
    async fn get_profile(&self, _token: &str) -> AuthResult<Option<FederationProfile>> {
        if self.unreachable {
            return Err(ServiceError::unhandled("identity server unreachable"));
        }
        Ok(self.profile.clone())
    }
}

#[tokio::test]
async fn test_device_channel_does_not_audit_resolution_failures() {
    let f = fixture(vec![], vec![]);
    let outcome = f
        .service
        .authenticate(
            &RequestContext::device("cart-7"),
            &PresentedCredential::password("ghost", "x"),
            AccountSelector::UserId,
        )
        .await
        .unwrap();

    assert_eq!(outcome.code, ResultCode::NotFound);
    assert!(f.events.events().is_empty());
}

#[tokio::test]
async fn test_web_channel_audits_resolution_failures() {
    let f = fixture(vec![], vec![]);
    let outcome = f
        .service
        .authenticate(
            &RequestContext::web(),
            &PresentedCredential::password("ghost", "x"),
            AccountSelector::UserId,
        )
        .await
        .unwrap();

    assert_eq!(outcome.code, ResultCode::NotFound);
    let events = f.events.events();
    assert_eq!(events.len(), 1);
    assert!(!events[0].success);
    assert!(events[0].account_key.is_zero());
}

#[tokio::test]
async fn test_successful_password_sign_in() {
    let account = Account::new("jdoe");
    let key = account.key;
    let f = fixture(vec![account], vec![(key, fresh_record("ward8pass"))]);

    let outcome = f
        .service
        .authenticate(
            &RequestContext::device("cart-7"),
            &PresentedCredential::password("JDoe", "ward8pass"),
            AccountSelector::UserId,
        )
        .await
        .unwrap();

    assert_eq!(outcome.code, ResultCode::Successful);
    assert!(outcome.is_success());
    let events = f.events.events();
    assert_eq!(events.len(), 1);
    assert!(events[0].success);
    assert_eq!(events[0].account_key, key);
}

#[tokio::test]
async fn test_never_self_changed_password_forces_change() {
    let account = Account::new("jdoe");
    let key = account.key;
    // Provisioned record: last_self_change unset.
    let f = fixture(vec![account], vec![(key, legacy_record("ward8pass"))]);

    let outcome = f
        .service
        .authenticate(
            &RequestContext::device("cart-7"),
            &PresentedCredential::password("jdoe", "ward8pass"),
            AccountSelector::UserId,
        )
        .await
        .unwrap();

    assert_eq!(outcome.code, ResultCode::ChangePasswordRequired);
    assert!(outcome.is_success());
    // Still audited as a success.
    assert!(f.events.events()[0].success);
}

#[tokio::test]
async fn test_lockout_progression_warn_then_lock() {
    let account = Account::new("jdoe");
    let key = account.key;
    let f = fixture(vec![account], vec![(key, fresh_record("right1"))]);
    let service = f.service.with_settings(PolicySettings {
        lockout: LockoutSettings {
            warn_threshold: 2,
            lock_threshold: 3,
        },
        ..PolicySettings::default()
    });
    let ctx = RequestContext::device("cart-7");
    let wrong = PresentedCredential::password("jdoe", "wrong1");

    let first = service
        .authenticate(&ctx, &wrong, AccountSelector::UserId)
        .await
        .unwrap();
    assert_eq!(first.code, ResultCode::AuthenticationFailed);

    let second = service
        .authenticate(&ctx, &wrong, AccountSelector::UserId)
        .await
        .unwrap();
    assert_eq!(second.code, ResultCode::WarnAccountLockout);

    let third = service
        .authenticate(&ctx, &wrong, AccountSelector::UserId)
        .await
        .unwrap();
    assert_eq!(third.code, ResultCode::AccountLocking);
    assert!(f.accounts.find_by_key(key).await.unwrap().unwrap().locked);

    // A locked account fails even with the right password.
    let after_lock = service
        .authenticate(
            &ctx,
            &PresentedCredential::password("jdoe", "right1"),
            AccountSelector::UserId,
        )
        .await
        .unwrap();
    assert_eq!(after_lock.code, ResultCode::AuthenticationFailed);
    assert_eq!(after_lock.failure_reason.as_deref(), Some("account locked"));

    // Lockout-flagged events recorded for the warn and lock attempts.
    let lockout_events = f.events.events().iter().filter(|e| e.lockout).count();
    assert_eq!(lockout_events, 2);
}

#[tokio::test]
async fn test_success_resets_failure_count() {
    let account = Account::new("jdoe");
    let key = account.key;
    let f = fixture(vec![account], vec![(key, fresh_record("right1"))]);
    let service = f.service.with_settings(PolicySettings {
        lockout: LockoutSettings {
            warn_threshold: 2,
            lock_threshold: 3,
        },
        ..PolicySettings::default()
    });
    let ctx = RequestContext::device("cart-7");

    let wrong = PresentedCredential::password("jdoe", "wrong1");
    service
        .authenticate(&ctx, &wrong, AccountSelector::UserId)
        .await
        .unwrap();
    service
        .authenticate(
            &ctx,
            &PresentedCredential::password("jdoe", "right1"),
            AccountSelector::UserId,
        )
        .await
        .unwrap();

    // The counter restarted, so one more failure is plain failed.
    let outcome = service
        .authenticate(&ctx, &wrong, AccountSelector::UserId)
        .await
        .unwrap();
    assert_eq!(outcome.code, ResultCode::AuthenticationFailed);
}

#[tokio::test]
async fn test_unsynced_clinical_account_is_forced_to_fail() {
    let account = Account::builder("jdoe").unsynced().build();
    let f = fixture(
        vec![account],
        vec![(AccountKey::ZERO, fresh_record("right1"))],
    );

    let outcome = f
        .service
        .authenticate(
            &RequestContext::device("cart-7"),
            &PresentedCredential::password("jdoe", "right1"),
            AccountSelector::UserId,
        )
        .await
        .unwrap();

    assert_eq!(outcome.code, ResultCode::AuthenticationFailed);
    assert_eq!(
        outcome.failure_reason.as_deref(),
        Some("account has not synced to this device")
    );
    // The forced failure is audited; only the support-user path is
    // suppressed.
    assert_eq!(f.events.events().len(), 1);
}

#[tokio::test]
async fn test_support_account_first_login_reconciles_profile() {
    let account = Account::builder("vendor.tech").support_user(true).unsynced().build();
    let f = fixture(vec![account], vec![]);
    let service = f
        .service
        .with_verifier(Arc::new(StubVerifier {
            decision: VerifierDecision::verified_with_token("tok-1"),
        }))
        .with_federation(Arc::new(StubFederation {
            profile: Some(
                FederationProfile::new("svc-9917", "vendor.tech")
                    .with_first_name("Field")
                    .with_last_name("Engineer"),
            ),
            unreachable: false,
        }));

    let outcome = service
        .authenticate(
            &RequestContext::device("cart-7"),
            &PresentedCredential::password("vendor.tech", "external"),
            AccountSelector::UserId,
        )
        .await
        .unwrap();

    assert_eq!(outcome.code, ResultCode::Successful);
    assert_eq!(outcome.access_token.as_deref(), Some("tok-1"));
    let reconciled = outcome.account.unwrap();
    assert!(reconciled.is_synced());
    assert!(reconciled.support_user);
    assert_eq!(reconciled.display_name(), "Field Engineer");
}

#[tokio::test]
async fn test_federation_unreachable_returns_account_unchanged() {
    let account = Account::builder("vendor.tech").support_user(true).unsynced().build();
    let f = fixture(vec![account], vec![]);
    let service = f
        .service
        .with_verifier(Arc::new(StubVerifier {
            decision: VerifierDecision::verified_with_token("tok-1"),
        }))
        .with_federation(Arc::new(StubFederation {
            profile: None,
            unreachable: true,
        }));

    let outcome = service
        .authenticate(
            &RequestContext::device("cart-7"),
            &PresentedCredential::password("vendor.tech", "external"),
            AccountSelector::UserId,
        )
        .await
        .unwrap();

    // Success with the unreconciled zero-key account, not an error.
    assert_eq!(outcome.code, ResultCode::Successful);
    assert!(!outcome.account.unwrap().is_synced());
}

#[tokio::test]
async fn test_support_failure_before_sync_is_not_audited() {
    let account = Account::builder("vendor.tech").support_user(true).unsynced().build();
    let f = fixture(vec![account], vec![]);
    let service = f.service.with_verifier(Arc::new(StubVerifier {
        decision: VerifierDecision::rejected("external check failed"),
    }));

    let outcome = service
        .authenticate(
            &RequestContext::device("cart-7"),
            &PresentedCredential::password("vendor.tech", "bad"),
            AccountSelector::UserId,
        )
        .await
        .unwrap();

    assert_eq!(outcome.code, ResultCode::AuthenticationFailed);
    assert!(f.events.events().is_empty());
}

#[tokio::test]
async fn test_scan_code_selector() {
    let account = Account::builder("jdoe").scan_code("SC-4471").build();
    let key = account.key;
    let f = fixture(vec![account], vec![(key, fresh_record("right1"))]);

    let outcome = f
        .service
        .authenticate(
            &RequestContext::device("cart-7"),
            &PresentedCredential::password("SC-4471", "right1"),
            AccountSelector::ScanCode,
        )
        .await
        .unwrap();
    assert_eq!(outcome.code, ResultCode::Successful);

    let missing = f
        .service
        .authenticate(
            &RequestContext::device("cart-7"),
            &PresentedCredential::password("SC-0000", "right1"),
            AccountSelector::ScanCode,
        )
        .await
        .unwrap();
    assert_eq!(missing.code, ResultCode::NotFound);
}

#[tokio::test]
async fn test_explicit_account_skips_resolution() {
    let account = Account::new("jdoe");
    let key = account.key;
    let f = fixture(vec![account.clone()], vec![(key, fresh_record("right1"))]);

    let outcome = f
        .service
        .authenticate(
            &RequestContext::device("cart-7"),
            &PresentedCredential::password("jdoe", "right1"),
            AccountSelector::Explicit(account),
        )
        .await
        .unwrap();
    assert_eq!(outcome.code, ResultCode::Successful);
}

#[tokio::test]
async fn test_verify_account_status() {
    let account = Account::new("jdoe");
    let key = account.key;
    let f = fixture(vec![account.clone()], vec![(key, legacy_record("pw1"))]);
    let ctx = RequestContext::web();

    // Provisioned password: status re-check reports the forced change.
    let outcome = f.service.verify_account_status(&ctx, &account).await.unwrap();
    assert_eq!(outcome.code, ResultCode::ChangePasswordRequired);

    f.accounts.set_locked(key, true).await.unwrap();
    let outcome = f.service.verify_account_status(&ctx, &account).await.unwrap();
    assert_eq!(outcome.code, ResultCode::AuthenticationFailed);
    assert_eq!(outcome.failure_reason.as_deref(), Some("account locked"));
}

#[tokio::test]
async fn test_change_password_aggregates_all_violations() {
    let account = Account::new("jdoe");
    let key = account.key;
    let f = fixture(vec![account.clone()], vec![(key, legacy_record("old1"))]);

    // Too short, no uppercase, no digit under default settings.
    let err = f
        .service
        .change_password(&RequestContext::web(), &account, "old1", "tiny")
        .await
        .unwrap_err();

    let ServiceError::PolicyViolation { violations } = err else {
        panic!("expected a policy violation, got {err}");
    };
    assert!(violations.len() >= 2);
    assert!(violations.iter().any(|v| v.contains("at least 8 characters")));
}

#[tokio::test]
async fn test_change_password_rejects_wrong_current_password() {
    let account = Account::new("jdoe");
    let key = account.key;
    let f = fixture(vec![account.clone()], vec![(key, legacy_record("old1"))]);

    let err = f
        .service
        .change_password(&RequestContext::web(), &account, "not-old1", "NewWard99x")
        .await
        .unwrap_err();

    let ServiceError::PolicyViolation { violations } = err else {
        panic!("expected a policy violation, got {err}");
    };
    assert_eq!(violations.len(), 1);
    assert!(violations[0].contains("current password"));
}

#[tokio::test]
async fn test_change_password_writes_argon2_record() {
    let account = Account::new("jdoe");
    let key = account.key;
    let f = fixture(vec![account.clone()], vec![(key, legacy_record("old1"))]);

    f.service
        .change_password(&RequestContext::web(), &account, "old1", "NewWard99x")
        .await
        .unwrap();

    let record = f.credentials.current(key).await.unwrap().unwrap();
    assert_eq!(record.algorithm, EncryptionAlgorithm::Argon2id);
    assert!(record.last_self_change.is_some());
    assert!(record.version > 0);

    // Audited as a successful change-password attempt.
    let events = f.events.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].purpose, AuthPurpose::ChangePassword);
}

#[tokio::test]
async fn test_list_password_rules_tracks_stored_algorithm() {
    let account = Account::new("jdoe");
    let key = account.key;
    let f = fixture(vec![account.clone()], vec![(key, legacy_record("old1"))]);

    let rules = f.service.list_password_rules(&account).await.unwrap();
    assert!(rules.join("\n").contains("at most 8 characters"));
}

#[tokio::test]
async fn test_session_termination_reasons() {
    let f = fixture(vec![], vec![]);
    let ctx = RequestContext::device("cart-7");

    f.service.timeout_user(&ctx, "session-1").await.unwrap();
    assert_eq!(
        f.sessions.end_reason("session-1"),
        Some(SessionEndReason::Timeout)
    );

    let err = f
        .service
        .sign_out(&ctx, "no-such-session", SessionEndReason::Manual)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::EntityNotFound { .. }));
}

#[tokio::test]
async fn test_enrollment_rejects_blank_identifiers() {
    let account = Account::new("jdoe");
    let f = fixture(vec![account.clone()], vec![]);

    let err = f
        .service
        .enroll_card_serial(&account, "   ")
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::ArgumentInvalid { .. }));

    f.service.enroll_card_serial(&account, "C-100").await.unwrap();
    let stored = f.accounts.find_by_key(account.key).await.unwrap().unwrap();
    assert_eq!(stored.card_serial.as_deref(), Some("C-100"));
}

#[tokio::test]
async fn test_witness_linkage_is_one_time() {
    let account = Account::new("jdoe");
    let f = fixture(vec![account.clone()], vec![]);

    let original =
        AuditEvent::success(account.key, "jdoe", AuthMethod::Password, AuthPurpose::SignIn);
    let original_key = original.key;
    f.service.log_authentication_event(original).await.unwrap();

    let witness = EventKey::generate();
    f.service
        .update_witness_authentication_event(original_key, witness)
        .await
        .unwrap();

    let err = f
        .service
        .update_witness_authentication_event(original_key, EventKey::generate())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::DataConflict { .. }));
}
