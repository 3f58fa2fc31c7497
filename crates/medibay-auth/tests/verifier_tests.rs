//! Password-verifier tests, moved out of `src/verifier.rs`.
//!
//! These tests use the in-memory credential store. Because
//! `medibay-auth-memory` depends on `medibay-auth`, they must run as an
//! integration test so both sides link the same build of the library;
//! as unit tests inside `src/` the crate is compiled twice and the
//! storage-trait types do not unify.

use std::sync::Arc;

use medibay_auth::crypto::{
    EncryptorRegistry, LegacySha256Encryptor, PasswordEncryptor, generate_salt,
};
use medibay_auth::types::{Account, EncryptionAlgorithm, PasswordRecord, PresentedCredential};
use medibay_auth::verifier::{CredentialVerifier, PasswordCredentialVerifier, VerifierDecision};
use medibay_auth_memory::MemoryCredentialStore;

fn record_for(password: &str) -> PasswordRecord {
    let salt = generate_salt();
    let hash = LegacySha256Encryptor.hash(password, Some(&salt)).unwrap();
    PasswordRecord::new(hash, Some(salt), EncryptionAlgorithm::LegacySha256)
}

#[tokio::test]
async fn test_correct_password_verifies() {
    let account = Account::new("jdoe");
    let store = Arc::new(MemoryCredentialStore::seeded(vec![(
        account.key,
        record_for("s3cret99"),
    )]));
    let verifier =
        PasswordCredentialVerifier::new(store, Arc::new(EncryptorRegistry::with_defaults()));

    let decision = verifier
        .verify(&account, &PresentedCredential::password("jdoe", "s3cret99"))
        .await
        .unwrap();
    assert_eq!(decision, VerifierDecision::verified());
}

#[tokio::test]
async fn test_wrong_password_is_rejected() {
    let account = Account::new("jdoe");
    let store = Arc::new(MemoryCredentialStore::seeded(vec![(
        account.key,
        record_for("s3cret99"),
    )]));
    let verifier =
        PasswordCredentialVerifier::new(store, Arc::new(EncryptorRegistry::with_defaults()));

    let decision = verifier
        .verify(&account, &PresentedCredential::password("jdoe", "wrong"))
        .await
        .unwrap();
    assert_eq!(decision, VerifierDecision::rejected("invalid password"));
}

#[tokio::test]
async fn test_missing_record_is_rejected_not_an_error() {
    let account = Account::new("jdoe");
    let store = Arc::new(MemoryCredentialStore::new());
    let verifier =
        PasswordCredentialVerifier::new(store, Arc::new(EncryptorRegistry::with_defaults()));

    let decision = verifier
        .verify(&account, &PresentedCredential::password("jdoe", "anything"))
        .await
        .unwrap();
    assert!(matches!(decision, VerifierDecision::Rejected { .. }));
}
