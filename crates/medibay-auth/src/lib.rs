//! # medibay-auth
//!
//! User authentication and credential-policy enforcement for the medibay
//! dispensing platform backend.
//!
//! This crate provides:
//! - Multi-source credential resolution across the local account store and
//!   configured identity domains
//! - Authentication orchestration over an explicit result-code state
//!   machine, including lockout interpretation and federated support-account
//!   reconcile
//! - A password-policy engine with fixed rule ordering and full violation
//!   aggregation
//! - Append-only audit recording of every authentication attempt
//! - Encryption-provider contracts with Argon2id and legacy salted SHA-256
//!   implementations
//!
//! ## Overview
//!
//! The same login name legitimately exists in multiple identity systems at
//! once (a local fallback account plus accounts in one or more directory
//! domains), so resolution and authentication are separate phases with
//! typed, inspectable outcomes. Wrong credentials, ambiguity, and lockout
//! are [`types::ResultCode`] values, never errors; errors are reserved for
//! malformed input and collaborator failures.
//!
//! ## Modules
//!
//! - [`config`] - Policy settings and lockout thresholds
//! - [`types`] - Accounts, domains, credentials, outcomes
//! - [`crypto`] - Encryption-provider contract and implementations
//! - [`storage`] - Storage traits consumed from the repository layer
//! - [`resolver`] - Multi-source credential resolution
//! - [`verifier`] - Method-specific credential verification
//! - [`policy`] - Password-policy engine
//! - [`federation`] - Federated identity client for support accounts
//! - [`audit`] - Authentication audit events
//! - [`service`] - End-to-end authentication orchestration

pub mod audit;
pub mod config;
pub mod crypto;
pub mod federation;
pub mod policy;
pub mod resolver;
pub mod service;
pub mod storage;
pub mod types;
pub mod verifier;

pub use audit::{AuditEvent, AuthenticationEventRecorder};
pub use config::{LockoutSettings, PolicySettings};
pub use crypto::{
    Argon2Encryptor, EncryptorRegistry, LegacySha256Encryptor, PasswordEncryptor, generate_salt,
};
pub use federation::{FederationClient, FederationProfile};
pub use policy::{PasswordPolicyEngine, RuleViolation, ValidationContext};
pub use resolver::CredentialResolver;
pub use service::{AccountSelector, AuthenticationService};
pub use types::{
    Account, AuthMethod, AuthPurpose, AuthenticationOutcome, Channel, EncryptionAlgorithm,
    IdentityDomain, PasswordRecord, PresentedCredential, RequestContext, ResolutionResult,
    ResultCode, SessionEndReason,
};
pub use verifier::{CredentialVerifier, PasswordCredentialVerifier, VerifierDecision};

/// Result alias for authentication operations.
pub type AuthResult<T> = medibay_core::ServiceResult<T>;
