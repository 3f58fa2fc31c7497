//! Data model for the authentication subsystem.

mod account;
mod credential;
mod domain;
mod outcome;
mod password;

pub use account::{Account, AccountBuilder};
pub use credential::{
    AuthMethod, AuthPurpose, Channel, PresentedCredential, RequestContext, SessionEndReason,
};
pub use domain::IdentityDomain;
pub use outcome::{AuthenticationOutcome, ResolutionResult, ResultCode};
pub use password::{EncryptionAlgorithm, PasswordRecord};
