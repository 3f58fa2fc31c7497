//! Presented credentials and request context.

use serde::{Deserialize, Serialize};

/// How a credential was presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    /// Typed user id and password.
    Password,
    /// Badge card swipe.
    Card,
    /// RFID card tap.
    Rfid,
    /// Fingerprint reader.
    Fingerprint,
    /// Smart-card certificate.
    SmartCard,
}

impl std::fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Password => write!(f, "password"),
            Self::Card => write!(f, "card"),
            Self::Rfid => write!(f, "rfid"),
            Self::Fingerprint => write!(f, "fingerprint"),
            Self::SmartCard => write!(f, "smart-card"),
        }
    }
}

/// Why the credential was presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthPurpose {
    /// Initial sign-in at a device or the web console.
    SignIn,
    /// Unlocking an in-progress session.
    Unlock,
    /// Witness / co-sign of another user's action.
    Witness,
    /// Re-authentication for a password change.
    ChangePassword,
}

impl std::fmt::Display for AuthPurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SignIn => write!(f, "sign-in"),
            Self::Unlock => write!(f, "unlock"),
            Self::Witness => write!(f, "witness"),
            Self::ChangePassword => write!(f, "change-password"),
        }
    }
}

/// A credential as presented by a user. Transient: never persisted as
/// typed.
#[derive(Debug, Clone)]
pub struct PresentedCredential {
    /// User id exactly as typed (or as read from a card/scanner).
    pub user_id: String,
    /// Password, when the method carries one.
    pub password: Option<String>,
    /// How the credential was presented.
    pub method: AuthMethod,
    /// Why the credential was presented.
    pub purpose: AuthPurpose,
}

impl PresentedCredential {
    /// A typed user id / password pair for sign-in.
    #[must_use]
    pub fn password(user_id: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            password: Some(password.into()),
            method: AuthMethod::Password,
            purpose: AuthPurpose::SignIn,
        }
    }

    /// A non-password credential (card, RFID, fingerprint, smart card).
    #[must_use]
    pub fn token(user_id: impl Into<String>, method: AuthMethod) -> Self {
        Self {
            user_id: user_id.into(),
            password: None,
            method,
            purpose: AuthPurpose::SignIn,
        }
    }

    /// Overrides the purpose.
    #[must_use]
    pub fn for_purpose(mut self, purpose: AuthPurpose) -> Self {
        self.purpose = purpose;
        self
    }
}

/// The channel an authentication request arrived on.
///
/// The web console and the dispensing devices have distinct compliance
/// requirements for audit on resolution failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// A dispensing device UI.
    Device,
    /// The web console.
    Web,
}

/// Per-request context threaded through the service surface.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Inbound channel.
    pub channel: Channel,
    /// Station or device identifier, when known.
    pub station: Option<String>,
}

impl RequestContext {
    /// Context for a device request.
    #[must_use]
    pub fn device(station: impl Into<String>) -> Self {
        Self {
            channel: Channel::Device,
            station: Some(station.into()),
        }
    }

    /// Context for a web-console request.
    #[must_use]
    pub fn web() -> Self {
        Self {
            channel: Channel::Web,
            station: None,
        }
    }
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEndReason {
    /// The user signed out.
    Manual,
    /// The session idled past its timeout.
    Timeout,
    /// The device lost power mid-session.
    PowerFailure,
}

impl std::fmt::Display for SessionEndReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Manual => write!(f, "manual"),
            Self::Timeout => write!(f, "timeout"),
            Self::PowerFailure => write!(f, "power-failure"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_credential() {
        let cred = PresentedCredential::password("jdoe", "s3cret");
        assert_eq!(cred.method, AuthMethod::Password);
        assert_eq!(cred.purpose, AuthPurpose::SignIn);
        assert_eq!(cred.password.as_deref(), Some("s3cret"));
    }

    #[test]
    fn test_token_credential_with_purpose() {
        let cred =
            PresentedCredential::token("0042117", AuthMethod::Rfid).for_purpose(AuthPurpose::Witness);
        assert_eq!(cred.method, AuthMethod::Rfid);
        assert_eq!(cred.purpose, AuthPurpose::Witness);
        assert!(cred.password.is_none());
    }

    #[test]
    fn test_display() {
        assert_eq!(AuthMethod::SmartCard.to_string(), "smart-card");
        assert_eq!(AuthPurpose::ChangePassword.to_string(), "change-password");
        assert_eq!(SessionEndReason::PowerFailure.to_string(), "power-failure");
    }
}
