//! Federated identity client for support accounts.
//!
//! Support (vendor/service) accounts are authoritative at an external
//! identity server and are synced into a local surrogate on first use.
//! This module defines the client contract and the profile-to-account
//! mapping used by the orchestrator's reconcile step.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::AuthResult;
use crate::types::Account;

/// Canonical profile returned by the federated identity server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FederationProfile {
    /// Subject identifier at the identity server.
    pub external_id: String,

    /// Login name.
    pub user_id: String,

    /// Given name, when the server provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,

    /// Family name, when the server provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

impl FederationProfile {
    /// Creates a profile with the required identifiers.
    #[must_use]
    pub fn new(external_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            external_id: external_id.into(),
            user_id: user_id.into(),
            first_name: None,
            last_name: None,
        }
    }

    /// Sets the given name.
    #[must_use]
    pub fn with_first_name(mut self, name: impl Into<String>) -> Self {
        self.first_name = Some(name.into());
        self
    }

    /// Sets the family name.
    #[must_use]
    pub fn with_last_name(mut self, name: impl Into<String>) -> Self {
        self.last_name = Some(name.into());
        self
    }
}

/// Client contract for the federated identity server.
#[async_trait]
pub trait FederationClient: Send + Sync {
    /// Fetches the canonical profile for an access token.
    ///
    /// Returns `None` when the token resolves to no profile.
    ///
    /// # Errors
    ///
    /// Returns an error when the identity server is unreachable. Callers
    /// treat this as non-fatal: clinical login availability must not
    /// depend on the federation link being up.
    async fn get_profile(&self, access_token: &str) -> AuthResult<Option<FederationProfile>>;
}

/// Builds the support-account shape stored for a federation profile.
#[must_use]
pub fn support_account_from_profile(profile: &FederationProfile) -> Account {
    let mut builder = Account::builder(&profile.user_id).support_user(true);
    if let Some(first) = &profile.first_name {
        builder = builder.first_name(first);
    }
    if let Some(last) = &profile.last_name {
        builder = builder.last_name(last);
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_support_account_from_profile() {
        let profile = FederationProfile::new("svc-9917", "vendor.tech")
            .with_first_name("Field")
            .with_last_name("Engineer");

        let account = support_account_from_profile(&profile);
        assert_eq!(account.user_id, "vendor.tech");
        assert!(account.support_user);
        assert!(account.is_synced());
        assert_eq!(account.display_name(), "Field Engineer");
    }

    #[test]
    fn test_profile_without_names() {
        let profile = FederationProfile::new("svc-1", "svc");
        let account = support_account_from_profile(&profile);
        assert_eq!(account.display_name(), "svc");
    }
}
