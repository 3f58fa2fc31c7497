//! Account identity record.

use medibay_core::AccountKey;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

fn default_datetime() -> OffsetDateTime {
    OffsetDateTime::now_utc()
}

/// An identity record known to the dispensing platform.
///
/// A user id is unique *within* a domain (or within "local"), never
/// globally: the same login name legitimately exists in multiple identity
/// systems at once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Local surrogate key. [`AccountKey::ZERO`] means the account has not
    /// yet synced down to this device.
    #[serde(default)]
    pub key: AccountKey,

    /// Login name as stored, lowercased.
    pub user_id: String,

    /// Given name (display).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,

    /// Family name (display).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,

    /// Fully-qualified identity-domain name. `None` means a local account
    /// whose credentials are owned by this system.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    /// Whether the account may authenticate at all.
    pub active: bool,

    /// Whether repeated failures have locked the account.
    #[serde(default)]
    pub locked: bool,

    /// Whether this is a temporary account.
    #[serde(default)]
    pub temporary: bool,

    /// Whether this identity is authoritative at the federated identity
    /// server (vendor/service account).
    #[serde(default)]
    pub support_user: bool,

    /// Enrolled badge card serial, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_serial: Option<String>,

    /// Enrolled RFID card serial, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rfid_card_serial: Option<String>,

    /// Scan code used at device scanners, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_code: Option<String>,

    /// Enrolled fingerprint template reference, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,

    /// When this record was created.
    #[serde(default = "default_datetime", with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Account {
    /// Creates a new active local account with the given user id.
    #[must_use]
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            key: AccountKey::generate(),
            user_id: user_id.into().to_lowercase(),
            first_name: None,
            last_name: None,
            domain: None,
            active: true,
            locked: false,
            temporary: false,
            support_user: false,
            card_serial: None,
            rfid_card_serial: None,
            scan_code: None,
            fingerprint: None,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    /// Creates a new account builder.
    #[must_use]
    pub fn builder(user_id: impl Into<String>) -> AccountBuilder {
        AccountBuilder::new(user_id)
    }

    /// Returns `true` for a local (non-domain) account.
    #[must_use]
    pub fn is_local(&self) -> bool {
        self.domain.is_none()
    }

    /// Returns `true` if the account has synced to this device.
    #[must_use]
    pub fn is_synced(&self) -> bool {
        !self.key.is_zero()
    }

    /// Display name assembled from the name parts.
    #[must_use]
    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(first), None) => first.clone(),
            (None, Some(last)) => last.clone(),
            (None, None) => self.user_id.clone(),
        }
    }
}

/// Builder for [`Account`] instances.
pub struct AccountBuilder {
    account: Account,
}

impl AccountBuilder {
    fn new(user_id: impl Into<String>) -> Self {
        Self {
            account: Account::new(user_id),
        }
    }

    /// Sets the surrogate key.
    #[must_use]
    pub fn key(mut self, key: AccountKey) -> Self {
        self.account.key = key;
        self
    }

    /// Marks the account as not yet synced to this device.
    #[must_use]
    pub fn unsynced(mut self) -> Self {
        self.account.key = AccountKey::ZERO;
        self
    }

    /// Sets the given name.
    #[must_use]
    pub fn first_name(mut self, name: impl Into<String>) -> Self {
        self.account.first_name = Some(name.into());
        self
    }

    /// Sets the family name.
    #[must_use]
    pub fn last_name(mut self, name: impl Into<String>) -> Self {
        self.account.last_name = Some(name.into());
        self
    }

    /// Places the account in an identity domain. The name is lowercased
    /// to match stored domain records.
    #[must_use]
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.account.domain = Some(domain.into().to_lowercase());
        self
    }

    /// Sets whether the account is active.
    #[must_use]
    pub fn active(mut self, active: bool) -> Self {
        self.account.active = active;
        self
    }

    /// Sets whether the account is locked.
    #[must_use]
    pub fn locked(mut self, locked: bool) -> Self {
        self.account.locked = locked;
        self
    }

    /// Marks the account as temporary.
    #[must_use]
    pub fn temporary(mut self, temporary: bool) -> Self {
        self.account.temporary = temporary;
        self
    }

    /// Marks the account as a federated support account.
    #[must_use]
    pub fn support_user(mut self, support: bool) -> Self {
        self.account.support_user = support;
        self
    }

    /// Sets the badge card serial.
    #[must_use]
    pub fn card_serial(mut self, serial: impl Into<String>) -> Self {
        self.account.card_serial = Some(serial.into());
        self
    }

    /// Sets the RFID card serial.
    #[must_use]
    pub fn rfid_card_serial(mut self, serial: impl Into<String>) -> Self {
        self.account.rfid_card_serial = Some(serial.into());
        self
    }

    /// Sets the device scan code.
    #[must_use]
    pub fn scan_code(mut self, code: impl Into<String>) -> Self {
        self.account.scan_code = Some(code.into());
        self
    }

    /// Builds the account.
    #[must_use]
    pub fn build(self) -> Account {
        self.account
    }
}
