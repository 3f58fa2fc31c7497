//! Identity domain reference.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A configured external identity directory (e.g. an Active-Directory
/// forest).
///
/// At most one entry is *the* source for a given fully-qualified name;
/// multiple accounts may reference the same domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityDomain {
    /// Fully-qualified domain name, lowercased.
    pub name: String,

    /// Whether accounts in this domain may currently authenticate.
    pub active: bool,

    /// Connectivity settings (hosts, ports, base DNs), opaque to this
    /// subsystem.
    #[serde(default)]
    pub connectivity: HashMap<String, String>,
}

impl IdentityDomain {
    /// Creates a new active domain with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into().to_lowercase(),
            active: true,
            connectivity: HashMap::new(),
        }
    }

    /// Sets whether the domain is active.
    #[must_use]
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Adds a connectivity setting.
    #[must_use]
    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.connectivity.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_name_is_lowercased() {
        let domain = IdentityDomain::new("AD.Hospital.ORG");
        assert_eq!(domain.name, "ad.hospital.org");
        assert!(domain.active);
    }

    #[test]
    fn test_inactive_domain() {
        let domain = IdentityDomain::new("legacy.hospital.org").with_active(false);
        assert!(!domain.active);
    }
}
