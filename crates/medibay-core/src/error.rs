//! Service error taxonomy.
//!
//! Every error crossing a service boundary is translated into one of the
//! variants below before leaving the owning subsystem. Authentication
//! *outcomes* (not found, wrong password, locked, inactive domain) are not
//! errors; they are normal return values of the result-code enumeration.
//! Exceptions are reserved for truly exceptional conditions.

use thiserror::Error;

/// Errors that can cross a medibay service boundary.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Malformed input; a caller bug.
    #[error("Invalid argument: {message}")]
    ArgumentInvalid {
        /// Description of the malformed input.
        message: String,
    },

    /// One or more policy rules were violated. User-correctable.
    ///
    /// Always carries *every* rule violated during one validation pass,
    /// never just the first.
    #[error("Policy violation: {}", violations.join("; "))]
    PolicyViolation {
        /// Human-readable message for each violated rule, in rule order.
        violations: Vec<String>,
    },

    /// The caller is not permitted to perform the operation.
    #[error("Access denied: {message}")]
    AccessDenied {
        /// Description of why access was denied.
        message: String,
    },

    /// An optimistic-concurrency write lost a race. Retryable.
    #[error("Data conflict: {message}")]
    DataConflict {
        /// Description of the conflicting write.
        message: String,
    },

    /// A referenced entity does not exist.
    #[error("Not found: {entity} {key}")]
    EntityNotFound {
        /// The kind of entity that was looked up.
        entity: String,
        /// The key that failed to resolve.
        key: String,
    },

    /// An unexpected lower-level failure, wrapped and logged, never
    /// silently swallowed.
    #[error("Unhandled error: {message}")]
    Unhandled {
        /// Description of the wrapped failure.
        message: String,
    },
}

impl ServiceError {
    /// Creates a new `ArgumentInvalid` error.
    #[must_use]
    pub fn argument_invalid(message: impl Into<String>) -> Self {
        Self::ArgumentInvalid {
            message: message.into(),
        }
    }

    /// Creates a new `PolicyViolation` error from the full violation list.
    #[must_use]
    pub fn policy_violation(violations: Vec<String>) -> Self {
        Self::PolicyViolation { violations }
    }

    /// Creates a new `AccessDenied` error.
    #[must_use]
    pub fn access_denied(message: impl Into<String>) -> Self {
        Self::AccessDenied {
            message: message.into(),
        }
    }

    /// Creates a new `DataConflict` error.
    #[must_use]
    pub fn data_conflict(message: impl Into<String>) -> Self {
        Self::DataConflict {
            message: message.into(),
        }
    }

    /// Creates a new `EntityNotFound` error.
    #[must_use]
    pub fn entity_not_found(entity: impl Into<String>, key: impl Into<String>) -> Self {
        Self::EntityNotFound {
            entity: entity.into(),
            key: key.into(),
        }
    }

    /// Creates a new `Unhandled` error.
    #[must_use]
    pub fn unhandled(message: impl Into<String>) -> Self {
        Self::Unhandled {
            message: message.into(),
        }
    }

    /// Returns `true` if this error is caused by caller input.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::ArgumentInvalid { .. }
                | Self::PolicyViolation { .. }
                | Self::AccessDenied { .. }
                | Self::EntityNotFound { .. }
        )
    }

    /// Returns `true` if the operation may succeed when retried.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::DataConflict { .. })
    }

    /// Returns the error category for logging and monitoring.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ArgumentInvalid { .. } => ErrorCategory::Validation,
            Self::PolicyViolation { .. } => ErrorCategory::Policy,
            Self::AccessDenied { .. } => ErrorCategory::Authorization,
            Self::DataConflict { .. } => ErrorCategory::Conflict,
            Self::EntityNotFound { .. } => ErrorCategory::NotFound,
            Self::Unhandled { .. } => ErrorCategory::Internal,
        }
    }
}

/// Categories of service errors for monitoring and classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Request validation errors.
    Validation,
    /// Credential-policy rule violations.
    Policy,
    /// Permission errors.
    Authorization,
    /// Optimistic-concurrency conflicts.
    Conflict,
    /// Missing entities.
    NotFound,
    /// Internal server errors.
    Internal,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation => write!(f, "validation"),
            Self::Policy => write!(f, "policy"),
            Self::Authorization => write!(f, "authorization"),
            Self::Conflict => write!(f, "conflict"),
            Self::NotFound => write!(f, "not-found"),
            Self::Internal => write!(f, "internal"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ServiceError::argument_invalid("user id must not be empty");
        assert_eq!(err.to_string(), "Invalid argument: user id must not be empty");

        let err = ServiceError::entity_not_found("Account", "a-17");
        assert_eq!(err.to_string(), "Not found: Account a-17");

        let err = ServiceError::data_conflict("credential version mismatch");
        assert_eq!(err.to_string(), "Data conflict: credential version mismatch");
    }

    #[test]
    fn test_policy_violation_lists_every_rule() {
        let err = ServiceError::policy_violation(vec![
            "too short".to_string(),
            "matches a dictionary word".to_string(),
        ]);
        let rendered = err.to_string();
        assert!(rendered.contains("too short"));
        assert!(rendered.contains("matches a dictionary word"));
    }

    #[test]
    fn test_error_predicates() {
        assert!(ServiceError::argument_invalid("x").is_client_error());
        assert!(ServiceError::policy_violation(vec![]).is_client_error());
        assert!(!ServiceError::unhandled("boom").is_client_error());

        assert!(ServiceError::data_conflict("x").is_retryable());
        assert!(!ServiceError::access_denied("x").is_retryable());
    }

    #[test]
    fn test_error_category() {
        assert_eq!(
            ServiceError::argument_invalid("x").category(),
            ErrorCategory::Validation
        );
        assert_eq!(
            ServiceError::policy_violation(vec![]).category(),
            ErrorCategory::Policy
        );
        assert_eq!(
            ServiceError::data_conflict("x").category(),
            ErrorCategory::Conflict
        );
        assert_eq!(
            ServiceError::unhandled("x").category(),
            ErrorCategory::Internal
        );
        assert_eq!(ErrorCategory::NotFound.to_string(), "not-found");
    }
}
