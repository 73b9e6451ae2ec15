//! Error types for foresight.
//!
//! All errors are strongly typed using thiserror so callers can pattern
//! match on the failure that actually happened. Collaborator traits
//! (`ManagedField`, `Oracle`, content sources) report their own narrow
//! error types which the engine lifts into [`PredictError`].

use thiserror::Error;

/// Validation errors raised while checking configuration and patterns.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid predictor configuration: {reason}")]
    InvalidConfig {
        reason: String,
    },

    #[error("Invalid descriptor pattern '{pattern}': {reason}")]
    InvalidPattern {
        pattern: String,
        reason: String,
    },
}

/// A single managed field failed to be read or written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("Field '{name}' rejected write: {reason}")]
    WriteRejected {
        name: String,
        reason: String,
    },

    #[error("Field '{name}' expected {expected} value, got {actual}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },
}

impl FieldError {
    /// Creates a write rejection for the named field.
    #[must_use]
    pub fn rejected(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::WriteRejected {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Name of the field that failed.
    #[must_use]
    pub fn field_name(&self) -> &str {
        match self {
            Self::WriteRejected { name, .. } | Self::TypeMismatch { name, .. } => name,
        }
    }
}

/// Raised by an oracle when it cannot compute an outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ComputeError {
    message: String,
}

impl ComputeError {
    /// Creates a compute error with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The message reported by the oracle.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Raised by content sources and classifiers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("Content unavailable: {reason}")]
    ContentUnavailable {
        reason: String,
    },

    #[error("Record {key} could not be classified: {reason}")]
    Unclassifiable {
        key: u32,
        reason: String,
    },
}

/// Top-level error type for foresight.
#[derive(Debug, Error)]
pub enum PredictError {
    #[error("Configuration error: {reason}")]
    Configuration {
        reason: String,
    },

    #[error("Invalid range: first ({first}) must not be greater than last ({last})")]
    InvalidRange {
        first: u64,
        last: u64,
    },

    #[error("Failed to restore {} field(s): {}", .failures.len(), join_failures(.failures))]
    RestoreFailure {
        failures: Vec<FieldError>,
    },

    #[error("Compute failed at counter {counter}{}: {reason}", describe_item(.item.as_deref()))]
    ComputeFailure {
        counter: u64,
        item: Option<String>,
        reason: String,
    },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

fn join_failures(failures: &[FieldError]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

fn describe_item(item: Option<&str>) -> String {
    item.map(|i| format!(" for item {i}")).unwrap_or_default()
}

impl PredictError {
    /// Creates a configuration error.
    #[must_use]
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    /// Returns true if this is a configuration error.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }

    /// Returns true if this is an invalid range error.
    #[must_use]
    pub const fn is_invalid_range(&self) -> bool {
        matches!(self, Self::InvalidRange { .. })
    }

    /// Returns true if one or more fields failed to restore.
    #[must_use]
    pub const fn is_restore_failure(&self) -> bool {
        matches!(self, Self::RestoreFailure { .. })
    }

    /// Returns true if the oracle failed to compute an outcome.
    #[must_use]
    pub const fn is_compute_failure(&self) -> bool {
        matches!(self, Self::ComputeFailure { .. })
    }

    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if the same call may succeed later without changes.
    ///
    /// Only configuration errors qualify: a host that was not ready may become
    /// ready. Nothing is retried automatically.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }
}

/// Result type alias for foresight operations.
pub type PredictResult<T> = Result<T, PredictError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_range_message() {
        let err = PredictError::InvalidRange { first: 7, last: 3 };
        let msg = format!("{err}");
        assert!(msg.contains("first (7)"));
        assert!(msg.contains("last (3)"));
        assert!(err.is_invalid_range());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_restore_failure_lists_every_field() {
        let err = PredictError::RestoreFailure {
            failures: vec![
                FieldError::rejected("counter", "locked"),
                FieldError::rejected("luck", "read-only"),
            ],
        };
        let msg = format!("{err}");
        assert!(msg.contains("2 field(s)"));
        assert!(msg.contains("counter"));
        assert!(msg.contains("luck"));
        assert!(err.is_restore_failure());
    }

    #[test]
    fn test_compute_failure_with_and_without_item() {
        let with_item = PredictError::ComputeFailure {
            counter: 5,
            item: Some("ItemId(535)".to_string()),
            reason: "boom".to_string(),
        };
        let msg = format!("{with_item}");
        assert!(msg.contains("counter 5"));
        assert!(msg.contains("ItemId(535)"));
        assert!(msg.contains("boom"));

        let without_item = PredictError::ComputeFailure {
            counter: 9,
            item: None,
            reason: "counter rejected".to_string(),
        };
        let msg = format!("{without_item}");
        assert!(!msg.contains("for item"));
        assert!(without_item.is_compute_failure());
    }

    #[test]
    fn test_configuration_is_retryable() {
        let err = PredictError::configuration("oracle not ready");
        assert!(err.is_configuration());
        assert!(err.is_retryable());
        assert!(format!("{err}").contains("oracle not ready"));
    }

    #[test]
    fn test_from_validation() {
        let err: PredictError = ValidationError::InvalidConfig {
            reason: "default_distance must be > 0".to_string(),
        }
        .into();
        assert!(err.is_validation());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_field_error_name() {
        let err = FieldError::TypeMismatch {
            name: "counter".to_string(),
            expected: "unsigned",
            actual: "bool",
        };
        assert_eq!(err.field_name(), "counter");
        assert!(format!("{err}").contains("expected unsigned value"));
    }
}
