//! Errors surfaced by the backing stores and adapters.

use eclat_core::ValidationError;
use thiserror::Error;

/// Errors that can occur during a backing-store operation.
///
/// Nothing in this crate retries: every variant is returned to the caller,
/// which decides how to present it.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Transport, authentication or server failure talking to the remote store.
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Payload rejected, either locally or by the remote store.
    #[error("validation failed: {0}")]
    ValidationFailed(String),

    /// The identifier does not exist.
    #[error("not found")]
    NotFound,

    /// Locally persisted data could not be parsed.
    #[error("corrupt local state under {key}: {reason}")]
    CorruptLocalState {
        /// Storage key holding the unreadable value.
        key: String,
        /// Parser message.
        reason: String,
    },

    /// Local storage I/O failed.
    #[error("local storage error: {0}")]
    Storage(#[from] std::io::Error),
}

impl StoreError {
    /// Whether the error is the normal "no such record" outcome.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

impl From<ValidationError> for StoreError {
    fn from(err: ValidationError) -> Self {
        Self::ValidationFailed(err.to_string())
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        Self::BackendUnavailable(err.to_string())
    }
}

/// Result type alias for `StoreError`.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let err = StoreError::CorruptLocalState {
            key: "eclat_brands".to_string(),
            reason: "expected value at line 1 column 1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "corrupt local state under eclat_brands: expected value at line 1 column 1"
        );
        assert!(StoreError::NotFound.is_not_found());
    }

    #[test]
    fn test_validation_error_conversion() {
        let err: StoreError = ValidationError::Required("name").into();
        assert_eq!(err.to_string(), "validation failed: name is required");
    }
}
