//! Error types for value access.

use thiserror::Error;

/// Errors that can occur while pulling a value out of caller data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    /// The accessor produced a value whose shape cannot fill the target.
    #[error("value for '{name}' has the wrong shape: expected {expected}, got {actual}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// A custom accessor failed to read the value.
    #[error("failed to access '{name}': {message}")]
    Failed { name: String, message: String },
}

impl AccessError {
    /// Create a type mismatch error.
    pub fn mismatch(name: impl Into<String>, expected: &'static str, actual: &'static str) -> Self {
        Self::TypeMismatch {
            name: name.into(),
            expected,
            actual,
        }
    }

    /// Create an accessor failure.
    pub fn failed(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failed {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// Result type for access operations.
pub type Result<T> = std::result::Result<T, AccessError>;
