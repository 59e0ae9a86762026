//! Error types for the resource model.

use thiserror::Error;

/// Result type alias for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors that can occur while constructing model values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Configuration validation failed for '{descriptor}': {reason}")]
    ConfigurationValidation { descriptor: String, reason: String },

    #[error("Invalid environment: {0}")]
    InvalidEnvironment(String),
}

impl ModelError {
    pub fn invalid(descriptor: impl Into<String>, reason: impl Into<String>) -> Self {
        ModelError::ConfigurationValidation {
            descriptor: descriptor.into(),
            reason: reason.into(),
        }
    }
}
