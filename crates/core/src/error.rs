//! Error types for the core domain.

use thiserror::Error;

/// Core domain error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid hash: {0}")]
    InvalidHash(String),

    #[error("unsupported image input: {0}")]
    UnsupportedImageInput(String),

    #[error("invalid storage key: {0}")]
    InvalidStorageKey(String),

    #[error("{field}: {message}")]
    Validation { field: String, message: String },

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Build a field-level validation error.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;
