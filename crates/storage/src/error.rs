//! Asset store error types.

use thiserror::Error;

/// Asset store operation errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("asset not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("upload failed: {reason}")]
    Upload { reason: String },

    #[error("remote store error: {0}")]
    Remote(String),

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("core error: {0}")]
    Core(#[from] backroom_core::Error),
}

/// Result type for asset store operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;
