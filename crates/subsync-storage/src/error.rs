//! Storage error types.

use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
///
/// `UnsupportedType` and `TooLarge` are validation failures and map to a
/// client error at the API boundary; the rest are persistence failures.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to configure media store: {0}")]
    ConfigError(String),

    #[error("File type not supported")]
    UnsupportedType(String),

    #[error("File exceeds upload limit: {size} > {limit} bytes")]
    TooLarge { size: usize, limit: usize },

    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Object store error: {0}")]
    Sdk(String),
}

impl StorageError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn unsupported_type(name: impl Into<String>) -> Self {
        Self::UnsupportedType(name.into())
    }

    pub fn write_failed(msg: impl Into<String>) -> Self {
        Self::WriteFailed(msg.into())
    }

    /// True when the error is the caller's fault rather than the store's.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            StorageError::UnsupportedType(_) | StorageError::TooLarge { .. }
        )
    }
}
