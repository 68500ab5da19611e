//! Error types for the storage module.

use thiserror::Error;

use crate::crypto::CryptoError;

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage backend errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying file I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Encrypting or decrypting a record failed
    #[error("cipher error: {0}")]
    Crypto(#[from] CryptoError),

    /// Serializing a record failed
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// SQL backend failed
    #[error("SQL error: {0}")]
    Sql(#[from] rusqlite::Error),

    /// Schema or field name cannot be sanitized into a table/column name
    #[error("invalid store name: '{0}'")]
    InvalidName(String),
}
