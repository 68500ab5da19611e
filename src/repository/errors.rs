//! Error types for repository operations.
//!
//! The taxonomy keeps "you may not" (`AccessDenied`), "it doesn't exist"
//! (`NotFound`) and "it didn't work" (`StorageFailure`) distinguishable for
//! every caller.

use thiserror::Error;

use crate::validation::ValidationErrors;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Repository operation errors
#[derive(Debug, Error)]
pub enum RepoError {
    /// Policy check failed; always paired with a suspicious audit entry
    #[error("access denied")]
    AccessDenied,

    /// The identifier has no live record
    #[error("record not found")]
    NotFound,

    /// Insert with an identifier already in use (duplicate, not malformed)
    #[error("duplicate identifier: '{0}' already exists")]
    Duplicate(String),

    /// Schema rule violation, with the field-to-messages mapping attached
    #[error("validation failed: {0}")]
    ValidationFailed(ValidationErrors),

    /// Backend I/O or parse failure, audited and converted to a generic
    /// signal rather than propagated as an unhandled fault
    #[error("storage failure: {0}")]
    StorageFailure(String),
}
