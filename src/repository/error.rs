//! Repository error types
//!
//! Defines all errors a diary record source can report.

use thiserror::Error;

/// Errors that can occur while reading or writing diary records
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Fetch failed on the way to or from the store (network, auth, I/O).
    /// Recoverable: callers keep their previous data.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Requested diary does not exist for this owner
    #[error("Diary not found: {0}")]
    NotFound(String),

    /// The store rejected or failed the operation
    #[error("Storage error: {0}")]
    Storage(String),
}

impl RepositoryError {
    /// Whether a retry later may succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, RepositoryError::Transport(_))
    }
}

impl From<std::io::Error> for RepositoryError {
    fn from(err: std::io::Error) -> Self {
        RepositoryError::Transport(err.to_string())
    }
}

impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        RepositoryError::Storage(err.to_string())
    }
}

/// Result type alias for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;
