//! Error types raised by repository implementations.

use stealth_core::{ErrorSeverity, StealthError};
use thiserror::Error;

/// Errors surfaced by repository implementations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("ledger lock was poisoned")]
    LockPoisoned,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(String),

    #[error("corrupted data: {0}")]
    CorruptedData(String),
}

impl StealthError for RepositoryError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            RepositoryError::Io(_) => ErrorSeverity::Recoverable,
            RepositoryError::LockPoisoned
            | RepositoryError::Json(_)
            | RepositoryError::CorruptedData(_) => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            RepositoryError::LockPoisoned => "REPOSITORY_LOCK_POISONED",
            RepositoryError::Io(_) => "REPOSITORY_IO",
            RepositoryError::Json(_) => "REPOSITORY_JSON",
            RepositoryError::CorruptedData(_) => "REPOSITORY_CORRUPTED_DATA",
        }
    }
}

pub type Result<T> = std::result::Result<T, RepositoryError>;
