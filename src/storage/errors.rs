//! # Storage Errors

use thiserror::Error;

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Corrupt row: {0}")]
    CorruptRow(String),
}

impl StorageError {
    /// I/O failures may be retried against the same window
    pub fn retryable(&self) -> bool {
        matches!(self, StorageError::Io(_))
    }
}
