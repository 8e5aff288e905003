//! # Prefilter Errors

use thiserror::Error;

pub type PrefilterResult<T> = Result<T, PrefilterError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PrefilterError {
    #[error("Tried to create a filter without any tokens")]
    NoTokens,

    #[error("Invalid filter parameters: {0}")]
    InvalidParameters(String),

    #[error("Corrupt filter blob: {0}")]
    Corrupt(String),
}

impl PrefilterError {
    /// The prefilter is an optimization; its failures are never retried
    pub fn retryable(&self) -> bool {
        false
    }
}
