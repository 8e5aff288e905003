//! # Metadata Errors

use thiserror::Error;

use crate::expr::Operation;
use crate::prefilter::PrefilterError;

pub type MetadataResult<T> = Result<T, MetadataError>;

#[derive(Debug, Clone, Error)]
pub enum MetadataError {
    #[error("Stream metadata unavailable: {0}")]
    Unavailable(String),

    #[error("Operation {operation} is not supported for {field}")]
    UnsupportedOperation { field: &'static str, operation: Operation },

    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Prefilter error: {0}")]
    Prefilter(#[from] PrefilterError),
}

impl MetadataError {
    /// Only lookups that failed on I/O are worth repeating
    pub fn retryable(&self) -> bool {
        matches!(self, MetadataError::Unavailable(_))
    }
}
