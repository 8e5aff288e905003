//! Batching error types
//!
//! Error codes:
//! - ARCHIVE_BATCH_SCAN_FAILED (ERROR, retryable when the storage read was)
//! - ARCHIVE_BATCH_INVALID_WINDOW (REJECT)

use std::fmt;

use crate::storage::StorageError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Caller passed an invalid argument
    Reject,
    /// Collaborator failed, the whole call may be repeated
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchErrorCode {
    /// Storage read failed during increment
    ArchiveBatchScanFailed,
    /// Window with start after end
    ArchiveBatchInvalidWindow,
}

impl BatchErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            BatchErrorCode::ArchiveBatchScanFailed => "ARCHIVE_BATCH_SCAN_FAILED",
            BatchErrorCode::ArchiveBatchInvalidWindow => "ARCHIVE_BATCH_INVALID_WINDOW",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            BatchErrorCode::ArchiveBatchScanFailed => Severity::Error,
            BatchErrorCode::ArchiveBatchInvalidWindow => Severity::Reject,
        }
    }
}

impl fmt::Display for BatchErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[derive(Debug, Clone)]
pub struct BatchError {
    code: BatchErrorCode,
    message: String,
    retryable: bool,
}

impl BatchError {
    pub fn scan_failed(stream_id: u64, start: i64, stop: i64, err: &StorageError) -> Self {
        Self {
            code: BatchErrorCode::ArchiveBatchScanFailed,
            message: format!(
                "Scan of stream {} over [{}, {}) failed: {}",
                stream_id, start, stop, err
            ),
            retryable: err.retryable(),
        }
    }

    pub fn invalid_window(start: i64, end: i64) -> Self {
        Self {
            code: BatchErrorCode::ArchiveBatchInvalidWindow,
            message: format!("Window start {} is after end {}", start, end),
            retryable: false,
        }
    }

    pub fn code(&self) -> BatchErrorCode {
        self.code
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn retryable(&self) -> bool {
        self.retryable
    }
}

impl fmt::Display for BatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )
    }
}

impl std::error::Error for BatchError {}

pub type BatchResult<T> = Result<T, BatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            BatchErrorCode::ArchiveBatchScanFailed.code(),
            "ARCHIVE_BATCH_SCAN_FAILED"
        );
        assert_eq!(
            BatchErrorCode::ArchiveBatchInvalidWindow.code(),
            "ARCHIVE_BATCH_INVALID_WINDOW"
        );
    }

    #[test]
    fn test_scan_failure_inherits_retryability() {
        let io = BatchError::scan_failed(7, 0, 3600, &StorageError::Io("timeout".into()));
        assert!(io.retryable());
        assert!(io.to_string().contains("stream 7"));

        let corrupt = BatchError::scan_failed(7, 0, 3600, &StorageError::CorruptRow("bad".into()));
        assert!(!corrupt.retryable());
    }
}
