//! Range algebra errors
//!
//! Error codes:
//! - ARCHIVE_RANGE_UNMERGEABLE (FATAL)
//! - ARCHIVE_RANGE_INVERTED (FATAL)
//!
//! Both indicate a caller invariant violation and are never retried.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeErrorCode {
    /// Merge of ranges that do not intersect
    ArchiveRangeUnmergeable,
    /// earliest > latest
    ArchiveRangeInverted,
}

impl RangeErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            RangeErrorCode::ArchiveRangeUnmergeable => "ARCHIVE_RANGE_UNMERGEABLE",
            RangeErrorCode::ArchiveRangeInverted => "ARCHIVE_RANGE_INVERTED",
        }
    }

    pub fn severity(&self) -> Severity {
        Severity::Fatal
    }
}

impl fmt::Display for RangeErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[derive(Debug, Clone)]
pub struct RangeError {
    code: RangeErrorCode,
    message: String,
}

impl RangeError {
    pub fn unmergeable(left: impl fmt::Display, right: impl fmt::Display) -> Self {
        Self {
            code: RangeErrorCode::ArchiveRangeUnmergeable,
            message: format!("Ranges {} and {} do not intersect", left, right),
        }
    }

    pub fn inverted(stream_id: u64, earliest: i64, latest: i64) -> Self {
        Self {
            code: RangeErrorCode::ArchiveRangeInverted,
            message: format!(
                "Range for stream {} has earliest {} after latest {}",
                stream_id, earliest, latest
            ),
        }
    }

    pub fn code(&self) -> RangeErrorCode {
        self.code
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn retryable(&self) -> bool {
        false
    }
}

impl fmt::Display for RangeError {
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

impl std::error::Error for RangeError {}

pub type RangeResult<T> = Result<T, RangeError>;
