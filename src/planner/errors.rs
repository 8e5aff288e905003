//! Planner error types
//!
//! Error codes:
//! - ARCHIVE_PLAN_NESTED_LOGICAL (REJECT)
//! - ARCHIVE_PLAN_UNSUPPORTED_TAG (REJECT)
//! - ARCHIVE_PLAN_MISSING_TIME_BOUND (REJECT)
//! - ARCHIVE_PLAN_INVALID_TIME (REJECT)
//! - ARCHIVE_PLAN_REWRITE_FAILED (REJECT)
//! - ARCHIVE_PLAN_METADATA_FAILED (ERROR, retryable when the lookup was)

use std::fmt;

use crate::expr::{Operation, Tag};
use crate::metadata::MetadataError;
use crate::rewrite::RewriteError;

/// Severity levels for planner errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Query rejected, caller must change it
    Reject,
    /// Collaborator failed while planning
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
pub enum PlannerErrorCode {
    /// AND node with a nested AND/OR child
    ArchivePlanNestedLogical,
    /// Leaf that cannot take part in a scan
    ArchivePlanUnsupportedTag,
    /// Conjunction without EARLIEST or LATEST
    ArchivePlanMissingTimeBound,
    /// Time value that is not epoch seconds
    ArchivePlanInvalidTime,
    /// Rewrite did not reach a fixed point
    ArchivePlanRewriteFailed,
    /// Stream lookup failed
    ArchivePlanMetadataFailed,
}

impl PlannerErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            PlannerErrorCode::ArchivePlanNestedLogical => "ARCHIVE_PLAN_NESTED_LOGICAL",
            PlannerErrorCode::ArchivePlanUnsupportedTag => "ARCHIVE_PLAN_UNSUPPORTED_TAG",
            PlannerErrorCode::ArchivePlanMissingTimeBound => "ARCHIVE_PLAN_MISSING_TIME_BOUND",
            PlannerErrorCode::ArchivePlanInvalidTime => "ARCHIVE_PLAN_INVALID_TIME",
            PlannerErrorCode::ArchivePlanRewriteFailed => "ARCHIVE_PLAN_REWRITE_FAILED",
            PlannerErrorCode::ArchivePlanMetadataFailed => "ARCHIVE_PLAN_METADATA_FAILED",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            PlannerErrorCode::ArchivePlanMetadataFailed => Severity::Error,
            _ => Severity::Reject,
        }
    }
}

impl fmt::Display for PlannerErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Planner error type with full context
#[derive(Debug, Clone)]
pub struct PlannerError {
    code: PlannerErrorCode,
    message: String,
    retryable: bool,
}

impl PlannerError {
    fn new(code: PlannerErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn nested_logical(child: Tag) -> Self {
        Self::new(
            PlannerErrorCode::ArchivePlanNestedLogical,
            format!("AND node must not have {} nodes as children", child),
        )
    }

    pub fn unsupported_tag(tag: Tag, operation: Operation) -> Self {
        Self::new(
            PlannerErrorCode::ArchivePlanUnsupportedTag,
            format!("{} with operation {} cannot bound a scan", tag, operation),
        )
    }

    pub fn missing_time_bound(tag: Tag) -> Self {
        Self::new(
            PlannerErrorCode::ArchivePlanMissingTimeBound,
            format!("Conjunction has no {} leaf", tag),
        )
    }

    pub fn invalid_time(tag: Tag, value: &str) -> Self {
        Self::new(
            PlannerErrorCode::ArchivePlanInvalidTime,
            format!("{} value '{}' is not epoch seconds", tag, value),
        )
    }

    pub fn rewrite_failed(err: &RewriteError) -> Self {
        Self::new(PlannerErrorCode::ArchivePlanRewriteFailed, err.to_string())
    }

    pub fn metadata_failed(err: &MetadataError) -> Self {
        Self {
            code: PlannerErrorCode::ArchivePlanMetadataFailed,
            message: err.to_string(),
            retryable: err.retryable(),
        }
    }

    pub fn code(&self) -> PlannerErrorCode {
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

impl fmt::Display for PlannerError {
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

impl std::error::Error for PlannerError {}

impl From<RewriteError> for PlannerError {
    fn from(err: RewriteError) -> Self {
        PlannerError::rewrite_failed(&err)
    }
}

impl From<MetadataError> for PlannerError {
    fn from(err: MetadataError) -> Self {
        PlannerError::metadata_failed(&err)
    }
}

/// Result type for planner operations
pub type PlannerResult<T> = Result<T, PlannerError>;
