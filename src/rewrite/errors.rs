//! Rewrite error types
//!
//! Error codes:
//! - ARCHIVE_REWRITE_DIVERGED (FATAL)

use std::fmt;

/// Severity levels for rewrite errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Query rejected, not retried
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
pub enum RewriteErrorCode {
    /// Fixed point not reached within the pass cap
    ArchiveRewriteDiverged,
}

impl RewriteErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            RewriteErrorCode::ArchiveRewriteDiverged => "ARCHIVE_REWRITE_DIVERGED",
        }
    }

    pub fn severity(&self) -> Severity {
        Severity::Fatal
    }
}

impl fmt::Display for RewriteErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[derive(Debug, Clone)]
pub struct RewriteError {
    code: RewriteErrorCode,
    message: String,
    passes: usize,
}

impl RewriteError {
    /// Create a diverged error after `passes` full passes
    pub fn diverged(passes: usize, node_count: usize) -> Self {
        Self {
            code: RewriteErrorCode::ArchiveRewriteDiverged,
            message: format!(
                "No fixed point after {} passes (tree has {} nodes)",
                passes, node_count
            ),
            passes,
        }
    }

    pub fn code(&self) -> RewriteErrorCode {
        self.code
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn passes(&self) -> usize {
        self.passes
    }

    /// Rewrite failures are never retried
    pub fn retryable(&self) -> bool {
        false
    }
}

impl fmt::Display for RewriteError {
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

impl std::error::Error for RewriteError {}

pub type RewriteResult<T> = Result<T, RewriteError>;
