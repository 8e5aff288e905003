//! CLI-specific error types
//!
//! Every CLI error ends the process with a non-zero status.

use std::fmt;
use std::io;

use crate::batch::BatchError;
use crate::config::ConfigError;
use crate::metadata::MetadataError;
use crate::planner::PlannerError;
use crate::storage::StorageError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// Input file or stdout error
    IoError,
    /// Planning or pulling failed
    QueryFailed,
}

impl CliErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "ARCHIVE_CLI_CONFIG_ERROR",
            Self::IoError => "ARCHIVE_CLI_IO_ERROR",
            Self::QueryFailed => "ARCHIVE_CLI_QUERY_FAILED",
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn query_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::QueryFailed, msg)
    }

    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::config_error(e.to_string())
    }
}

impl From<MetadataError> for CliError {
    fn from(e: MetadataError) -> Self {
        Self::io_error(format!("catalog: {}", e))
    }
}

impl From<StorageError> for CliError {
    fn from(e: StorageError) -> Self {
        Self::io_error(format!("archive: {}", e))
    }
}

impl From<PlannerError> for CliError {
    fn from(e: PlannerError) -> Self {
        Self::query_failed(e.to_string())
    }
}

impl From<BatchError> for CliError {
    fn from(e: BatchError) -> Self {
        Self::query_failed(e.to_string())
    }
}

pub type CliResult<T> = Result<T, CliError>;
