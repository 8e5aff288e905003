//! # Configuration Errors

use thiserror::Error;

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Bootstrap failures. All of them must surface before a query is accepted.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Read(String),

    #[error("Invalid config JSON: {0}")]
    Parse(String),

    #[error("Invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }

    /// A missing file may appear later; a malformed one will not fix itself
    pub fn retryable(&self) -> bool {
        matches!(self, ConfigError::Read(_))
    }
}
