//! Archive scan configuration
//!
//! Loaded from a JSON file. Every field has a default, so `{}` is a valid
//! config. Values are validated after load and before any query is planned.

mod errors;

pub use errors::{ConfigError, ConfigResult};

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::batch::BatchSettings;
use crate::observability::{log_event, Event, Logger, Severity};
use crate::rewrite::{DefaultInjector, Optimizer};

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveConfig {
    #[serde(default)]
    pub batch: BatchConfig,

    #[serde(default)]
    pub archive: ArchiveWindowConfig,

    #[serde(default)]
    pub rewrite: RewriteConfig,

    #[serde(default)]
    pub prefilter: PrefilterConfig,

    /// Minimum log severity (default: "WARN")
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Slicing and backpressure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Width of one slice in seconds (default: 3600)
    #[serde(default = "default_quantum_length_secs")]
    pub quantum_length_secs: i64,

    /// Weight ceiling per increment (default: 1_000_000)
    #[serde(default = "default_weight_limit")]
    pub weight_limit: f64,

    /// Record ceiling per increment (default: 10_000)
    #[serde(default = "default_record_count_limit")]
    pub record_count_limit: u64,

    /// Expected compressed/uncompressed ratio (default: 0.15)
    #[serde(default = "default_compression_ratio")]
    pub compression_ratio: f64,

    /// Relative decode speed (default: 1.0)
    #[serde(default = "default_processing_speed")]
    pub processing_speed: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveWindowConfig {
    /// Stop offset for sessions without ranges (default: 0)
    #[serde(default)]
    pub include_before_epoch: i64,

    /// Look-back used for missing EARLIEST bounds (default: one day)
    #[serde(default = "default_earliest_secs")]
    pub default_earliest_secs: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewriteConfig {
    /// Fixed-point pass cap (default: 64)
    #[serde(default = "default_max_passes")]
    pub max_passes: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrefilterConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Expected distinct tokens (default: 1000)
    #[serde(default = "default_expected_items")]
    pub expected_items: usize,

    /// Target false-positive rate (default: 0.01)
    #[serde(default = "default_false_positive_rate")]
    pub false_positive_rate: f64,
}

fn default_log_level() -> String {
    "WARN".to_string()
}
fn default_quantum_length_secs() -> i64 {
    3600
}
fn default_weight_limit() -> f64 {
    1_000_000.0
}
fn default_record_count_limit() -> u64 {
    10_000
}
fn default_compression_ratio() -> f64 {
    0.15
}
fn default_processing_speed() -> f64 {
    1.0
}
fn default_earliest_secs() -> i64 {
    crate::rewrite::DEFAULT_WINDOW_SECS
}
fn default_max_passes() -> usize {
    crate::rewrite::DEFAULT_MAX_PASSES
}
fn default_expected_items() -> usize {
    1000
}
fn default_false_positive_rate() -> f64 {
    0.01
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            batch: BatchConfig::default(),
            archive: ArchiveWindowConfig::default(),
            rewrite: RewriteConfig::default(),
            prefilter: PrefilterConfig::default(),
            log_level: default_log_level(),
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            quantum_length_secs: default_quantum_length_secs(),
            weight_limit: default_weight_limit(),
            record_count_limit: default_record_count_limit(),
            compression_ratio: default_compression_ratio(),
            processing_speed: default_processing_speed(),
        }
    }
}

impl Default for ArchiveWindowConfig {
    fn default() -> Self {
        Self {
            include_before_epoch: 0,
            default_earliest_secs: default_earliest_secs(),
        }
    }
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            max_passes: default_max_passes(),
        }
    }
}

impl Default for PrefilterConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            expected_items: default_expected_items(),
            false_positive_rate: default_false_positive_rate(),
        }
    }
}

fn positive_finite(field: &'static str, value: f64) -> ConfigResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("must be finite and > 0, got {}", value)))
    }
}

impl ArchiveConfig {
    /// Load, validate and apply the log level
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::Read(format!("{}: {}", path.display(), e)))?;

        let config = Self::from_json(&content)?;
        Logger::set_min_severity(config.log_severity()?);

        log_event(
            Event::ConfigLoaded,
            &[
                ("path", &path.display().to_string()),
                ("prefilter", if config.prefilter.enabled { "on" } else { "off" }),
            ],
        );
        Ok(config)
    }

    /// Parse and validate without touching the logger
    pub fn from_json(content: &str) -> ConfigResult<Self> {
        let config: ArchiveConfig =
            serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.batch.quantum_length_secs <= 0 {
            return Err(ConfigError::invalid(
                "batch.quantum_length_secs",
                "must be > 0",
            ));
        }
        positive_finite("batch.weight_limit", self.batch.weight_limit)?;
        if self.batch.record_count_limit == 0 {
            return Err(ConfigError::invalid(
                "batch.record_count_limit",
                "must be > 0",
            ));
        }
        positive_finite("batch.compression_ratio", self.batch.compression_ratio)?;
        positive_finite("batch.processing_speed", self.batch.processing_speed)?;

        if self.archive.default_earliest_secs < 0 {
            return Err(ConfigError::invalid(
                "archive.default_earliest_secs",
                "must be >= 0",
            ));
        }
        if self.rewrite.max_passes == 0 {
            return Err(ConfigError::invalid("rewrite.max_passes", "must be > 0"));
        }

        let fpp = self.prefilter.false_positive_rate;
        if !(fpp > 0.0 && fpp < 1.0) {
            return Err(ConfigError::invalid(
                "prefilter.false_positive_rate",
                format!("must be in (0, 1), got {}", fpp),
            ));
        }
        if self.prefilter.enabled && self.prefilter.expected_items == 0 {
            return Err(ConfigError::invalid(
                "prefilter.expected_items",
                "must be > 0 when the prefilter is enabled",
            ));
        }

        self.log_severity()?;
        Ok(())
    }

    pub fn log_severity(&self) -> ConfigResult<Severity> {
        self.log_level
            .parse()
            .map_err(|reason: String| ConfigError::invalid("log_level", reason))
    }

    pub fn batch_settings(&self) -> BatchSettings {
        BatchSettings {
            quantum_length_secs: self.batch.quantum_length_secs,
            weight_limit: self.batch.weight_limit,
            record_count_limit: self.batch.record_count_limit,
            compression_ratio: self.batch.compression_ratio,
            processing_speed: self.batch.processing_speed,
            include_before_epoch: self.archive.include_before_epoch,
            default_earliest_secs: self.archive.default_earliest_secs,
        }
    }

    pub fn optimizer(&self) -> Optimizer {
        Optimizer::new(self.rewrite.max_passes)
    }

    pub fn injector(&self) -> DefaultInjector {
        DefaultInjector::new(self.archive.default_earliest_secs)
    }
}
