//! Configuration Loading Tests
//!
//! - Missing sections fall back to defaults
//! - Invalid values are rejected at load
//! - Loaded values reach the batching and rewrite settings

use std::fs;

use archivescan::config::{ArchiveConfig, ConfigError};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn write_config(dir: &TempDir, body: &str) -> std::path::PathBuf {
    let path = dir.path().join("archivescan.json");
    fs::write(&path, body).unwrap();
    path
}

// =============================================================================
// Load Tests
// =============================================================================

/// A full config file round-trips into controller settings.
#[test]
fn test_full_config() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"{
            "batch": {
                "quantum_length_secs": 900,
                "weight_limit": 5000.0,
                "record_count_limit": 250,
                "compression_ratio": 0.2,
                "processing_speed": 2.0
            },
            "archive": {
                "include_before_epoch": 1262905200,
                "default_earliest_secs": 3600
            },
            "rewrite": { "max_passes": 16 },
            "prefilter": { "enabled": true, "expected_items": 50, "false_positive_rate": 0.05 },
            "log_level": "WARN"
        }"#,
    );

    let config = ArchiveConfig::load(&path).unwrap();
    let settings = config.batch_settings();
    assert_eq!(settings.quantum_length_secs, 900);
    assert_eq!(settings.weight_limit, 5000.0);
    assert_eq!(settings.record_count_limit, 250);
    assert_eq!(settings.include_before_epoch, 1262905200);
    assert_eq!(config.optimizer().max_passes(), 16);
    assert_eq!(config.injector().window_secs(), 3600);
    assert!(config.prefilter.enabled);
}

/// An empty object is a complete config.
#[test]
fn test_empty_config_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "{}");
    let config = ArchiveConfig::load(&path).unwrap();
    assert_eq!(config, ArchiveConfig::default());
}

// =============================================================================
// Rejection Tests
// =============================================================================

/// Invalid values are reported with the offending field.
#[test]
fn test_invalid_values_rejected() {
    let dir = TempDir::new().unwrap();
    let cases = [
        (r#"{"batch": {"record_count_limit": 0}}"#, "batch.record_count_limit"),
        (r#"{"batch": {"processing_speed": 0.0}}"#, "batch.processing_speed"),
        (r#"{"rewrite": {"max_passes": 0}}"#, "rewrite.max_passes"),
        (
            r#"{"prefilter": {"enabled": true, "expected_items": 0}}"#,
            "prefilter.expected_items",
        ),
    ];
    for (body, expected) in cases {
        let path = write_config(&dir, body);
        match ArchiveConfig::load(&path) {
            Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, expected),
            other => panic!("{}: expected invalid, got {:?}", body, other),
        }
    }
}

/// Malformed JSON is a parse error, not an invalid value.
#[test]
fn test_malformed_json() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, r#"{"batch": "#);
    let err = ArchiveConfig::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
    assert!(!err.retryable());
}
