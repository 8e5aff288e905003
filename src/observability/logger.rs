//! Structured JSON logger
//!
//! - One log line = one event
//! - `event` first, `severity` second, remaining keys sorted
//! - Synchronous, no buffering
//! - Process-wide minimum severity, default WARN

use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};

use serde_json::{Map, Value};

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Rule firings, per-range scan detail
    Trace = 0,
    /// Plan and batch milestones
    Info = 1,
    /// Skipped work, degraded fallbacks
    Warn = 2,
    /// Failed operations
    Error = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Trace => "TRACE",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
        }
    }

    fn from_u8(level: u8) -> Self {
        match level {
            0 => Severity::Trace,
            1 => Severity::Info,
            2 => Severity::Warn,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "TRACE" => Ok(Severity::Trace),
            "INFO" => Ok(Severity::Info),
            "WARN" => Ok(Severity::Warn),
            "ERROR" => Ok(Severity::Error),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

static MIN_SEVERITY: AtomicU8 = AtomicU8::new(Severity::Warn as u8);

/// Stateless JSON line logger
pub struct Logger;

impl Logger {
    /// Set the process-wide minimum severity
    pub fn set_min_severity(severity: Severity) {
        MIN_SEVERITY.store(severity as u8, Ordering::Relaxed);
    }

    pub fn min_severity() -> Severity {
        Severity::from_u8(MIN_SEVERITY.load(Ordering::Relaxed))
    }

    pub fn enabled(severity: Severity) -> bool {
        severity >= Self::min_severity()
    }

    /// Log an event to stderr; stdout is left to command output
    pub fn log(severity: Severity, event: &str, fields: &[(&str, &str)]) {
        if !Self::enabled(severity) {
            return;
        }
        Self::write_line(severity, event, fields, &mut io::stderr());
    }

    fn write_line<W: Write>(severity: Severity, event: &str, fields: &[(&str, &str)], writer: &mut W) {
        let line = Self::render(severity, event, fields);
        // Logging failures never propagate into query execution
        let _ = writer.write_all(line.as_bytes());
        let _ = writer.flush();
    }

    /// Render a single log line, newline terminated
    pub fn render(severity: Severity, event: &str, fields: &[(&str, &str)]) -> String {
        let mut sorted: Vec<&(&str, &str)> = fields.iter().collect();
        sorted.sort_by_key(|(k, _)| *k);

        // serde_json::Map keeps insertion order only with preserve_order, so
        // the head keys are written by hand and the tail is appended sorted.
        let mut out = String::with_capacity(128);
        out.push_str("{\"event\":");
        out.push_str(&Value::String(event.to_string()).to_string());
        out.push_str(",\"severity\":\"");
        out.push_str(severity.as_str());
        out.push('"');

        let mut tail = Map::new();
        for (key, value) in sorted {
            if *key == "event" || *key == "severity" {
                continue;
            }
            tail.insert((*key).to_string(), Value::String((*value).to_string()));
        }
        for (key, value) in &tail {
            out.push(',');
            out.push_str(&Value::String(key.clone()).to_string());
            out.push(':');
            out.push_str(&value.to_string());
        }
        out.push_str("}\n");
        out
    }
}
