//! Observability for planning and batching
//!
//! - Structured JSON log lines
//! - Typed lifecycle events
//! - Monotonic scan counters
//!
//! Observability is read-only: nothing here can fail a query.

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsSnapshot, ScanMetrics};

/// Log a lifecycle event at the severity it implies
pub fn log_event(event: Event, fields: &[(&str, &str)]) {
    let severity = if event.is_failure() {
        Severity::Error
    } else {
        Severity::Info
    };
    Logger::log(severity, event.as_str(), fields);
}

/// Log a lifecycle event at an explicit severity
pub fn log_event_at(severity: Severity, event: Event, fields: &[(&str, &str)]) {
    Logger::log(severity, event.as_str(), fields);
}
