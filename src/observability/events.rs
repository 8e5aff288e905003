//! Lifecycle events emitted by the planner and the batching controller

use std::fmt;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    ConfigLoaded,

    // Planning
    QueryReceived,
    RewriteRuleApplied,
    RewriteComplete,
    DefaultsInjected,
    PlanComplete,
    PlanRejected,

    // Batching
    RangeSkipped,
    SliceScanned,
    BatchComplete,
    ScanFailed,
    Commit,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::QueryReceived => "QUERY_RECEIVED",
            Event::RewriteRuleApplied => "REWRITE_RULE_APPLIED",
            Event::RewriteComplete => "REWRITE_COMPLETE",
            Event::DefaultsInjected => "DEFAULTS_INJECTED",
            Event::PlanComplete => "PLAN_COMPLETE",
            Event::PlanRejected => "PLAN_REJECTED",
            Event::RangeSkipped => "RANGE_SKIPPED",
            Event::SliceScanned => "SLICE_SCANNED",
            Event::BatchComplete => "BATCH_COMPLETE",
            Event::ScanFailed => "SCAN_FAILED",
            Event::Commit => "COMMIT",
        }
    }

    /// Events that indicate a failed operation
    pub fn is_failure(&self) -> bool {
        matches!(self, Event::PlanRejected | Event::ScanFailed)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_are_screaming_snake() {
        let events = [
            Event::ConfigLoaded,
            Event::QueryReceived,
            Event::RewriteRuleApplied,
            Event::RewriteComplete,
            Event::DefaultsInjected,
            Event::PlanComplete,
            Event::PlanRejected,
            Event::RangeSkipped,
            Event::SliceScanned,
            Event::BatchComplete,
            Event::ScanFailed,
            Event::Commit,
        ];
        for event in events {
            let name = event.as_str();
            assert!(name.chars().all(|c| c.is_ascii_uppercase() || c == '_'), "{}", name);
        }
    }

    #[test]
    fn test_failure_events() {
        assert!(Event::PlanRejected.is_failure());
        assert!(Event::ScanFailed.is_failure());
        assert!(!Event::Commit.is_failure());
    }
}
