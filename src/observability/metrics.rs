//! Scan counters
//!
//! Counters only, monotonic, relaxed atomics. One registry per controller
//! or shared across controllers through an `Arc`.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

#[derive(Debug, Default)]
pub struct ScanMetrics {
    ranges_planned: AtomicU64,
    slices_scanned: AtomicU64,
    ranges_skipped: AtomicU64,
    rows_read: AtomicU64,
    batches_delivered: AtomicU64,
    slices_evicted: AtomicU64,
}

impl ScanMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_ranges_planned(&self, n: u64) {
        self.ranges_planned.fetch_add(n, Ordering::Relaxed);
    }

    pub fn increment_slices_scanned(&self) {
        self.slices_scanned.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_ranges_skipped(&self, n: u64) {
        self.ranges_skipped.fetch_add(n, Ordering::Relaxed);
    }

    pub fn add_rows_read(&self, n: u64) {
        self.rows_read.fetch_add(n, Ordering::Relaxed);
    }

    pub fn increment_batches_delivered(&self) {
        self.batches_delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_slices_evicted(&self, n: u64) {
        self.slices_evicted.fetch_add(n, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            ranges_planned: self.ranges_planned.load(Ordering::Relaxed),
            slices_scanned: self.slices_scanned.load(Ordering::Relaxed),
            ranges_skipped: self.ranges_skipped.load(Ordering::Relaxed),
            rows_read: self.rows_read.load(Ordering::Relaxed),
            batches_delivered: self.batches_delivered.load(Ordering::Relaxed),
            slices_evicted: self.slices_evicted.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of all counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub ranges_planned: u64,
    pub slices_scanned: u64,
    pub ranges_skipped: u64,
    pub rows_read: u64,
    pub batches_delivered: u64,
    pub slices_evicted: u64,
}
