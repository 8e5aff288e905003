//! One quantum of reads
//!
//! A slice covers `[start, stop)` and holds the ranges already clamped to
//! that window. Rows are fetched exactly once; a fetched slice is immutable.

use crate::range::ScanRange;
use crate::storage::{LogfileRow, LogfileStorage};

use super::errors::{BatchError, BatchResult};
use super::weight::SliceCost;

#[derive(Debug, Clone)]
enum SliceState {
    Pending,
    Fetched { rows: Vec<LogfileRow>, weight: f64 },
}

#[derive(Debug, Clone)]
pub struct Slice {
    start: i64,
    stop: i64,
    ranges: Vec<ScanRange>,
    state: SliceState,
}

impl Slice {
    pub fn new(start: i64, stop: i64, ranges: Vec<ScanRange>) -> Self {
        Self {
            start,
            stop,
            ranges,
            state: SliceState::Pending,
        }
    }

    /// Read every range from storage. A second call is a no-op.
    pub fn fetch<S, C>(&mut self, storage: &S, cost: &C) -> BatchResult<()>
    where
        S: LogfileStorage + ?Sized,
        C: SliceCost + ?Sized,
    {
        if self.is_fetched() {
            return Ok(());
        }

        let mut rows = Vec::new();
        for range in &self.ranges {
            let request = range.to_scan_request();
            let mut scanned = storage.scan(&request).map_err(|e| {
                BatchError::scan_failed(range.stream_id(), self.start, self.stop, &e)
            })?;
            rows.append(&mut scanned);
        }
        let weight = cost.weight(&rows);
        self.state = SliceState::Fetched { rows, weight };
        Ok(())
    }

    pub fn start(&self) -> i64 {
        self.start
    }

    /// Exclusive end of the window
    pub fn stop(&self) -> i64 {
        self.stop
    }

    pub fn ranges(&self) -> &[ScanRange] {
        &self.ranges
    }

    pub fn is_fetched(&self) -> bool {
        matches!(self.state, SliceState::Fetched { .. })
    }

    /// Fetched rows; empty while pending
    pub fn rows(&self) -> &[LogfileRow] {
        match &self.state {
            SliceState::Fetched { rows, .. } => rows,
            SliceState::Pending => &[],
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows().len()
    }

    pub fn weight(&self) -> f64 {
        match self.state {
            SliceState::Fetched { weight, .. } => weight,
            SliceState::Pending => 0.0,
        }
    }

    /// Window lies within `[start, end)`
    pub fn within(&self, start: i64, end: i64) -> bool {
        self.start >= start && self.stop <= end
    }
}
