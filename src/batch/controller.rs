//! Batching and offset controller
//!
//! Lifecycle: Idle -> Slicing -> Delivered -> Committed, with Slicing and
//! Delivered repeating for every `increment`.
//!
//! Offsets are epoch seconds. `stop_offset` is the inclusive last second a
//! session may read, so slicing runs over `[offset, stop_offset + 1)`.
//! Buffered slices are keyed by their exclusive end and only `commit`
//! releases them.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::analyze::TimeQualifiers;
use crate::expr::Expression;
use crate::observability::{log_event, Event, ScanMetrics};
use crate::planner::QueryPlan;
use crate::range::ScanRange;
use crate::storage::{LogfileRow, LogfileStorage};

use super::errors::{BatchError, BatchResult};
use super::limit::BatchLimit;
use super::slice::Slice;
use super::weight::{CompressedSizeCost, SliceCost};
use super::{Offset, PullSource};

/// Tunables of one controller
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchSettings {
    pub quantum_length_secs: i64,
    pub weight_limit: f64,
    pub record_count_limit: u64,
    pub compression_ratio: f64,
    pub processing_speed: f64,
    /// Stop offset when the plan has no ranges
    pub include_before_epoch: i64,
    /// Look-back of the last-resort initial offset
    pub default_earliest_secs: i64,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            quantum_length_secs: 3600,
            weight_limit: 1_000_000.0,
            record_count_limit: 10_000,
            compression_ratio: 0.15,
            processing_speed: 1.0,
            include_before_epoch: 0,
            default_earliest_secs: 86_400,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    Slicing,
    Delivered,
    Committed,
}

impl ControllerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ControllerState::Idle => "IDLE",
            ControllerState::Slicing => "SLICING",
            ControllerState::Delivered => "DELIVERED",
            ControllerState::Committed => "COMMITTED",
        }
    }
}

pub struct BatchController<S, C = CompressedSizeCost> {
    session_id: Uuid,
    session_start: i64,
    ranges: Vec<ScanRange>,
    query: Expression,
    storage: S,
    cost: C,
    settings: BatchSettings,
    slices: BTreeMap<Offset, Slice>,
    committed: Option<Offset>,
    state: ControllerState,
    metrics: Arc<ScanMetrics>,
}

impl<S: LogfileStorage> BatchController<S, CompressedSizeCost> {
    /// Controller over `ranges`. `query` is only walked when `ranges` is
    /// empty, to find an initial offset.
    pub fn new(
        ranges: Vec<ScanRange>,
        query: Expression,
        storage: S,
        settings: BatchSettings,
        session_start: i64,
    ) -> Self {
        let cost = CompressedSizeCost::new(settings.compression_ratio, settings.processing_speed);
        let settings = BatchSettings {
            quantum_length_secs: settings.quantum_length_secs.max(1),
            ..settings
        };
        let metrics = Arc::new(ScanMetrics::new());
        metrics.add_ranges_planned(ranges.len() as u64);

        Self {
            session_id: Uuid::new_v4(),
            session_start,
            ranges,
            query,
            storage,
            cost,
            settings,
            slices: BTreeMap::new(),
            committed: None,
            state: ControllerState::Idle,
            metrics,
        }
    }

    /// Controller whose session starts now
    pub fn start(ranges: Vec<ScanRange>, query: Expression, storage: S, settings: BatchSettings) -> Self {
        Self::new(ranges, query, storage, settings, Utc::now().timestamp())
    }

    pub fn from_plan(plan: &QueryPlan, storage: S, settings: BatchSettings, session_start: i64) -> Self {
        Self::new(plan.ranges(), plan.query.clone(), storage, settings, session_start)
    }
}

impl<S: LogfileStorage, C: SliceCost> BatchController<S, C> {
    /// Replace the cost model
    pub fn with_cost<C2: SliceCost>(self, cost: C2) -> BatchController<S, C2> {
        BatchController {
            session_id: self.session_id,
            session_start: self.session_start,
            ranges: self.ranges,
            query: self.query,
            storage: self.storage,
            cost,
            settings: self.settings,
            slices: self.slices,
            committed: self.committed,
            state: self.state,
            metrics: self.metrics,
        }
    }

    /// Share a counter registry with other controllers
    pub fn with_metrics(mut self, metrics: Arc<ScanMetrics>) -> Self {
        metrics.add_ranges_planned(self.ranges.len() as u64);
        self.metrics = metrics;
        self
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn session_start(&self) -> i64 {
        self.session_start
    }

    pub fn ranges(&self) -> &[ScanRange] {
        &self.ranges
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn committed_offset(&self) -> Option<Offset> {
        self.committed
    }

    pub fn buffered_slices(&self) -> usize {
        self.slices.len()
    }

    pub fn metrics(&self) -> &Arc<ScanMetrics> {
        &self.metrics
    }

    /// Earliest bound over all ranges, else the query's own EARLIEST, else
    /// `session_start - default_earliest_secs`.
    pub fn initial_offset(&self) -> Offset {
        if let Some(earliest) = self.ranges.iter().map(ScanRange::earliest).min() {
            return earliest;
        }
        TimeQualifiers::new(self.query.clone())
            .earliest()
            .unwrap_or(self.session_start - self.settings.default_earliest_secs)
    }

    /// Inclusive last second to read, never after the session start
    pub fn stop_offset(&self) -> Offset {
        let latest = self
            .ranges
            .iter()
            .map(ScanRange::latest)
            .max()
            .unwrap_or(self.settings.include_before_epoch);
        latest.min(self.session_start)
    }

    /// Slice from `offset` until the limit is reached or the data runs out.
    /// Returns the offset reached, never less than `offset`.
    pub fn increment(&mut self, offset: Offset) -> BatchResult<Offset> {
        let previous = self.state;
        self.state = ControllerState::Slicing;

        let start = match self.committed {
            Some(committed) => offset.max(committed),
            None => offset,
        };
        let (reached, pending, limit) = match self.slice_from(start) {
            Ok(sliced) => sliced,
            Err(err) => {
                self.state = previous;
                log_event(
                    Event::ScanFailed,
                    &[
                        ("code", err.code().code()),
                        ("reason", err.message()),
                        ("session", &self.session_id.to_string()),
                    ],
                );
                return Err(err);
            }
        };

        let slices = pending.len();
        for slice in pending {
            self.metrics.add_rows_read(slice.row_count() as u64);
            self.slices.insert(slice.stop(), slice);
        }

        self.state = ControllerState::Delivered;
        self.metrics.increment_batches_delivered();
        log_event(
            Event::BatchComplete,
            &[
                ("from", &start.to_string()),
                ("records", &limit.records().to_string()),
                ("session", &self.session_id.to_string()),
                ("slices", &slices.to_string()),
                ("to", &reached.to_string()),
                ("weight", &limit.weight().to_string()),
            ],
        );
        Ok(reached)
    }

    /// Fetch quanta from `start` until the limit or the stop offset. Nothing
    /// is buffered here; a failed read discards the whole call.
    fn slice_from(&self, start: Offset) -> BatchResult<(Offset, Vec<Slice>, BatchLimit)> {
        let end = self.stop_offset().saturating_add(1);
        let quantum = self.settings.quantum_length_secs;
        let mut limit = BatchLimit::new(self.settings.weight_limit, self.settings.record_count_limit);
        let mut pending = Vec::new();
        let mut current = start;

        while limit.is_under() && current < end {
            let slice_end = current.saturating_add(quantum).min(end);

            let mut clamped = Vec::with_capacity(self.ranges.len());
            for range in &self.ranges {
                if let Some(r) = range.clamp_between(current, slice_end - 1) {
                    clamped.push(r);
                }
            }
            self.metrics
                .add_ranges_skipped((self.ranges.len() - clamped.len()) as u64);

            if !clamped.is_empty() {
                let mut slice = Slice::new(current, slice_end, clamped);
                slice.fetch(&self.storage, &self.cost)?;
                self.metrics.increment_slices_scanned();

                if slice.row_count() > 0 {
                    limit.add(slice.weight(), slice.row_count() as u64);
                    pending.push(slice);
                }
            }
            current = slice_end;
        }
        Ok((current, pending, limit))
    }

    /// Rows of buffered slices lying within `[start, end)`, in slice order
    pub fn process_between(&self, start: Offset, end: Offset) -> BatchResult<Vec<LogfileRow>> {
        if start > end {
            return Err(BatchError::invalid_window(start, end));
        }
        Ok(self
            .slices
            .values()
            .filter(|s| s.within(start, end))
            .flat_map(|s| s.rows().iter().cloned())
            .collect())
    }

    /// Drop every buffered slice ending at or before `offset`.
    /// Committing at or below the current watermark is a no-op.
    pub fn commit(&mut self, offset: Offset) {
        if matches!(self.committed, Some(c) if offset <= c) {
            return;
        }
        let before = self.slices.len();
        self.slices = self.slices.split_off(&offset.saturating_add(1));
        let evicted = before - self.slices.len();

        self.committed = Some(offset);
        self.state = ControllerState::Committed;
        self.metrics.add_slices_evicted(evicted as u64);
        log_event(
            Event::Commit,
            &[
                ("evicted", &evicted.to_string()),
                ("offset", &offset.to_string()),
                ("session", &self.session_id.to_string()),
            ],
        );
    }
}

impl<S: LogfileStorage, C: SliceCost> PullSource for BatchController<S, C> {
    fn initial_offset(&self) -> Offset {
        BatchController::initial_offset(self)
    }

    fn increment(&mut self, offset: Offset) -> BatchResult<Offset> {
        BatchController::increment(self, offset)
    }

    fn process_between(&self, start: Offset, end: Offset) -> BatchResult<Vec<LogfileRow>> {
        BatchController::process_between(self, start, end)
    }

    fn commit(&mut self, offset: Offset) {
        BatchController::commit(self, offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range::{FilterToken, ScanRequest};
    use crate::storage::{MemoryLogfileTable, StorageError, StorageResult};
    use chrono::NaiveDate;

    const HOUR: i64 = 3600;

    fn row(id: u64, log_time: i64, file_size: u64) -> LogfileRow {
        LogfileRow {
            id,
            directory: "f17".into(),
            stream: "log:f17:0".into(),
            host: "h".into(),
            tag: "f17".into(),
            log_date: NaiveDate::from_ymd_opt(2010, 1, 8).unwrap(),
            bucket: "b".into(),
            path: format!("p/{}", id),
            log_time,
            file_size,
            uncompressed_file_size: None,
        }
    }

    fn range(stream: u64, earliest: i64, latest: i64) -> ScanRange {
        ScanRange::new(stream, earliest, latest, FilterToken::new("f")).unwrap()
    }

    /// One row per hour for stream 1 over [0, 10h)
    fn hourly_table() -> MemoryLogfileTable {
        let mut table = MemoryLogfileTable::new();
        for h in 0..10 {
            table.insert(1, row(h as u64, h * HOUR + 5, 15));
        }
        table
    }

    fn controller(ranges: Vec<ScanRange>, settings: BatchSettings) -> BatchController<MemoryLogfileTable> {
        BatchController::new(ranges, Expression::Empty, hourly_table(), settings, 1_000_000)
    }

    struct FailingStorage;

    impl LogfileStorage for FailingStorage {
        fn scan(&self, _: &ScanRequest) -> StorageResult<Vec<LogfileRow>> {
            Err(StorageError::Io("region server unreachable".into()))
        }
    }

    #[test]
    fn test_offsets_from_ranges() {
        let c = controller(vec![range(1, 100, 500), range(2, 50, 400)], BatchSettings::default());
        assert_eq!(c.initial_offset(), 50);
        assert_eq!(c.stop_offset(), 500);
        assert_eq!(c.state(), ControllerState::Idle);
    }

    #[test]
    fn test_stop_offset_capped_by_session_start() {
        let c = BatchController::new(
            vec![range(1, 0, 5_000)],
            Expression::Empty,
            hourly_table(),
            BatchSettings::default(),
            4_000,
        );
        assert_eq!(c.stop_offset(), 4_000);
    }

    #[test]
    fn test_initial_offset_fallbacks() {
        let query = Expression::and(vec![Expression::index("none"), Expression::earliest(1234)]);
        let c = BatchController::new(Vec::new(), query, hourly_table(), BatchSettings::default(), 100_000);
        assert_eq!(c.initial_offset(), 1234);

        let c = BatchController::new(
            Vec::new(),
            Expression::index("none"),
            hourly_table(),
            BatchSettings::default(),
            100_000,
        );
        assert_eq!(c.initial_offset(), 100_000 - 86_400);
    }

    #[test]
    fn test_no_ranges_uses_archive_cutoff() {
        let settings = BatchSettings {
            include_before_epoch: 777,
            ..BatchSettings::default()
        };
        let c = BatchController::new(Vec::new(), Expression::Empty, hourly_table(), settings, 100_000);
        assert_eq!(c.stop_offset(), 777);
    }

    #[test]
    fn test_increment_reads_whole_window_without_limits() {
        let mut c = controller(vec![range(1, 0, 10 * HOUR - 1)], BatchSettings::default());
        let reached = c.increment(0).unwrap();
        assert_eq!(reached, 10 * HOUR);
        assert_eq!(c.buffered_slices(), 10);
        assert_eq!(c.state(), ControllerState::Delivered);
        assert_eq!(c.process_between(0, reached).unwrap().len(), 10);
    }

    #[test]
    fn test_record_limit_applies_backpressure() {
        let settings = BatchSettings {
            record_count_limit: 3,
            ..BatchSettings::default()
        };
        let mut c = controller(vec![range(1, 0, 10 * HOUR - 1)], settings);
        let first = c.increment(0).unwrap();
        assert_eq!(first, 3 * HOUR);
        let second = c.increment(first).unwrap();
        assert_eq!(second, 6 * HOUR);
        assert_eq!(c.buffered_slices(), 6);
    }

    #[test]
    fn test_weight_limit_applies_backpressure() {
        // each slice weighs 15 / 0.15 / 1.0 = 100
        let settings = BatchSettings {
            weight_limit: 250.0,
            ..BatchSettings::default()
        };
        let mut c = controller(vec![range(1, 0, 10 * HOUR - 1)], settings);
        assert_eq!(c.increment(0).unwrap(), 3 * HOUR);
    }

    #[test]
    fn test_zero_weight_slices_are_still_buffered() {
        let mut c = controller(vec![range(1, 0, 2 * HOUR - 1)], BatchSettings::default())
            .with_cost(|_: &[LogfileRow]| 0.0);
        c.increment(0).unwrap();
        assert_eq!(c.buffered_slices(), 2);
    }

    #[test]
    fn test_empty_windows_are_not_buffered() {
        let mut c = controller(vec![range(5, 0, 3 * HOUR)], BatchSettings::default());
        let reached = c.increment(0).unwrap();
        assert_eq!(reached, 3 * HOUR + 1);
        assert_eq!(c.buffered_slices(), 0);
        assert_eq!(c.metrics().snapshot().slices_scanned, 4);
    }

    #[test]
    fn test_increment_past_stop_is_stable() {
        let mut c = controller(vec![range(1, 0, HOUR - 1)], BatchSettings::default());
        let reached = c.increment(0).unwrap();
        assert_eq!(reached, HOUR);
        assert_eq!(c.increment(reached).unwrap(), HOUR);
    }

    #[test]
    fn test_commit_evicts_and_is_monotonic() {
        let mut c = controller(vec![range(1, 0, 10 * HOUR - 1)], BatchSettings::default());
        c.increment(0).unwrap();

        c.commit(3 * HOUR);
        assert_eq!(c.buffered_slices(), 7);
        assert_eq!(c.committed_offset(), Some(3 * HOUR));
        assert_eq!(c.state(), ControllerState::Committed);
        assert!(c.process_between(0, 3 * HOUR).unwrap().is_empty());

        c.commit(HOUR);
        assert_eq!(c.committed_offset(), Some(3 * HOUR));
        assert_eq!(c.buffered_slices(), 7);
        assert_eq!(c.metrics().snapshot().slices_evicted, 3);
    }

    #[test]
    fn test_increment_never_rereads_committed() {
        let mut c = controller(vec![range(1, 0, 10 * HOUR - 1)], BatchSettings::default());
        c.increment(0).unwrap();
        c.commit(10 * HOUR);
        assert_eq!(c.increment(0).unwrap(), 10 * HOUR);
        assert_eq!(c.buffered_slices(), 0);
    }

    #[test]
    fn test_process_between_rejects_inverted_window() {
        let c = controller(Vec::new(), BatchSettings::default());
        let err = c.process_between(10, 5).unwrap_err();
        assert_eq!(err.code().code(), "ARCHIVE_BATCH_INVALID_WINDOW");
    }

    #[test]
    fn test_scan_failure_surfaces_without_advancing() {
        let mut c = BatchController::new(
            vec![range(1, 0, HOUR)],
            Expression::Empty,
            FailingStorage,
            BatchSettings::default(),
            1_000_000,
        );
        let err = c.increment(0).unwrap_err();
        assert_eq!(err.code().code(), "ARCHIVE_BATCH_SCAN_FAILED");
        assert!(err.retryable());
        assert_eq!(c.buffered_slices(), 0);
    }
}
