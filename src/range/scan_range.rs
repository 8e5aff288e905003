//! Per-stream inclusive time windows
//!
//! A `ScanRange` always satisfies `earliest <= latest`. Operations that can
//! produce no valid window return `Option` instead of a sentinel range.

use std::fmt;

use serde::Serialize;

use super::errors::{RangeError, RangeResult};
use super::row_key::{FilterToken, RowKey, ScanRequest};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ScanRange {
    stream_id: u64,
    earliest: i64,
    latest: i64,
    filter: FilterToken,
}

impl ScanRange {
    /// Fails with `ARCHIVE_RANGE_INVERTED` if `earliest > latest`.
    pub fn new(stream_id: u64, earliest: i64, latest: i64, filter: FilterToken) -> RangeResult<Self> {
        if earliest > latest {
            return Err(RangeError::inverted(stream_id, earliest, latest));
        }
        Ok(Self {
            stream_id,
            earliest,
            latest,
            filter,
        })
    }

    pub fn stream_id(&self) -> u64 {
        self.stream_id
    }

    pub fn earliest(&self) -> i64 {
        self.earliest
    }

    pub fn latest(&self) -> i64 {
        self.latest
    }

    pub fn filter(&self) -> &FilterToken {
        &self.filter
    }

    /// Same stream, same filter, and the closed intervals overlap.
    /// Touching endpoints intersect.
    pub fn intersects(&self, other: &ScanRange) -> bool {
        self.stream_id == other.stream_id
            && self.filter == other.filter
            && self.earliest <= other.latest
            && other.earliest <= self.latest
    }

    /// Union of two intersecting ranges
    pub fn merge(&self, other: &ScanRange) -> RangeResult<ScanRange> {
        if !self.intersects(other) {
            return Err(RangeError::unmergeable(self, other));
        }
        Ok(ScanRange {
            stream_id: self.stream_id,
            earliest: self.earliest.min(other.earliest),
            latest: self.latest.max(other.latest),
            filter: self.filter.clone(),
        })
    }

    /// Move the lower bound up to `bound` when it lies strictly inside the
    /// range; otherwise the range is returned unchanged.
    pub fn clamp_from_earliest(&self, bound: i64) -> ScanRange {
        if self.earliest < bound && bound < self.latest {
            ScanRange {
                earliest: bound,
                ..self.clone()
            }
        } else {
            self.clone()
        }
    }

    /// Move the upper bound down to `bound` when it lies strictly inside the
    /// range; otherwise the range is returned unchanged.
    pub fn clamp_until_latest(&self, bound: i64) -> ScanRange {
        if self.earliest < bound && bound < self.latest {
            ScanRange {
                latest: bound,
                ..self.clone()
            }
        } else {
            self.clone()
        }
    }

    /// Intersection with the closed window `[start, end]`, or `None` when
    /// they do not overlap. A single-instant result is valid.
    pub fn clamp_between(&self, start: i64, end: i64) -> Option<ScanRange> {
        let earliest = self.earliest.max(start);
        let latest = self.latest.min(end);
        if earliest > latest {
            return None;
        }
        Some(ScanRange {
            earliest,
            latest,
            ..self.clone()
        })
    }

    /// Storage scan for this range. The stop key is `latest + 1` so the
    /// inclusive upper bound survives the exclusive stop key.
    ///
    /// Both bounds are raised to epoch 0: archived log times are never
    /// negative, and a negative epoch key sorts after every non-negative one.
    pub fn to_scan_request(&self) -> ScanRequest {
        ScanRequest {
            start: RowKey::new(self.stream_id, self.earliest.max(0)),
            stop: RowKey::new(self.stream_id, self.latest.saturating_add(1).max(0)),
            filter: self.filter.clone(),
        }
    }
}

impl fmt::Display for ScanRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "stream {} [{}, {}] ({})",
            self.stream_id, self.earliest, self.latest, self.filter
        )
    }
}
