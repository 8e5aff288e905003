//! Slice cost model
//!
//! A cost must grow with raw size and shrink as compression ratio or
//! processing speed grow. Any `Fn(&[LogfileRow]) -> f64` is a cost.

use crate::storage::LogfileRow;

pub trait SliceCost {
    fn weight(&self, rows: &[LogfileRow]) -> f64;
}

impl<F> SliceCost for F
where
    F: Fn(&[LogfileRow]) -> f64,
{
    fn weight(&self, rows: &[LogfileRow]) -> f64 {
        self(rows)
    }
}

/// Estimated decode cost from the first row's compressed size:
/// `file_size / compression_ratio / processing_speed`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressedSizeCost {
    compression_ratio: f64,
    processing_speed: f64,
}

impl CompressedSizeCost {
    pub fn new(compression_ratio: f64, processing_speed: f64) -> Self {
        Self {
            compression_ratio,
            processing_speed,
        }
    }
}

impl Default for CompressedSizeCost {
    fn default() -> Self {
        Self::new(0.15, 1.0)
    }
}

impl SliceCost for CompressedSizeCost {
    fn weight(&self, rows: &[LogfileRow]) -> f64 {
        match rows.first() {
            Some(row) => row.file_size as f64 / self.compression_ratio / self.processing_speed,
            None => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(file_size: u64) -> LogfileRow {
        LogfileRow {
            id: 1,
            directory: "d".into(),
            stream: "s".into(),
            host: "h".into(),
            tag: "t".into(),
            log_date: NaiveDate::from_ymd_opt(2010, 1, 8).unwrap(),
            bucket: "b".into(),
            path: "p".into(),
            log_time: 0,
            file_size,
            uncompressed_file_size: None,
        }
    }

    #[test]
    fn test_first_row_drives_weight() {
        let cost = CompressedSizeCost::new(0.5, 2.0);
        assert_eq!(cost.weight(&[row(100), row(9_999)]), 100.0);
        assert_eq!(cost.weight(&[]), 0.0);
    }

    #[test]
    fn test_monotonic_in_inputs() {
        let rows = [row(1_000)];
        let base = CompressedSizeCost::new(0.2, 1.0).weight(&rows);
        assert!(CompressedSizeCost::new(0.2, 1.0).weight(&[row(2_000)]) > base);
        assert!(CompressedSizeCost::new(0.4, 1.0).weight(&rows) < base);
        assert!(CompressedSizeCost::new(0.2, 2.0).weight(&rows) < base);
    }

    #[test]
    fn test_closure_is_a_cost() {
        let per_row = |rows: &[LogfileRow]| rows.len() as f64;
        assert_eq!(per_row.weight(&[row(1), row(2)]), 2.0);
    }
}
