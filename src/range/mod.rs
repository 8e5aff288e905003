//! Scan range algebra and storage keys

mod errors;
mod row_key;
mod scan_range;

pub use errors::{RangeError, RangeErrorCode, RangeResult};
pub use row_key::{FilterToken, RowKey, ScanRequest, ROW_KEY_LEN};
pub use scan_range::ScanRange;
