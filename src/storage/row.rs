//! Log file metadata rows

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Metadata of one archived log file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogfileRow {
    pub id: u64,
    pub directory: String,
    pub stream: String,
    pub host: String,
    pub tag: String,
    pub log_date: NaiveDate,
    pub bucket: String,
    pub path: String,
    /// Epoch second the file was written for
    pub log_time: i64,
    /// Compressed size in bytes
    pub file_size: u64,
    /// Absent when the archive never recorded it
    #[serde(default)]
    pub uncompressed_file_size: Option<u64>,
}

/// A row together with the stream it is stored under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRow {
    pub stream_id: u64,
    #[serde(flatten)]
    pub row: LogfileRow,
}
