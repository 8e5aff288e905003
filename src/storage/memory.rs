//! Ordered in-memory log file table

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::range::{RowKey, ScanRequest};

use super::errors::{StorageError, StorageResult};
use super::row::{LogfileRow, StoredRow};
use super::LogfileStorage;

/// Rows keyed by (row key, row id), so several files of the same stream and
/// second keep a stable order.
#[derive(Debug, Default, Clone)]
pub struct MemoryLogfileTable {
    rows: BTreeMap<(RowKey, u64), LogfileRow>,
}

impl MemoryLogfileTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a JSON array of rows, each carrying its `stream_id`
    pub fn from_json_file(path: &Path) -> StorageResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| StorageError::Io(format!("cannot read {}: {}", path.display(), e)))?;
        let stored: Vec<StoredRow> = serde_json::from_str(&content)
            .map_err(|e| StorageError::CorruptRow(format!("{}: {}", path.display(), e)))?;

        let mut table = Self::new();
        for entry in stored {
            table.insert(entry.stream_id, entry.row);
        }
        Ok(table)
    }

    /// Insert a row; an existing row with the same key and id is replaced
    pub fn insert(&mut self, stream_id: u64, row: LogfileRow) {
        let key = RowKey::new(stream_id, row.log_time);
        self.rows.insert((key, row.id), row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl LogfileStorage for MemoryLogfileTable {
    fn scan(&self, request: &ScanRequest) -> StorageResult<Vec<LogfileRow>> {
        if request.stop <= request.start {
            return Ok(Vec::new());
        }
        Ok(self
            .rows
            .range((request.start, 0)..(request.stop, 0))
            .map(|(_, row)| row.clone())
            .collect())
    }
}
