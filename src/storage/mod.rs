//! Log archive storage
//!
//! The archive is a key-ordered table of log file metadata. Keys are
//! [`RowKey`](crate::range::RowKey)s and scans are half-open on the key
//! space.

mod errors;
mod memory;
mod row;

pub use errors::{StorageError, StorageResult};
pub use memory::MemoryLogfileTable;
pub use row::{LogfileRow, StoredRow};

use crate::range::ScanRequest;

/// Range reads against the log file table
pub trait LogfileStorage {
    /// Rows with `request.start <= key < request.stop`, in key order
    fn scan(&self, request: &ScanRequest) -> StorageResult<Vec<LogfileRow>>;
}

impl<T: LogfileStorage + ?Sized> LogfileStorage for &T {
    fn scan(&self, request: &ScanRequest) -> StorageResult<Vec<LogfileRow>> {
        (**self).scan(request)
    }
}

impl<T: LogfileStorage + ?Sized> LogfileStorage for Box<T> {
    fn scan(&self, request: &ScanRequest) -> StorageResult<Vec<LogfileRow>> {
        (**self).scan(request)
    }
}
