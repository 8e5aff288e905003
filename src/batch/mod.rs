//! Incremental batch retrieval
//!
//! The controller splits the planned time span into fixed quanta, reads each
//! quantum from storage and stops once a batch reaches its weight or record
//! ceiling. Consumers drive it through [`PullSource`].

mod controller;
mod errors;
mod limit;
mod slice;
mod weight;

pub use controller::{BatchController, BatchSettings, ControllerState};
pub use errors::{BatchError, BatchErrorCode, BatchResult, Severity};
pub use limit::BatchLimit;
pub use slice::Slice;
pub use weight::{CompressedSizeCost, SliceCost};

use crate::storage::LogfileRow;

/// Epoch-seconds watermark handed to the consumer
pub type Offset = i64;

/// The pull surface a consuming framework drives.
///
/// A single source must not see concurrent `increment`/`commit` calls.
pub trait PullSource {
    /// Offset the first batch starts from
    fn initial_offset(&self) -> Offset;

    /// Read the next batch starting at `offset`; returns the offset reached
    fn increment(&mut self, offset: Offset) -> BatchResult<Offset>;

    /// Rows buffered for `[start, end)`, in slice order
    fn process_between(&self, start: Offset, end: Offset) -> BatchResult<Vec<LogfileRow>>;

    /// Release everything at or before `offset`
    fn commit(&mut self, offset: Offset);
}
