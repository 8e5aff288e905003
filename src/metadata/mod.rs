//! Stream metadata lookup
//!
//! The planner turns each conjunction into a [`StreamPredicate`] and asks a
//! [`StreamMetadata`] implementation which stream ids match it.

mod catalog;
mod errors;
mod predicate;

pub use catalog::{StreamCatalog, StreamRecord};
pub use errors::{MetadataError, MetadataResult};
pub use predicate::{Condition, StreamPredicate};

/// Resolves a stream predicate to matching stream ids
pub trait StreamMetadata {
    /// Matching ids in ascending order without duplicates
    fn stream_ids(&self, predicate: &StreamPredicate) -> MetadataResult<Vec<u64>>;
}

impl<T: StreamMetadata + ?Sized> StreamMetadata for &T {
    fn stream_ids(&self, predicate: &StreamPredicate) -> MetadataResult<Vec<u64>> {
        (**self).stream_ids(predicate)
    }
}

impl<T: StreamMetadata + ?Sized> StreamMetadata for Box<T> {
    fn stream_ids(&self, predicate: &StreamPredicate) -> MetadataResult<Vec<u64>> {
        (**self).stream_ids(predicate)
    }
}
