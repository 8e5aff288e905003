//! Probabilistic pre-filter for stream name lookups
//!
//! Used by the stream catalog to reject exact names it has never seen
//! before running the full comparison. Correctness never depends on it.

mod bloom;
mod errors;

pub use bloom::{SearchTermBloomFilter, TokenFilter};
pub use errors::{PrefilterError, PrefilterResult};
