//! Side-effect-free tree walkers
//!
//! Tags form a closed set, so traversal cannot meet an unsupported tag and
//! the walkers are infallible.

mod collector;

pub use collector::{DataSources, LeafCollector, TimeQualifiers};
