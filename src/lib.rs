//! archivescan - query planning and incremental retrieval over archived logs
//!
//! A query tree is rewritten to a fixed point, completed with default
//! bounds, resolved against a stream catalog into scan ranges and then
//! pulled from storage in bounded, committable batches.

pub mod analyze;
pub mod batch;
pub mod cli;
pub mod config;
pub mod expr;
pub mod metadata;
pub mod observability;
pub mod planner;
pub mod prefilter;
pub mod range;
pub mod rewrite;
pub mod storage;
