//! Query rewriting
//!
//! - `rules`: local rewrite rules, one function each
//! - `optimizer`: fixed-point driver over the rule set
//! - `defaults`: completes every conjunctive branch with index and time bounds

mod defaults;
mod errors;
mod optimizer;
pub mod rules;

pub use defaults::{DefaultInjector, DEFAULT_WINDOW_SECS};
pub use errors::{RewriteError, RewriteErrorCode, RewriteResult};
pub use optimizer::{rewrite_pass, Optimizer, DEFAULT_MAX_PASSES};
