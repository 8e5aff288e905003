//! Query planner
//!
//! Turns a rewritten, defaulted expression tree into scan ranges.
//!
//! # Pipeline
//!
//! 1. Rewrite to a fixed point
//! 2. Inject default index and time bounds
//! 3. Resolve every conjunction against stream metadata
//!
//! A conjunction must hold only leaves. Its first EARLIEST and first LATEST
//! give the time window; its INDEX, HOST and SOURCETYPE leaves give the
//! stream predicate.

mod errors;
mod explain;
mod planner;

pub use errors::{PlannerError, PlannerErrorCode, PlannerResult, Severity};
pub use explain::ExplainPlan;
pub use planner::{plan_query, plan_query_at, BranchPlan, QueryPlan, ScanPlanner};
