//! Scan planner
//!
//! OR nodes become the concatenation of their children's ranges; ranges
//! are never merged across branches. Each conjunction resolves to one
//! stream predicate and one time window, and yields one range per
//! matching stream.

use chrono::{DateTime, Utc};

use crate::expr::{Expression, Tag, ValueExpression, ValueTag};
use crate::metadata::{StreamMetadata, StreamPredicate};
use crate::observability::{log_event, Event};
use crate::range::ScanRange;
use crate::rewrite::{DefaultInjector, Optimizer};

use super::errors::{PlannerError, PlannerResult};

/// Planning outcome of one conjunctive branch
#[derive(Debug, Clone, PartialEq)]
pub struct BranchPlan {
    pub predicate: StreamPredicate,
    pub earliest: i64,
    pub latest: i64,
    pub stream_ids: Vec<u64>,
    pub ranges: Vec<ScanRange>,
}

impl BranchPlan {
    /// Window is inverted, so no range was emitted
    pub fn is_skipped(&self) -> bool {
        self.earliest > self.latest
    }
}

/// Immutable result of the full planning pipeline
#[derive(Debug, Clone)]
pub struct QueryPlan {
    /// Tree as received
    pub query: Expression,
    /// Tree after rewriting to a fixed point
    pub optimized: Expression,
    /// Optimized tree with default bounds
    pub planned: Expression,
    pub branches: Vec<BranchPlan>,
}

impl QueryPlan {
    /// All ranges in branch order
    pub fn ranges(&self) -> Vec<ScanRange> {
        self.branches
            .iter()
            .flat_map(|b| b.ranges.iter().cloned())
            .collect()
    }
}

/// Turns a defaulted tree into scan ranges
pub struct ScanPlanner<'a, M: StreamMetadata + ?Sized> {
    metadata: &'a M,
}

impl<'a, M: StreamMetadata + ?Sized> ScanPlanner<'a, M> {
    pub fn new(metadata: &'a M) -> Self {
        Self { metadata }
    }

    /// Scan ranges for `expr`, in branch order
    pub fn plan(&self, expr: &Expression) -> PlannerResult<Vec<ScanRange>> {
        let branches = self.plan_branches(expr)?;
        Ok(branches.into_iter().flat_map(|b| b.ranges).collect())
    }

    /// Per-branch detail for `expr`
    pub fn plan_branches(&self, expr: &Expression) -> PlannerResult<Vec<BranchPlan>> {
        let mut branches = Vec::new();
        if let Err(err) = self.walk(expr, &mut branches) {
            log_event(
                Event::PlanRejected,
                &[("code", err.code().code()), ("reason", err.message())],
            );
            return Err(err);
        }

        let ranges: usize = branches.iter().map(|b| b.ranges.len()).sum();
        log_event(
            Event::PlanComplete,
            &[
                ("branches", &branches.len().to_string()),
                ("ranges", &ranges.to_string()),
            ],
        );
        Ok(branches)
    }

    fn walk(&self, expr: &Expression, out: &mut Vec<BranchPlan>) -> PlannerResult<()> {
        match expr {
            Expression::Or(children) => {
                for child in children {
                    self.walk(child, out)?;
                }
                Ok(())
            }
            Expression::And(children) => {
                out.push(self.plan_conjunction(children)?);
                Ok(())
            }
            // A bare leaf is a conjunction of one
            Expression::Value(_) => {
                out.push(self.plan_conjunction(std::slice::from_ref(expr))?);
                Ok(())
            }
            Expression::Empty => Ok(()),
        }
    }

    fn plan_conjunction(&self, children: &[Expression]) -> PlannerResult<BranchPlan> {
        let mut leaves: Vec<&ValueExpression> = Vec::with_capacity(children.len());
        for child in children {
            match child {
                Expression::And(_) | Expression::Or(_) => {
                    return Err(PlannerError::nested_logical(child.tag()));
                }
                Expression::Value(v) => leaves.push(v),
                Expression::Empty => {}
            }
        }

        let earliest = first_epoch(&leaves, ValueTag::Earliest)?;
        let latest = first_epoch(&leaves, ValueTag::Latest)?;
        let predicate = StreamPredicate::from_leaves(leaves.iter().copied());

        if earliest > latest {
            log_event(
                Event::RangeSkipped,
                &[
                    ("earliest", &earliest.to_string()),
                    ("latest", &latest.to_string()),
                    ("predicate", &predicate.to_string()),
                ],
            );
            return Ok(BranchPlan {
                predicate,
                earliest,
                latest,
                stream_ids: Vec::new(),
                ranges: Vec::new(),
            });
        }

        let stream_ids = self.metadata.stream_ids(&predicate)?;
        let token = predicate.token();
        let mut ranges = Vec::with_capacity(stream_ids.len());
        for id in &stream_ids {
            let range = ScanRange::new(*id, earliest, latest, token.clone())
                .map_err(|e| PlannerError::invalid_time(Tag::Earliest, e.message()))?;
            ranges.push(range);
        }

        Ok(BranchPlan {
            predicate,
            earliest,
            latest,
            stream_ids,
            ranges,
        })
    }
}

/// First leaf of `tag` parsed as epoch seconds
fn first_epoch(leaves: &[&ValueExpression], tag: ValueTag) -> PlannerResult<i64> {
    let leaf = leaves
        .iter()
        .find(|v| v.tag == tag)
        .ok_or_else(|| PlannerError::missing_time_bound(tag.tag()))?;
    if !leaf.operation.is_equals() {
        return Err(PlannerError::unsupported_tag(tag.tag(), leaf.operation));
    }
    leaf.epoch_seconds()
        .ok_or_else(|| PlannerError::invalid_time(tag.tag(), &leaf.value))
}

/// Rewrite, inject defaults relative to `now`, then plan
pub fn plan_query_at<M: StreamMetadata + ?Sized>(
    query: &Expression,
    metadata: &M,
    optimizer: &Optimizer,
    injector: &DefaultInjector,
    now: DateTime<Utc>,
) -> PlannerResult<QueryPlan> {
    log_event(
        Event::QueryReceived,
        &[("nodes", &query.node_count().to_string())],
    );

    let optimized = optimizer.optimize(query).map_err(|err| {
        let planner_err = PlannerError::from(err);
        log_event(
            Event::PlanRejected,
            &[("code", planner_err.code().code()), ("reason", planner_err.message())],
        );
        planner_err
    })?;
    let planned = injector.inject_at(&optimized, now);
    let branches = ScanPlanner::new(metadata).plan_branches(&planned)?;

    Ok(QueryPlan {
        query: query.clone(),
        optimized,
        planned,
        branches,
    })
}

/// [`plan_query_at`] using the wall clock
pub fn plan_query<M: StreamMetadata + ?Sized>(
    query: &Expression,
    metadata: &M,
    optimizer: &Optimizer,
    injector: &DefaultInjector,
) -> PlannerResult<QueryPlan> {
    plan_query_at(query, metadata, optimizer, injector, Utc::now())
}
