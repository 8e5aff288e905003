//! Fixed-point rewrite driver
//!
//! A pass rebuilds the tree post-order, running every rule of [`RULES`] on
//! each node after its children have been rewritten. Passes repeat until two
//! successive trees are structurally equal.

use crate::expr::Expression;
use crate::observability::{log_event_at, Event, Logger, Severity};

use super::errors::{RewriteError, RewriteResult};
use super::rules::RULES;

/// Default cap on full passes
pub const DEFAULT_MAX_PASSES: usize = 64;

/// Rewrites a tree to its canonical form
#[derive(Debug, Clone, Copy)]
pub struct Optimizer {
    max_passes: usize,
}

impl Optimizer {
    pub fn new(max_passes: usize) -> Self {
        Self {
            max_passes: max_passes.max(1),
        }
    }

    pub fn max_passes(&self) -> usize {
        self.max_passes
    }

    /// Rewrite until no rule changes the tree.
    ///
    /// Fails with `ARCHIVE_REWRITE_DIVERGED` if the tree is still changing
    /// after `max_passes` passes.
    pub fn optimize(&self, expr: &Expression) -> RewriteResult<Expression> {
        let trace = Logger::enabled(Severity::Trace);
        let before = if trace { expr.to_string() } else { String::new() };

        let mut current = expr.clone();
        let mut passes = 0;
        loop {
            if passes >= self.max_passes {
                return Err(RewriteError::diverged(passes, current.node_count()));
            }
            let next = rewrite_pass(&current);
            passes += 1;
            if next == current {
                break;
            }
            current = next;
        }

        if trace {
            let passes = passes.to_string();
            let after = current.to_string();
            log_event_at(
                Severity::Trace,
                Event::RewriteComplete,
                &[("after", &after), ("before", &before), ("passes", &passes)],
            );
        }
        Ok(current)
    }
}

impl Default for Optimizer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PASSES)
    }
}

/// One full post-order pass over the tree
pub fn rewrite_pass(expr: &Expression) -> Expression {
    let rebuilt = if expr.is_logical() {
        expr.with_children(expr.children().iter().map(rewrite_pass).collect())
    } else {
        expr.clone()
    };
    apply_rules(rebuilt)
}

fn apply_rules(mut node: Expression) -> Expression {
    for (name, rule) in RULES {
        let next = rule(&node);
        if next != node {
            if Logger::enabled(Severity::Trace) {
                let rendered = next.to_string();
                log_event_at(
                    Severity::Trace,
                    Event::RewriteRuleApplied,
                    &[("result", &rendered), ("rule", name)],
                );
            }
            node = next;
        }
    }
    node
}
