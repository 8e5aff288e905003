//! Explain plan output
//!
//! Deterministic, human-readable rendering of a planned query or of the
//! reason it was rejected.

use std::fmt;

use serde::Serialize;

use super::errors::PlannerError;
use super::planner::QueryPlan;

#[derive(Debug, Clone, Serialize)]
pub struct ExplainPlan {
    /// Whether planning succeeded
    pub accepted: bool,
    /// Tree the planner consumed, indented
    pub planned_tree: Option<String>,
    /// One line per conjunctive branch
    pub branches: Vec<String>,
    /// One line per scan range
    pub ranges: Vec<String>,
    pub rejection_reason: Option<String>,
    pub rejection_code: Option<String>,
}

impl ExplainPlan {
    pub fn from_plan(plan: &QueryPlan) -> Self {
        let branches = plan
            .branches
            .iter()
            .map(|b| {
                let mut line = format!("{} [{}, {}]", b.predicate, b.earliest, b.latest);
                if b.is_skipped() {
                    line.push_str(" skipped: inverted window");
                } else {
                    let ids: Vec<String> = b.stream_ids.iter().map(u64::to_string).collect();
                    line.push_str(&format!(" -> streams [{}]", ids.join(", ")));
                }
                line
            })
            .collect();

        let ranges = plan.ranges().iter().map(|r| r.to_string()).collect();

        Self {
            accepted: true,
            planned_tree: Some(plan.planned.pretty()),
            branches,
            ranges,
            rejection_reason: None,
            rejection_code: None,
        }
    }

    pub fn from_error(err: &PlannerError) -> Self {
        Self {
            accepted: false,
            planned_tree: None,
            branches: Vec::new(),
            ranges: Vec::new(),
            rejection_reason: Some(err.message().to_string()),
            rejection_code: Some(err.code().code().to_string()),
        }
    }
}

impl fmt::Display for ExplainPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== EXPLAIN PLAN ===")?;

        if self.accepted {
            writeln!(f, "Status: ACCEPTED")?;
            if let Some(tree) = &self.planned_tree {
                writeln!(f, "Tree:")?;
                for line in tree.lines() {
                    writeln!(f, "  {}", line)?;
                }
            }
            writeln!(f, "Branches:")?;
            for branch in &self.branches {
                writeln!(f, "  - {}", branch)?;
            }
            writeln!(f, "Scan Ranges: {}", self.ranges.len())?;
            for range in &self.ranges {
                writeln!(f, "  - {}", range)?;
            }
        } else {
            writeln!(f, "Status: REJECTED")?;
            if let Some(code) = &self.rejection_code {
                writeln!(f, "Error Code: {}", code)?;
            }
            if let Some(reason) = &self.rejection_reason {
                writeln!(f, "Reason: {}", reason)?;
            }
        }

        Ok(())
    }
}
