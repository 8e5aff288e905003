//! Default index and time window injection
//!
//! The planner needs an INDEX, an EARLIEST and a LATEST in every conjunctive
//! branch. Missing ones are appended here:
//! - INDEX `*`
//! - EARLIEST `now - window`
//! - LATEST `now`
//!
//! Time values are epoch seconds rendered as strings.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::expr::{Expression, Tag};
use crate::observability::{log_event, Event};

/// One day
pub const DEFAULT_WINDOW_SECS: i64 = 86_400;

#[derive(Debug, Clone, Copy)]
pub struct DefaultInjector {
    window_secs: i64,
}

impl DefaultInjector {
    pub fn new(window_secs: i64) -> Self {
        Self { window_secs }
    }

    pub fn window_secs(&self) -> i64 {
        self.window_secs
    }

    /// Inject defaults using the wall clock
    pub fn inject(&self, expr: &Expression) -> Expression {
        self.inject_at(expr, Utc::now())
    }

    /// Inject defaults relative to `now`
    pub fn inject_at(&self, expr: &Expression, now: DateTime<Utc>) -> Expression {
        let defaults = Defaults {
            latest: now.timestamp(),
            earliest: now.timestamp() - self.window_secs,
        };

        let injected = match expr {
            Expression::And(_) | Expression::Or(_) => defaults.apply(expr),
            // A bare leaf is a conjunction of one
            Expression::Value(_) => defaults.apply(&Expression::and(vec![expr.clone()])),
            Expression::Empty => defaults.apply(&Expression::and(vec![])),
        };

        let before = expr.node_count().to_string();
        let after = injected.node_count().to_string();
        log_event(
            Event::DefaultsInjected,
            &[("nodes_after", &after), ("nodes_before", &before)],
        );
        injected
    }
}

impl Default for DefaultInjector {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_SECS)
    }
}

struct Defaults {
    earliest: i64,
    latest: i64,
}

impl Defaults {
    /// Complete the root conjunction or every branch of a root disjunction.
    /// Logical nodes below those are left as they are.
    fn apply(&self, expr: &Expression) -> Expression {
        match expr {
            Expression::And(children) => self.complete(children.clone()),
            Expression::Or(children) => {
                Expression::Or(children.iter().map(|c| self.apply_branch(c)).collect())
            }
            leaf => leaf.clone(),
        }
    }

    /// Complete one OR branch. A conjunction keeps its children, any other
    /// branch becomes the first child of a new conjunction.
    fn apply_branch(&self, branch: &Expression) -> Expression {
        let members = match branch {
            Expression::And(children) => children.clone(),
            Expression::Empty => Vec::new(),
            other => vec![other.clone()],
        };
        let completed = self.complete(members);
        match completed {
            Expression::And(mut members) if members.len() == 1 => {
                members.pop().unwrap_or(Expression::Empty)
            }
            other => other,
        }
    }

    fn complete(&self, mut members: Vec<Expression>) -> Expression {
        let tags = leaf_tags_of(&members);
        self.append_missing(&tags, &mut members);
        Expression::And(members)
    }

    fn append_missing(&self, tags: &HashSet<Tag>, out: &mut Vec<Expression>) {
        if !tags.contains(&Tag::Index) {
            out.push(Expression::index("*"));
        }
        if !tags.contains(&Tag::Earliest) {
            out.push(Expression::earliest(self.earliest));
        }
        if !tags.contains(&Tag::Latest) {
            out.push(Expression::latest(self.latest));
        }
    }
}

fn leaf_tags_of(children: &[Expression]) -> HashSet<Tag> {
    let mut tags = HashSet::new();
    for child in children {
        collect_leaf_tags(child, &mut tags);
    }
    tags
}

fn collect_leaf_tags(expr: &Expression, tags: &mut HashSet<Tag>) {
    match expr {
        Expression::And(children) | Expression::Or(children) => {
            for child in children {
                collect_leaf_tags(child, tags);
            }
        }
        Expression::Value(v) => {
            tags.insert(v.tag.tag());
        }
        Expression::Empty => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    fn tags_of(expr: &Expression) -> HashSet<Tag> {
        expr.children().iter().map(Expression::tag).collect()
    }

    #[test]
    fn test_and_gets_all_defaults() {
        let tree = Expression::and(vec![Expression::host("host1")]);
        let out = DefaultInjector::default().inject_at(&tree, now());
        assert_eq!(
            out,
            Expression::and(vec![
                Expression::host("host1"),
                Expression::index("*"),
                Expression::earliest(1_700_000_000 - 86_400),
                Expression::latest(1_700_000_000),
            ])
        );
    }

    #[test]
    fn test_existing_bounds_are_kept() {
        let tree = Expression::and(vec![
            Expression::index("f17"),
            Expression::earliest(5),
            Expression::latest(6),
        ]);
        assert_eq!(DefaultInjector::default().inject_at(&tree, now()), tree);
    }

    #[test]
    fn test_each_or_branch_is_completed() {
        let tree = Expression::or(vec![Expression::host("value1"), Expression::index("value2")]);
        let out = DefaultInjector::default().inject_at(&tree, now());

        assert_eq!(out.children().len(), 2);
        for branch in out.children() {
            assert_eq!(branch.tag(), Tag::And);
            let tags = tags_of(branch);
            assert!(tags.contains(&Tag::Index));
            assert!(tags.contains(&Tag::Earliest));
            assert!(tags.contains(&Tag::Latest));
        }
        // existing INDEX is not duplicated
        assert_eq!(out.children()[1].children().len(), 3);
    }

    #[test]
    fn test_leaf_root_is_wrapped() {
        let out = DefaultInjector::new(3600).inject_at(&Expression::index("f17"), now());
        assert_eq!(
            out,
            Expression::and(vec![
                Expression::index("f17"),
                Expression::earliest(1_700_000_000 - 3600),
                Expression::latest(1_700_000_000),
            ])
        );
    }

    #[test]
    fn test_empty_root_gets_wildcard_window() {
        let out = DefaultInjector::default().inject_at(&Expression::Empty, now());
        assert_eq!(out.children().len(), 3);
        assert_eq!(out.children()[0], Expression::index("*"));
    }

    #[test]
    fn test_empty_or_branch_contributes_nothing() {
        let tree = Expression::or(vec![Expression::Empty]);
        let out = DefaultInjector::default().inject_at(&tree, now());
        assert_eq!(out.children()[0].children().len(), 3);
    }

    #[test]
    fn test_wall_clock_inject_within_window() {
        let before = Utc::now().timestamp();
        let out = DefaultInjector::default().inject(&Expression::and(vec![]));
        let latest = out.children()[2].as_value().unwrap().epoch_seconds().unwrap();
        assert!(latest >= before);
        assert!(latest - before < 60);
    }

    #[test]
    fn test_nested_or_is_not_completed() {
        let nested = Expression::or(vec![Expression::host("a"), Expression::host("b")]);
        let tree = Expression::and(vec![nested.clone(), Expression::index("f17")]);
        let out = DefaultInjector::default().inject_at(&tree, now());

        assert_eq!(out.children()[0], nested);
        assert_eq!(out.children().len(), 4);
    }

    #[test]
    fn test_or_branch_conjunction_children_untouched() {
        let inner = Expression::or(vec![Expression::host("a"), Expression::host("b")]);
        let tree = Expression::or(vec![
            Expression::and(vec![Expression::index("f17"), inner.clone()]),
            Expression::index("f18"),
        ]);
        let out = DefaultInjector::default().inject_at(&tree, now());

        let first = &out.children()[0];
        assert_eq!(first.children()[1], inner);
        assert_eq!(first.children().len(), 4);
    }
}
