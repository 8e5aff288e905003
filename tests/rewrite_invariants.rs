//! Rewrite Invariant Tests
//!
//! - The optimizer reaches a fixed point
//! - Rewriting never grows the tree
//! - Time bounds tighten inside conjunctions only
//! - Default injection completes every branch

use archivescan::expr::{Expression, Operation, Tag, ValueTag};
use archivescan::rewrite::{rewrite_pass, DefaultInjector, Optimizer};
use chrono::{TimeZone, Utc};

// =============================================================================
// Helper Functions
// =============================================================================

fn samples() -> Vec<Expression> {
    vec![
        Expression::and(vec![Expression::index("f17"), Expression::index("f17")]),
        Expression::or(vec![
            Expression::and(vec![
                Expression::index("a"),
                Expression::earliest(10),
                Expression::earliest(20),
            ]),
            Expression::Empty,
        ]),
        Expression::and(vec![
            Expression::and(vec![Expression::host("h1"), Expression::Empty]),
            Expression::and(vec![
                Expression::index("b"),
                Expression::value(ValueTag::Latest, "99", Operation::Lt),
            ]),
            Expression::latest(50),
            Expression::latest(40),
        ]),
        Expression::or(vec![
            Expression::or(vec![Expression::index("x"), Expression::index("y")]),
            Expression::index("x"),
        ]),
        Expression::Empty,
    ]
}

// =============================================================================
// Fixed Point Tests
// =============================================================================

/// One more pass over an optimized tree changes nothing.
#[test]
fn test_optimized_tree_is_fixed_point() {
    let optimizer = Optimizer::default();
    for tree in samples() {
        let optimized = optimizer.optimize(&tree).unwrap();
        assert_eq!(rewrite_pass(&optimized), optimized, "input {}", tree);
    }
}

/// Optimizing twice is the same as optimizing once.
#[test]
fn test_optimize_is_idempotent() {
    let optimizer = Optimizer::default();
    for tree in samples() {
        let once = optimizer.optimize(&tree).unwrap();
        let twice = optimizer.optimize(&once).unwrap();
        assert_eq!(once, twice);
    }
}

/// No pass ever adds nodes.
#[test]
fn test_rewrite_never_grows() {
    let optimizer = Optimizer::default();
    for tree in samples() {
        let optimized = optimizer.optimize(&tree).unwrap();
        assert!(optimized.node_count() <= tree.node_count());
    }
}

// =============================================================================
// Rule Interaction Tests
// =============================================================================

/// Duplicate earliest/latest collapse to the tightest window.
#[test]
fn test_time_window_tightens() {
    let tree = Expression::and(vec![
        Expression::index("f17"),
        Expression::earliest(10),
        Expression::earliest(20),
        Expression::latest(100),
        Expression::latest(50),
    ]);
    let optimized = Optimizer::default().optimize(&tree).unwrap();
    assert_eq!(
        optimized,
        Expression::and(vec![
            Expression::index("f17"),
            Expression::earliest(20),
            Expression::latest(50),
        ])
    );
}

/// A non-EQUALS time leaf disappears and its conjunction collapses.
#[test]
fn test_non_equals_time_is_pruned() {
    let tree = Expression::and(vec![
        Expression::index("a"),
        Expression::value(ValueTag::Earliest, "5", Operation::Gt),
    ]);
    let optimized = Optimizer::default().optimize(&tree).unwrap();
    assert_eq!(optimized, Expression::index("a"));
}

/// Nested same-tag nodes are spliced into their parent.
#[test]
fn test_nested_conjunctions_flatten() {
    let tree = Expression::and(vec![
        Expression::and(vec![Expression::index("a"), Expression::host("h")]),
        Expression::source_type("log:a:0"),
    ]);
    let optimized = Optimizer::default().optimize(&tree).unwrap();
    assert_eq!(optimized.tag(), Tag::And);
    assert_eq!(optimized.children().len(), 3);
    assert!(optimized.children().iter().all(|c| !c.is_logical()));
}

/// An all-empty tree optimizes to EMPTY.
#[test]
fn test_all_empty_collapses() {
    let tree = Expression::or(vec![
        Expression::and(vec![Expression::Empty, Expression::Empty]),
        Expression::Empty,
    ]);
    assert_eq!(Optimizer::default().optimize(&tree).unwrap(), Expression::Empty);
}

// =============================================================================
// Default Injection Tests
// =============================================================================

/// Every OR branch receives its own index and window.
#[test]
fn test_defaults_per_branch() {
    let now = Utc.timestamp_opt(1_000_000, 0).unwrap();
    let tree = Expression::or(vec![
        Expression::and(vec![Expression::index("a"), Expression::earliest(5)]),
        Expression::host("h"),
    ]);
    let injected = DefaultInjector::default().inject_at(&tree, now);

    assert_eq!(
        injected,
        Expression::or(vec![
            Expression::and(vec![
                Expression::index("a"),
                Expression::earliest(5),
                Expression::latest(1_000_000),
            ]),
            Expression::and(vec![
                Expression::host("h"),
                Expression::index("*"),
                Expression::earliest(1_000_000 - 86_400),
                Expression::latest(1_000_000),
            ]),
        ])
    );
}

/// Injection is stable when nothing is missing.
#[test]
fn test_complete_tree_unchanged() {
    let now = Utc.timestamp_opt(1_000_000, 0).unwrap();
    let tree = Expression::and(vec![
        Expression::index("a"),
        Expression::earliest(1),
        Expression::latest(2),
    ]);
    assert_eq!(DefaultInjector::new(60).inject_at(&tree, now), tree);
}
