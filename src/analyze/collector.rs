//! Memoized leaf collectors

use std::cell::OnceCell;

use crate::expr::{Expression, ValueExpression, ValueTag};

/// Collects leaves whose tag matches `accept`, pre-order, left to right.
/// The walk runs once; later calls return the cached list.
#[derive(Debug)]
pub struct LeafCollector {
    root: Expression,
    accept: fn(ValueTag) -> bool,
    cache: OnceCell<Vec<ValueExpression>>,
}

impl LeafCollector {
    pub fn new(root: Expression, accept: fn(ValueTag) -> bool) -> Self {
        Self {
            root,
            accept,
            cache: OnceCell::new(),
        }
    }

    pub fn root(&self) -> &Expression {
        &self.root
    }

    pub fn leaves(&self) -> &[ValueExpression] {
        self.cache.get_or_init(|| {
            let mut out = Vec::new();
            collect(&self.root, self.accept, &mut out);
            out
        })
    }

    pub fn is_computed(&self) -> bool {
        self.cache.get().is_some()
    }
}

fn collect(expr: &Expression, accept: fn(ValueTag) -> bool, out: &mut Vec<ValueExpression>) {
    match expr {
        Expression::And(children) | Expression::Or(children) => {
            for child in children {
                collect(child, accept, out);
            }
        }
        Expression::Value(v) => {
            if accept(v.tag) {
                out.push(v.clone());
            }
        }
        Expression::Empty => {}
    }
}

/// INDEX, HOST and SOURCETYPE leaves of a tree
#[derive(Debug)]
pub struct DataSources {
    inner: LeafCollector,
}

impl DataSources {
    pub fn new(root: Expression) -> Self {
        Self {
            inner: LeafCollector::new(root, |tag| tag.is_data_source()),
        }
    }

    pub fn leaves(&self) -> &[ValueExpression] {
        self.inner.leaves()
    }

    /// Distinct dimensions the query constrains, in first-seen order
    pub fn dimensions(&self) -> Vec<ValueTag> {
        let mut seen = Vec::new();
        for leaf in self.leaves() {
            if !seen.contains(&leaf.tag) {
                seen.push(leaf.tag);
            }
        }
        seen
    }
}

/// EARLIEST and LATEST leaves of a tree
#[derive(Debug)]
pub struct TimeQualifiers {
    inner: LeafCollector,
}

impl TimeQualifiers {
    pub fn new(root: Expression) -> Self {
        Self {
            inner: LeafCollector::new(root, |tag| tag.is_time_qualifier()),
        }
    }

    pub fn leaves(&self) -> &[ValueExpression] {
        self.inner.leaves()
    }

    /// Smallest parseable EARLIEST value anywhere in the tree
    pub fn earliest(&self) -> Option<i64> {
        self.epochs(ValueTag::Earliest).min()
    }

    /// Largest parseable LATEST value anywhere in the tree
    pub fn latest(&self) -> Option<i64> {
        self.epochs(ValueTag::Latest).max()
    }

    fn epochs(&self, tag: ValueTag) -> impl Iterator<Item = i64> + '_ {
        self.leaves()
            .iter()
            .filter(move |v| v.tag == tag)
            .filter_map(ValueExpression::epoch_seconds)
    }
}
