//! Local rewrite rules
//!
//! Every rule looks only at one node and its direct children. Rules never
//! recurse; the optimizer applies them bottom-up. Each rule is total and
//! weakly reducing: its output never has more nodes than its input.

use crate::expr::{Expression, Operation, ValueTag};

/// A named local rule
pub type Rule = fn(&Expression) -> Expression;

/// Rules in the order applied to each node during a pass
pub const RULES: [(&str, Rule); 7] = [
    ("idempotent_collapse", idempotent_collapse),
    ("time_qualifier_merge", time_qualifier_merge),
    ("prune_non_equals_time", prune_non_equals_time),
    ("flatten_empty_operand", flatten_empty_operand),
    ("prune_duplicates", prune_duplicates),
    ("prune_empty_children", prune_empty_children),
    ("flatten_nested_logical", flatten_nested_logical),
];

/// `AND(x, x)` and `OR(x, x)` collapse to `x`.
pub fn idempotent_collapse(expr: &Expression) -> Expression {
    match expr {
        Expression::And(children) | Expression::Or(children)
            if children.len() == 2 && children[0] == children[1] =>
        {
            children[0].clone()
        }
        _ => expr.clone(),
    }
}

/// Tighten time bounds inside a conjunction.
///
/// All EARLIEST leaves collapse into one EARLIEST carrying the maximum,
/// placed where the first one was; LATEST leaves collapse to the minimum.
/// The merged leaf always uses EQUALS. A kind with an unparseable value is
/// left alone. Disjunctions are untouched since each OR branch keeps its own
/// window.
pub fn time_qualifier_merge(expr: &Expression) -> Expression {
    let Expression::And(children) = expr else {
        return expr.clone();
    };

    let merged = merge_kind(children, ValueTag::Earliest, i64::max);
    let merged = merge_kind(&merged, ValueTag::Latest, i64::min);

    if merged.len() == children.len() {
        return expr.clone();
    }
    if merged.len() == 1 {
        return merged.into_iter().next().unwrap_or(Expression::Empty);
    }
    Expression::And(merged)
}

fn merge_kind(children: &[Expression], tag: ValueTag, pick: fn(i64, i64) -> i64) -> Vec<Expression> {
    let mut values = Vec::new();
    for child in children {
        if let Some(v) = child.as_value().filter(|v| v.tag == tag) {
            match v.epoch_seconds() {
                Some(epoch) => values.push(epoch),
                None => return children.to_vec(),
            }
        }
    }
    if values.len() < 2 {
        return children.to_vec();
    }

    let bound = values.iter().copied().fold(values[0], pick);
    let mut placed = false;
    let mut out = Vec::with_capacity(children.len() - values.len() + 1);
    for child in children {
        if child.as_value().map(|v| v.tag) == Some(tag) {
            if !placed {
                out.push(Expression::value(tag, bound.to_string(), Operation::Equals));
                placed = true;
            }
        } else {
            out.push(child.clone());
        }
    }
    out
}

/// Replace EARLIEST/LATEST children whose operation is not EQUALS with EMPTY.
pub fn prune_non_equals_time(expr: &Expression) -> Expression {
    if !expr.is_logical() {
        return expr.clone();
    }
    let pruned = expr
        .children()
        .iter()
        .map(|child| match child.as_value() {
            Some(v) if v.tag.is_time_qualifier() && !v.operation.is_equals() => Expression::Empty,
            _ => child.clone(),
        })
        .collect();
    expr.with_children(pruned)
}

/// Binary AND/OR with an EMPTY operand collapses to the other operand.
pub fn flatten_empty_operand(expr: &Expression) -> Expression {
    match expr {
        Expression::And(children) | Expression::Or(children) if children.len() == 2 => {
            match (&children[0], &children[1]) {
                (Expression::Empty, other) | (other, Expression::Empty) => other.clone(),
                _ => expr.clone(),
            }
        }
        _ => expr.clone(),
    }
}

/// Drop structural duplicates among children, first occurrence wins.
pub fn prune_duplicates(expr: &Expression) -> Expression {
    if !expr.is_logical() {
        return expr.clone();
    }
    let mut kept: Vec<Expression> = Vec::with_capacity(expr.children().len());
    for child in expr.children() {
        if !kept.contains(child) {
            kept.push(child.clone());
        }
    }
    collapse(expr, kept)
}

/// Drop EMPTY children.
pub fn prune_empty_children(expr: &Expression) -> Expression {
    if !expr.is_logical() {
        return expr.clone();
    }
    let kept = expr
        .children()
        .iter()
        .filter(|child| !child.is_empty())
        .cloned()
        .collect();
    collapse(expr, kept)
}

/// Splice children of a nested node with the same tag into the parent:
/// `AND(AND(a, b), c)` becomes `AND(a, b, c)`.
pub fn flatten_nested_logical(expr: &Expression) -> Expression {
    if !expr.is_logical() {
        return expr.clone();
    }
    let tag = expr.tag();
    if !expr.children().iter().any(|c| c.tag() == tag) {
        return expr.clone();
    }
    let mut flat = Vec::new();
    for child in expr.children() {
        if child.tag() == tag {
            flat.extend(child.children().iter().cloned());
        } else {
            flat.push(child.clone());
        }
    }
    expr.with_children(flat)
}

/// Zero children become EMPTY, one child replaces the node.
fn collapse(expr: &Expression, mut kept: Vec<Expression>) -> Expression {
    match kept.len() {
        0 => Expression::Empty,
        1 => kept.pop().unwrap_or(Expression::Empty),
        _ => expr.with_children(kept),
    }
}
