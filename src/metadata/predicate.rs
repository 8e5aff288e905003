//! Stream selection predicate
//!
//! Index conditions are AND-ed. Host conditions are OR-ed among themselves,
//! as are source-type conditions. The three groups are AND-ed together.

use std::fmt;

use serde::Serialize;

use crate::expr::{Operation, ValueExpression, ValueTag};
use crate::range::FilterToken;

/// One comparison against a stream attribute
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Condition {
    pub value: String,
    pub operation: Operation,
}

impl Condition {
    pub fn equals(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            operation: Operation::Equals,
        }
    }

    pub fn new(value: impl Into<String>, operation: Operation) -> Self {
        Self {
            value: value.into(),
            operation,
        }
    }

    pub fn has_wildcard(&self) -> bool {
        self.value.contains('*')
    }

    fn render(&self, field: &str, out: &mut String) {
        let op = match self.operation {
            Operation::Equals => "=",
            Operation::NotEquals => "!=",
            Operation::Gt => ">",
            Operation::Ge => ">=",
            Operation::Lt => "<",
            Operation::Le => "<=",
        };
        out.push_str(field);
        out.push_str(op);
        out.push('"');
        out.push_str(&self.value);
        out.push('"');
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct StreamPredicate {
    indexes: Vec<Condition>,
    hosts: Vec<Condition>,
    source_types: Vec<Condition>,
}

impl StreamPredicate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Matches every stream
    pub fn wildcard() -> Self {
        Self::new().with_index(Condition::equals("*"))
    }

    /// Build from the data-source leaves of one conjunction, falling back to
    /// the wildcard index when none are present. Other leaves are ignored.
    pub fn from_leaves<'a>(leaves: impl IntoIterator<Item = &'a ValueExpression>) -> Self {
        let mut predicate = Self::new();
        for leaf in leaves {
            let condition = Condition::new(leaf.value.clone(), leaf.operation);
            match leaf.tag {
                ValueTag::Index => predicate.indexes.push(condition),
                ValueTag::Host => predicate.hosts.push(condition),
                ValueTag::SourceType => predicate.source_types.push(condition),
                ValueTag::Earliest | ValueTag::Latest | ValueTag::IndexStatement => {}
            }
        }
        if predicate.is_unconstrained() {
            return Self::wildcard();
        }
        predicate
    }

    pub fn with_index(mut self, condition: Condition) -> Self {
        self.indexes.push(condition);
        self
    }

    pub fn with_host(mut self, condition: Condition) -> Self {
        self.hosts.push(condition);
        self
    }

    pub fn with_source_type(mut self, condition: Condition) -> Self {
        self.source_types.push(condition);
        self
    }

    pub fn indexes(&self) -> &[Condition] {
        &self.indexes
    }

    pub fn hosts(&self) -> &[Condition] {
        &self.hosts
    }

    pub fn source_types(&self) -> &[Condition] {
        &self.source_types
    }

    pub fn is_unconstrained(&self) -> bool {
        self.indexes.is_empty() && self.hosts.is_empty() && self.source_types.is_empty()
    }

    /// Canonical rendering, used as the scan range filter token
    pub fn token(&self) -> FilterToken {
        FilterToken::new(self.to_string())
    }
}

impl fmt::Display for StreamPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut groups: Vec<String> = Vec::new();
        for index in &self.indexes {
            let mut s = String::new();
            index.render("index", &mut s);
            groups.push(s);
        }
        for (field, conditions) in [("host", &self.hosts), ("sourcetype", &self.source_types)] {
            if conditions.is_empty() {
                continue;
            }
            let mut s = String::new();
            if conditions.len() > 1 {
                s.push('(');
            }
            for (i, c) in conditions.iter().enumerate() {
                if i > 0 {
                    s.push_str(" OR ");
                }
                c.render(field, &mut s);
            }
            if conditions.len() > 1 {
                s.push(')');
            }
            groups.push(s);
        }
        if groups.is_empty() {
            return write!(f, "TRUE");
        }
        write!(f, "{}", groups.join(" AND "))
    }
}
