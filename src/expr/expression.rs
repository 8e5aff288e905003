//! Query expression tree
//!
//! Trees are immutable values. Equality is deep structural equality and every
//! rewrite builds a new tree.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Node tag of any expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tag {
    And,
    Or,
    Index,
    Host,
    SourceType,
    Earliest,
    Latest,
    IndexStatement,
    Empty,
}

impl Tag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tag::And => "AND",
            Tag::Or => "OR",
            Tag::Index => "INDEX",
            Tag::Host => "HOST",
            Tag::SourceType => "SOURCETYPE",
            Tag::Earliest => "EARLIEST",
            Tag::Latest => "LATEST",
            Tag::IndexStatement => "INDEXSTATEMENT",
            Tag::Empty => "EMPTY",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tag of a value-carrying leaf
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueTag {
    Index,
    Host,
    #[serde(alias = "source_type")]
    SourceType,
    Earliest,
    Latest,
    IndexStatement,
}

impl ValueTag {
    pub fn tag(&self) -> Tag {
        match self {
            ValueTag::Index => Tag::Index,
            ValueTag::Host => Tag::Host,
            ValueTag::SourceType => Tag::SourceType,
            ValueTag::Earliest => Tag::Earliest,
            ValueTag::Latest => Tag::Latest,
            ValueTag::IndexStatement => Tag::IndexStatement,
        }
    }

    /// INDEX, HOST and SOURCETYPE select streams
    pub fn is_data_source(&self) -> bool {
        matches!(self, ValueTag::Index | ValueTag::Host | ValueTag::SourceType)
    }

    pub fn is_time_qualifier(&self) -> bool {
        matches!(self, ValueTag::Earliest | ValueTag::Latest)
    }
}

/// Comparison operation carried by a leaf
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Operation {
    Equals,
    NotEquals,
    Gt,
    Ge,
    Lt,
    Le,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Equals => "EQUALS",
            Operation::NotEquals => "NOT_EQUALS",
            Operation::Gt => "GT",
            Operation::Ge => "GE",
            Operation::Lt => "LT",
            Operation::Le => "LE",
        }
    }

    pub fn is_equals(&self) -> bool {
        *self == Operation::Equals
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "EQUALS" | "EQ" | "=" => Ok(Operation::Equals),
            "NOT_EQUALS" | "NOTEQUALS" | "NE" | "!=" => Ok(Operation::NotEquals),
            "GT" | ">" => Ok(Operation::Gt),
            "GE" | ">=" => Ok(Operation::Ge),
            "LT" | "<" => Ok(Operation::Lt),
            "LE" | "<=" => Ok(Operation::Le),
            other => Err(format!("unknown operation '{}'", other)),
        }
    }
}

impl TryFrom<String> for Operation {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Operation> for String {
    fn from(op: Operation) -> Self {
        op.as_str().to_string()
    }
}

/// Leaf payload: tag, raw value and operation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValueExpression {
    pub tag: ValueTag,
    pub value: String,
    pub operation: Operation,
}

impl ValueExpression {
    pub fn new(tag: ValueTag, value: impl Into<String>, operation: Operation) -> Self {
        Self {
            tag,
            value: value.into(),
            operation,
        }
    }

    /// Value parsed as epoch seconds
    pub fn epoch_seconds(&self) -> Option<i64> {
        self.value.trim().parse().ok()
    }
}

/// A node of the query tree
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Expression {
    And(Vec<Expression>),
    Or(Vec<Expression>),
    Value(ValueExpression),
    /// Identity element for both AND and OR
    Empty,
}

impl Expression {
    pub fn and(children: Vec<Expression>) -> Self {
        Expression::And(children)
    }

    pub fn or(children: Vec<Expression>) -> Self {
        Expression::Or(children)
    }

    pub fn value(tag: ValueTag, value: impl Into<String>, operation: Operation) -> Self {
        Expression::Value(ValueExpression::new(tag, value, operation))
    }

    pub fn index(value: impl Into<String>) -> Self {
        Self::value(ValueTag::Index, value, Operation::Equals)
    }

    pub fn host(value: impl Into<String>) -> Self {
        Self::value(ValueTag::Host, value, Operation::Equals)
    }

    pub fn source_type(value: impl Into<String>) -> Self {
        Self::value(ValueTag::SourceType, value, Operation::Equals)
    }

    pub fn earliest(epoch: i64) -> Self {
        Self::value(ValueTag::Earliest, epoch.to_string(), Operation::Equals)
    }

    pub fn latest(epoch: i64) -> Self {
        Self::value(ValueTag::Latest, epoch.to_string(), Operation::Equals)
    }

    pub fn tag(&self) -> Tag {
        match self {
            Expression::And(_) => Tag::And,
            Expression::Or(_) => Tag::Or,
            Expression::Value(v) => v.tag.tag(),
            Expression::Empty => Tag::Empty,
        }
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, Expression::And(_) | Expression::Or(_))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Expression::Empty)
    }

    /// Children of a logical node; leaves have none
    pub fn children(&self) -> &[Expression] {
        match self {
            Expression::And(children) | Expression::Or(children) => children,
            Expression::Value(_) | Expression::Empty => &[],
        }
    }

    pub fn as_value(&self) -> Option<&ValueExpression> {
        match self {
            Expression::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Rebuild a logical node of the same kind with new children.
    /// Leaves are returned unchanged.
    pub fn with_children(&self, children: Vec<Expression>) -> Expression {
        match self {
            Expression::And(_) => Expression::And(children),
            Expression::Or(_) => Expression::Or(children),
            other => other.clone(),
        }
    }

    /// Total number of nodes in the tree
    pub fn node_count(&self) -> usize {
        1 + self.children().iter().map(Expression::node_count).sum::<usize>()
    }

    /// Indented multi-line rendering of the tree
    pub fn pretty(&self) -> String {
        let mut out = String::new();
        self.write_pretty(&mut out, 0);
        out
    }

    fn write_pretty(&self, out: &mut String, depth: usize) {
        for _ in 0..depth {
            out.push_str("  ");
        }
        match self {
            Expression::And(children) | Expression::Or(children) => {
                out.push_str(self.tag().as_str());
                out.push('\n');
                for child in children {
                    child.write_pretty(out, depth + 1);
                }
            }
            Expression::Value(v) => {
                out.push_str(&format!("{} {} \"{}\"\n", v.tag.tag(), v.operation, v.value));
            }
            Expression::Empty => out.push_str("EMPTY\n"),
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::And(children) | Expression::Or(children) => {
                write!(f, "{}(", self.tag())?;
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", child)?;
                }
                write!(f, ")")
            }
            Expression::Value(v) => {
                if v.operation.is_equals() {
                    write!(f, "{}={}", v.tag.tag(), v.value)
                } else {
                    write!(f, "{} {} {}", v.tag.tag(), v.operation, v.value)
                }
            }
            Expression::Empty => write!(f, "EMPTY"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_equality() {
        let a = Expression::and(vec![Expression::index("f17"), Expression::earliest(10)]);
        let b = Expression::and(vec![Expression::index("f17"), Expression::earliest(10)]);
        let c = Expression::or(vec![Expression::index("f17"), Expression::earliest(10)]);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(
            Expression::index("f17"),
            Expression::value(ValueTag::Index, "f17", Operation::NotEquals)
        );
    }

    #[test]
    fn test_tags() {
        assert_eq!(Expression::Empty.tag(), Tag::Empty);
        assert_eq!(Expression::source_type("syslog").tag(), Tag::SourceType);
        assert_eq!(Expression::and(vec![]).tag(), Tag::And);
        assert!(Expression::or(vec![]).is_logical());
        assert!(!Expression::host("h").is_logical());
    }

    #[test]
    fn test_children_of_leaf_is_empty() {
        assert!(Expression::index("x").children().is_empty());
        assert!(Expression::Empty.children().is_empty());
    }

    #[test]
    fn test_node_count() {
        let tree = Expression::or(vec![
            Expression::and(vec![Expression::index("a"), Expression::host("h")]),
            Expression::index("b"),
        ]);
        assert_eq!(tree.node_count(), 5);
    }

    #[test]
    fn test_operation_parse_case_insensitive() {
        assert_eq!("equals".parse::<Operation>().unwrap(), Operation::Equals);
        assert_eq!("EQUALS".parse::<Operation>().unwrap(), Operation::Equals);
        assert_eq!("ge".parse::<Operation>().unwrap(), Operation::Ge);
        assert!("between".parse::<Operation>().is_err());
    }

    #[test]
    fn test_epoch_seconds() {
        let v = ValueExpression::new(ValueTag::Earliest, " 1262905200 ", Operation::Equals);
        assert_eq!(v.epoch_seconds(), Some(1262905200));
        let bad = ValueExpression::new(ValueTag::Earliest, "-1d@d", Operation::Equals);
        assert_eq!(bad.epoch_seconds(), None);
    }

    #[test]
    fn test_json_roundtrip_shape() {
        let json = r#"{"and":[
            {"value":{"tag":"index","value":"f17_v2","operation":"equals"}},
            {"value":{"tag":"sourcetype","value":"log:f17:0","operation":"EQUALS"}},
            "empty"
        ]}"#;
        let parsed: Expression = serde_json::from_str(json).unwrap();
        assert_eq!(
            parsed,
            Expression::and(vec![
                Expression::index("f17_v2"),
                Expression::source_type("log:f17:0"),
                Expression::Empty,
            ])
        );
    }

    #[test]
    fn test_display_and_pretty() {
        let tree = Expression::and(vec![Expression::index("f17"), Expression::earliest(10)]);
        assert_eq!(tree.to_string(), "AND(INDEX=f17, EARLIEST=10)");
        let pretty = tree.pretty();
        assert_eq!(pretty, "AND\n  INDEX EQUALS \"f17\"\n  EARLIEST EQUALS \"10\"\n");
    }
}
