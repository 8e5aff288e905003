//! Query expression tree
//!
//! Two node families:
//! - Logical nodes (AND, OR) own an ordered list of children
//! - Leaves (INDEX, HOST, SOURCETYPE, EARLIEST, LATEST, INDEXSTATEMENT) carry
//!   a value and an operation; EMPTY carries nothing
//!
//! The tag set is closed, so every walker matches exhaustively.

mod expression;

pub use expression::{Expression, Operation, Tag, ValueExpression, ValueTag};
