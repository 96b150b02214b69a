//! WHERE conditions and the helper functions that build them.
//!
//! ```rust,ignore
//! use kata::core::query::condition::{and, eq, gt, in_array};
//!
//! Query::new("users").r#where(and([eq("active", true), gt("age", 21)]))
//! ```

use compact_str::CompactString;

use crate::value::Value;

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    NotEq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl Operator {
    pub const fn as_str(self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::NotEq => "<>",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
        }
    }
}

/// A boolean condition over columns.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Compare {
        column: CompactString,
        op: Operator,
        value: Value,
    },
    In {
        column: CompactString,
        values: Vec<Value>,
        negated: bool,
    },
    Null {
        column: CompactString,
        negated: bool,
    },
    Like {
        column: CompactString,
        pattern: String,
    },
    And(Vec<Condition>),
    Or(Vec<Condition>),
    Not(Box<Condition>),
}

fn compare(column: impl Into<CompactString>, op: Operator, value: impl Into<Value>) -> Condition {
    Condition::Compare {
        column: column.into(),
        op,
        value: value.into(),
    }
}

pub fn eq(column: impl Into<CompactString>, value: impl Into<Value>) -> Condition {
    compare(column, Operator::Eq, value)
}

pub fn neq(column: impl Into<CompactString>, value: impl Into<Value>) -> Condition {
    compare(column, Operator::NotEq, value)
}

pub fn gt(column: impl Into<CompactString>, value: impl Into<Value>) -> Condition {
    compare(column, Operator::Gt, value)
}

pub fn gte(column: impl Into<CompactString>, value: impl Into<Value>) -> Condition {
    compare(column, Operator::Gte, value)
}

pub fn lt(column: impl Into<CompactString>, value: impl Into<Value>) -> Condition {
    compare(column, Operator::Lt, value)
}

pub fn lte(column: impl Into<CompactString>, value: impl Into<Value>) -> Condition {
    compare(column, Operator::Lte, value)
}

/// `column IN (values…)`. Duplicates are kept as given.
pub fn in_array<V: Into<Value>>(
    column: impl Into<CompactString>,
    values: impl IntoIterator<Item = V>,
) -> Condition {
    Condition::In {
        column: column.into(),
        values: values.into_iter().map(Into::into).collect(),
        negated: false,
    }
}

pub fn not_in_array<V: Into<Value>>(
    column: impl Into<CompactString>,
    values: impl IntoIterator<Item = V>,
) -> Condition {
    Condition::In {
        column: column.into(),
        values: values.into_iter().map(Into::into).collect(),
        negated: true,
    }
}

pub fn is_null(column: impl Into<CompactString>) -> Condition {
    Condition::Null {
        column: column.into(),
        negated: false,
    }
}

pub fn is_not_null(column: impl Into<CompactString>) -> Condition {
    Condition::Null {
        column: column.into(),
        negated: true,
    }
}

pub fn like(column: impl Into<CompactString>, pattern: impl Into<String>) -> Condition {
    Condition::Like {
        column: column.into(),
        pattern: pattern.into(),
    }
}

pub fn and(conditions: impl IntoIterator<Item = Condition>) -> Condition {
    Condition::And(conditions.into_iter().collect())
}

pub fn or(conditions: impl IntoIterator<Item = Condition>) -> Condition {
    Condition::Or(conditions.into_iter().collect())
}

pub fn not(condition: Condition) -> Condition {
    Condition::Not(Box::new(condition))
}
