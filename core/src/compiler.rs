//! The compiler boundary: query description in, SQL text and named bindings out.

use core::ops::{Add, Range};
use std::sync::Arc;

use compact_str::CompactString;
use smallvec::{SmallVec, smallvec};

use crate::error::Result;
use crate::query::Query;
use crate::value::Value;

/// Separator placed between statements when compiled results are combined.
pub const STATEMENT_SEPARATOR: &str = ";\n";

/// Rendered SQL plus the values of its named parameters.
///
/// Binding names carry no placeholder prefix (`p0`, not `:p0`); the
/// placeholder style is the compiler's choice.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Compiled {
    pub sql: String,
    pub bindings: Vec<(CompactString, Value)>,
    /// Byte ranges of the individual statements inside `sql`.
    statements: SmallVec<[Range<usize>; 1]>,
}

impl Compiled {
    /// A single statement.
    pub fn new(sql: impl Into<String>, bindings: Vec<(CompactString, Value)>) -> Self {
        let sql = sql.into();
        let statements = if sql.is_empty() {
            SmallVec::new()
        } else {
            smallvec![0..sql.len()]
        };
        Self {
            sql,
            bindings,
            statements,
        }
    }

    /// Raw SQL with its bindings given as `(name, value)` pairs.
    pub fn raw<K, V>(sql: impl Into<String>, bindings: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<CompactString>,
        V: Into<Value>,
    {
        Self::new(
            sql,
            bindings
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }

    pub fn binding(&self, name: &str) -> Option<&Value> {
        self.bindings
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value)
    }

    /// The individual statements, in order.
    pub fn statements(&self) -> impl Iterator<Item = &str> {
        self.statements.iter().map(|range| &self.sql[range.clone()])
    }

    pub fn statement_count(&self) -> usize {
        self.statements.len()
    }

    /// Appends `other` as a further statement, joined with `separator`.
    ///
    /// Binding names must already be unique across both results.
    pub fn combine(mut self, other: Compiled, separator: &str) -> Self {
        if self.sql.is_empty() {
            return other;
        }
        if other.sql.is_empty() {
            return self;
        }
        debug_assert!(
            other
                .bindings
                .iter()
                .all(|(name, _)| self.binding(name).is_none()),
            "binding names collide across combined statements"
        );

        self.sql.push_str(separator);
        let shift = self.sql.len();
        self.sql.push_str(&other.sql);
        self.statements.extend(
            other
                .statements
                .into_iter()
                .map(|range| range.start + shift..range.end + shift),
        );
        self.bindings.extend(other.bindings);
        self
    }
}

impl Add for Compiled {
    type Output = Compiled;

    fn add(self, rhs: Compiled) -> Compiled {
        self.combine(rhs, STATEMENT_SEPARATOR)
    }
}

impl core::fmt::Display for Compiled {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.sql)
    }
}

/// Renders query descriptions into dialect SQL.
pub trait Compiler {
    /// Compiles `query`, numbering parameters from `first_param` so results
    /// compiled for one batch never share binding names.
    fn compile_at(&self, query: &Query, first_param: usize) -> Result<Compiled>;

    fn compile(&self, query: &Query) -> Result<Compiled> {
        self.compile_at(query, 0)
    }
}

impl<P: Compiler + ?Sized> Compiler for &P {
    fn compile_at(&self, query: &Query, first_param: usize) -> Result<Compiled> {
        (**self).compile_at(query, first_param)
    }
}

impl<P: Compiler + ?Sized> Compiler for Box<P> {
    fn compile_at(&self, query: &Query, first_param: usize) -> Result<Compiled> {
        (**self).compile_at(query, first_param)
    }
}

impl<P: Compiler + ?Sized> Compiler for Arc<P> {
    fn compile_at(&self, query: &Query, first_param: usize) -> Result<Compiled> {
        (**self).compile_at(query, first_param)
    }
}
