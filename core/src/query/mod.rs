//! Query descriptions.
//!
//! A [`Query`] is plain data: the compiler renders it, the facade executes
//! it. Builders take `self` and return a new value, and `Clone` is a deep
//! copy, so derived variants (a count-only query, a page of a query) never
//! change the query they came from.

pub mod condition;
mod include;

use compact_str::CompactString;

use crate::value::Value;

pub use condition::{Condition, Operator};
pub use include::{ChildShape, Include, MaterializeFn};

/// Execution intent of a query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Method {
    #[default]
    Select,
    Insert,
    Update,
    Delete,
    Aggregate,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum OrderBy {
    #[default]
    Asc,
    Desc,
}

/// Aggregate functions available to [`Query::as_aggregate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateFn {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

impl AggregateFn {
    pub const fn name(self) -> &'static str {
        match self {
            AggregateFn::Count => "count",
            AggregateFn::Sum => "sum",
            AggregateFn::Avg => "avg",
            AggregateFn::Min => "min",
            AggregateFn::Max => "max",
        }
    }

    /// Parses a case-insensitive function name (`"avg"`, `"COUNT"`, …).
    pub fn parse(name: &str) -> Option<Self> {
        [
            AggregateFn::Count,
            AggregateFn::Sum,
            AggregateFn::Avg,
            AggregateFn::Min,
            AggregateFn::Max,
        ]
        .into_iter()
        .find(|f| f.name().eq_ignore_ascii_case(name))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    pub function: AggregateFn,
    /// Empty means `*` (only meaningful for `count`).
    pub columns: Vec<CompactString>,
}

/// An immutable-until-cloned query description.
#[derive(Debug, Clone, Default)]
pub struct Query {
    pub table: Option<CompactString>,
    pub alias: Option<CompactString>,
    pub distinct: bool,
    pub method: Method,
    /// Selected columns; empty selects `*`.
    pub columns: Vec<CompactString>,
    /// Conditions joined with `AND`.
    pub conditions: Vec<Condition>,
    pub order: Vec<(CompactString, OrderBy)>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    /// Column/value pairs for inserts and updates.
    pub values: Vec<(CompactString, Value)>,
    pub aggregate: Option<Aggregate>,
    pub includes: Vec<Include>,
}

impl Query {
    /// A select over `table`.
    pub fn new(table: impl Into<CompactString>) -> Self {
        Self {
            table: Some(table.into()),
            ..Self::default()
        }
    }

    pub fn alias(mut self, alias: impl Into<CompactString>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    pub fn select<C: Into<CompactString>>(mut self, columns: impl IntoIterator<Item = C>) -> Self {
        self.columns.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Adds a condition; multiple calls are joined with `AND`.
    pub fn r#where(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn where_eq(self, column: impl Into<CompactString>, value: impl Into<Value>) -> Self {
        self.r#where(condition::eq(column, value))
    }

    pub fn where_in<V: Into<Value>>(
        self,
        column: impl Into<CompactString>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.r#where(condition::in_array(column, values))
    }

    pub fn order_by(mut self, column: impl Into<CompactString>, direction: OrderBy) -> Self {
        self.order.push((column.into(), direction));
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Limits the query to one 1-based page.
    pub fn for_page(self, page: u32, per_page: u32) -> Self {
        let offset = u64::from(page.saturating_sub(1)) * u64::from(per_page);
        self.limit(u64::from(per_page)).offset(offset)
    }

    pub fn include(mut self, include: Include) -> Self {
        self.includes.push(include);
        self
    }

    /// Turns the query into an aggregate over the same filters.
    ///
    /// Ordering, limit, offset and includes are dropped: they do not change
    /// an aggregate and a paged aggregate would skip its only row.
    pub fn as_aggregate<C: Into<CompactString>>(
        mut self,
        function: AggregateFn,
        columns: impl IntoIterator<Item = C>,
    ) -> Self {
        self.method = Method::Aggregate;
        self.aggregate = Some(Aggregate {
            function,
            columns: columns.into_iter().map(Into::into).collect(),
        });
        self.order.clear();
        self.limit = None;
        self.offset = None;
        self.includes.clear();
        self
    }

    pub fn as_count<C: Into<CompactString>>(self, columns: impl IntoIterator<Item = C>) -> Self {
        self.as_aggregate(AggregateFn::Count, columns)
    }

    pub fn as_insert<K: Into<CompactString>, V: Into<Value>>(
        mut self,
        values: impl IntoIterator<Item = (K, V)>,
    ) -> Self {
        self.method = Method::Insert;
        self.values = values
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    pub fn as_update<K: Into<CompactString>, V: Into<Value>>(
        mut self,
        values: impl IntoIterator<Item = (K, V)>,
    ) -> Self {
        self.method = Method::Update;
        self.values = values
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    pub fn as_delete(mut self) -> Self {
        self.method = Method::Delete;
        self
    }

    pub fn has_includes(&self) -> bool {
        !self.includes.is_empty()
    }
}
