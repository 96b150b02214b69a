//! Renders [`Query`] descriptions into SQLite SQL with `:pN` placeholders.

use compact_str::{CompactString, format_compact};
use kata_core::query::{Aggregate, AggregateFn, Condition, Method, OrderBy, Query};
use kata_core::{Compiled, Compiler, KataError, Result, Value};

/// SQLite dialect compiler.
///
/// Parameters are named `p{n}`, numbered from the offset passed to
/// [`Compiler::compile_at`], and rendered as `:p{n}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteCompiler;

impl SqliteCompiler {
    pub const fn new() -> Self {
        Self
    }
}

impl Compiler for SqliteCompiler {
    fn compile_at(&self, query: &Query, first_param: usize) -> Result<Compiled> {
        let mut writer = Writer::new(first_param);
        match query.method {
            Method::Select => writer.select(query, None)?,
            Method::Aggregate => {
                let aggregate = query
                    .aggregate
                    .as_ref()
                    .ok_or_else(|| KataError::Compile("aggregate query without a function".into()))?;
                if aggregate.function == AggregateFn::Count
                    && aggregate.columns.is_empty()
                    && (query.distinct || !query.columns.is_empty())
                {
                    writer.count_rows(query)?
                } else {
                    writer.select(query, Some(aggregate))?
                }
            }
            Method::Insert => writer.insert(query)?,
            Method::Update => writer.update(query)?,
            Method::Delete => writer.delete(query)?,
        }
        Ok(Compiled::new(writer.sql, writer.bindings))
    }
}

// =============================================================================
// Writer
// =============================================================================

struct Writer {
    sql: String,
    bindings: Vec<(CompactString, Value)>,
    next_param: usize,
}

impl Writer {
    fn new(first_param: usize) -> Self {
        Self {
            sql: String::with_capacity(64),
            bindings: Vec::new(),
            next_param: first_param,
        }
    }

    fn push(&mut self, s: &str) {
        self.sql.push_str(s);
    }

    /// Quotes `a.b` as `"a"."b"`; `*` passes through.
    fn ident(&mut self, name: &str) {
        for (idx, part) in name.split('.').enumerate() {
            if idx > 0 {
                self.sql.push('.');
            }
            if part == "*" {
                self.sql.push('*');
                continue;
            }
            self.sql.push('"');
            self.sql.push_str(&part.replace('"', "\"\""));
            self.sql.push('"');
        }
    }

    fn param(&mut self, value: &Value) {
        let name = format_compact!("p{}", self.next_param);
        self.next_param += 1;
        self.sql.push(':');
        self.sql.push_str(&name);
        self.bindings.push((name, value.clone()));
    }

    fn table(&mut self, query: &Query) -> Result<()> {
        let table = query
            .table
            .as_deref()
            .ok_or_else(|| KataError::Compile("query has no table".into()))?;
        self.ident(table);
        if let Some(alias) = query.alias.as_deref() {
            self.push(" AS ");
            self.ident(alias);
        }
        Ok(())
    }

    fn select(&mut self, query: &Query, aggregate: Option<&Aggregate>) -> Result<()> {
        self.push("SELECT ");
        match aggregate {
            Some(aggregate) => self.aggregate(aggregate, query.distinct)?,
            None => {
                if query.distinct {
                    self.push("DISTINCT ");
                }
                self.column_list(&query.columns);
            }
        }
        self.push(" FROM ");
        self.table(query)?;
        self.conditions(&query.conditions);

        if !query.order.is_empty() {
            self.push(" ORDER BY ");
            for (idx, (column, direction)) in query.order.iter().enumerate() {
                if idx > 0 {
                    self.push(", ");
                }
                self.ident(column);
                self.push(match direction {
                    OrderBy::Asc => " ASC",
                    OrderBy::Desc => " DESC",
                });
            }
        }

        self.limit(query);
        Ok(())
    }

    /// `COUNT(*)` over the rows the select form of `query` returns, so
    /// `DISTINCT` and the selected columns are honoured.
    fn count_rows(&mut self, query: &Query) -> Result<()> {
        let inner = Query {
            method: Method::Select,
            aggregate: None,
            order: Vec::new(),
            limit: None,
            offset: None,
            ..query.clone()
        };
        self.push("SELECT COUNT(*) AS ");
        self.ident(AggregateFn::Count.name());
        self.push(" FROM (");
        self.select(&inner, None)?;
        self.push(")");
        self.limit(query);
        Ok(())
    }

    fn limit(&mut self, query: &Query) {
        match (query.limit, query.offset) {
            (Some(limit), Some(offset)) if offset > 0 => {
                self.push(&format!(" LIMIT {limit} OFFSET {offset}"))
            }
            (Some(limit), _) => self.push(&format!(" LIMIT {limit}")),
            // SQLite requires a LIMIT before OFFSET
            (None, Some(offset)) if offset > 0 => self.push(&format!(" LIMIT -1 OFFSET {offset}")),
            _ => {}
        }
    }

    fn column_list(&mut self, columns: &[CompactString]) {
        if columns.is_empty() {
            self.push("*");
            return;
        }
        for (idx, column) in columns.iter().enumerate() {
            if idx > 0 {
                self.push(", ");
            }
            self.ident(column);
        }
    }

    fn aggregate(&mut self, aggregate: &Aggregate, distinct: bool) -> Result<()> {
        let function = aggregate.function;
        if aggregate.columns.is_empty() && function != AggregateFn::Count {
            return Err(KataError::Compile(format_compact!(
                "{} needs a column",
                function.name()
            )));
        }

        self.push(&function.name().to_ascii_uppercase());
        self.push("(");
        if distinct && !aggregate.columns.is_empty() {
            self.push("DISTINCT ");
        }
        match aggregate.columns.as_slice() {
            [] => self.push("*"),
            [column] => self.ident(column),
            _ => {
                return Err(KataError::Compile(format_compact!(
                    "{} takes a single column",
                    function.name()
                )));
            }
        }
        self.push(") AS ");
        self.ident(function.name());
        Ok(())
    }

    fn conditions(&mut self, conditions: &[Condition]) {
        if conditions.is_empty() {
            return;
        }
        self.push(" WHERE ");
        for (idx, condition) in conditions.iter().enumerate() {
            if idx > 0 {
                self.push(" AND ");
            }
            self.condition(condition, conditions.len() > 1);
        }
    }

    fn condition(&mut self, condition: &Condition, nested: bool) {
        match condition {
            Condition::Compare { column, op, value } => {
                self.ident(column);
                match (op.as_str(), value) {
                    ("=", Value::Null) => self.push(" IS NULL"),
                    ("<>", Value::Null) => self.push(" IS NOT NULL"),
                    (op, value) => {
                        self.push(" ");
                        self.push(op);
                        self.push(" ");
                        self.param(value);
                    }
                }
            }
            Condition::In {
                column,
                values,
                negated,
            } => {
                self.ident(column);
                self.push(if *negated { " NOT IN (" } else { " IN (" });
                for (idx, value) in values.iter().enumerate() {
                    if idx > 0 {
                        self.push(", ");
                    }
                    self.param(value);
                }
                self.push(")");
            }
            Condition::Null { column, negated } => {
                self.ident(column);
                self.push(if *negated { " IS NOT NULL" } else { " IS NULL" });
            }
            Condition::Like { column, pattern } => {
                self.ident(column);
                self.push(" LIKE ");
                self.param(&Value::Text(pattern.clone()));
            }
            Condition::And(parts) => self.group(parts, " AND ", "1 = 1", nested),
            Condition::Or(parts) => self.group(parts, " OR ", "1 = 0", nested),
            Condition::Not(inner) => {
                self.push("NOT (");
                self.condition(inner, false);
                self.push(")");
            }
        }
    }

    fn group(&mut self, parts: &[Condition], joiner: &str, empty: &str, nested: bool) {
        match parts {
            [] => self.push(empty),
            [only] => self.condition(only, nested),
            parts => {
                if nested {
                    self.push("(");
                }
                for (idx, part) in parts.iter().enumerate() {
                    if idx > 0 {
                        self.push(joiner);
                    }
                    self.condition(part, true);
                }
                if nested {
                    self.push(")");
                }
            }
        }
    }

    fn insert(&mut self, query: &Query) -> Result<()> {
        self.push("INSERT INTO ");
        self.table(query)?;
        if query.values.is_empty() {
            self.push(" DEFAULT VALUES");
            return Ok(());
        }
        self.push(" (");
        for (idx, (column, _)) in query.values.iter().enumerate() {
            if idx > 0 {
                self.push(", ");
            }
            self.ident(column);
        }
        self.push(") VALUES (");
        for (idx, (_, value)) in query.values.iter().enumerate() {
            if idx > 0 {
                self.push(", ");
            }
            self.param(value);
        }
        self.push(")");
        Ok(())
    }

    fn update(&mut self, query: &Query) -> Result<()> {
        if query.values.is_empty() {
            return Err(KataError::Compile("update without values".into()));
        }
        self.push("UPDATE ");
        self.table(query)?;
        self.push(" SET ");
        for (idx, (column, value)) in query.values.iter().enumerate() {
            if idx > 0 {
                self.push(", ");
            }
            self.ident(column);
            self.push(" = ");
            self.param(value);
        }
        self.conditions(&query.conditions);
        Ok(())
    }

    fn delete(&mut self, query: &Query) -> Result<()> {
        self.push("DELETE FROM ");
        self.table(query)?;
        self.conditions(&query.conditions);
        Ok(())
    }
}
