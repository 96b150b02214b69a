//! [`Connection`] for rusqlite connections and transactions.

use core::time::Duration;

use compact_str::{CompactString, format_compact};

use super::{CommandOptions, CommandType, Connection};
use crate::compiler::Compiled;
use crate::error::{KataError, Result};
use crate::row::Row;
use crate::value::Value;

/// Placeholder prefixes SQLite accepts for named parameters.
const NAMED_PREFIXES: [char; 3] = [':', '@', '$'];

/// Runs `run` under `options`; a timeout holds for this command only and the
/// connection's previous busy timeout is restored afterwards.
fn with_options<T>(
    conn: &::rusqlite::Connection,
    options: &CommandOptions,
    run: impl FnOnce() -> Result<T>,
) -> Result<T> {
    if options.command_type == CommandType::StoredProcedure {
        return Err(KataError::Unsupported(
            "SQLite has no stored procedures".into(),
        ));
    }
    let Some(timeout) = options.timeout else {
        return run();
    };

    let previous: i64 = conn.pragma_query_value(None, "busy_timeout", |row| row.get(0))?;
    conn.busy_timeout(timeout)?;
    let result = run();
    let restored = conn.busy_timeout(Duration::from_millis(u64::try_from(previous).unwrap_or(0)));
    let value = result?;
    restored?;
    Ok(value)
}

/// Prepares `sql` and binds every named binding that occurs in it.
///
/// A placeholder left without a binding is [`KataError::Other`].
fn prepare<'c>(
    conn: &'c ::rusqlite::Connection,
    sql: &str,
    bindings: &[(CompactString, Value)],
) -> Result<::rusqlite::Statement<'c>> {
    let mut stmt = conn.prepare(sql)?;
    let mut bound = vec![false; stmt.parameter_count()];
    let mut placeholder = String::new();
    for (name, value) in bindings {
        for prefix in NAMED_PREFIXES {
            placeholder.clear();
            placeholder.push(prefix);
            placeholder.push_str(name);
            if let Some(idx) = stmt.parameter_index(&placeholder)? {
                stmt.raw_bind_parameter(idx, value)?;
                bound[idx - 1] = true;
                break;
            }
        }
    }

    if let Some(missing) = bound.iter().position(|is_bound| !is_bound) {
        let idx = missing + 1;
        return Err(KataError::Other(format_compact!(
            "no binding for parameter `{}`",
            stmt.parameter_name(idx).unwrap_or("?")
        )));
    }
    Ok(stmt)
}

fn read_rows(stmt: &mut ::rusqlite::Statement<'_>) -> Result<Vec<Row>> {
    let names: Vec<CompactString> = stmt
        .column_names()
        .into_iter()
        .map(CompactString::from)
        .collect();

    let mut rows = stmt.raw_query();
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let mut record = Row::with_capacity(names.len());
        for (idx, name) in names.iter().enumerate() {
            record.push(name.clone(), Value::from(row.get_ref(idx)?));
        }
        out.push(record);
    }
    Ok(out)
}

fn query_all(
    conn: &::rusqlite::Connection,
    compiled: &Compiled,
    options: &CommandOptions,
) -> Result<Vec<Vec<Row>>> {
    with_options(conn, options, || {
        compiled
            .statements()
            .map(|sql| {
                crate::kata_trace_query!(sql, compiled.bindings.len());
                let mut stmt = prepare(conn, sql, &compiled.bindings)?;
                read_rows(&mut stmt)
            })
            .collect()
    })
}

fn query(
    conn: &::rusqlite::Connection,
    compiled: &Compiled,
    options: &CommandOptions,
) -> Result<Vec<Row>> {
    Ok(query_all(conn, compiled, options)?
        .pop()
        .unwrap_or_default())
}

fn execute(
    conn: &::rusqlite::Connection,
    compiled: &Compiled,
    options: &CommandOptions,
) -> Result<usize> {
    with_options(conn, options, || {
        let mut affected = 0;
        for sql in compiled.statements() {
            crate::kata_trace_query!(sql, compiled.bindings.len());
            let mut stmt = prepare(conn, sql, &compiled.bindings)?;
            affected += stmt.raw_execute()?;
        }
        Ok(affected)
    })
}

impl Connection for ::rusqlite::Connection {
    fn query(&self, compiled: &Compiled, options: &CommandOptions) -> Result<Vec<Row>> {
        query(self, compiled, options)
    }

    fn execute(&self, compiled: &Compiled, options: &CommandOptions) -> Result<usize> {
        execute(self, compiled, options)
    }

    fn query_multiple(
        &self,
        compiled: &Compiled,
        options: &CommandOptions,
    ) -> Result<Vec<Vec<Row>>> {
        query_all(self, compiled, options)
    }
}

impl Connection for ::rusqlite::Transaction<'_> {
    fn query(&self, compiled: &Compiled, options: &CommandOptions) -> Result<Vec<Row>> {
        query(self, compiled, options)
    }

    fn execute(&self, compiled: &Compiled, options: &CommandOptions) -> Result<usize> {
        execute(self, compiled, options)
    }

    fn query_multiple(
        &self,
        compiled: &Compiled,
        options: &CommandOptions,
    ) -> Result<Vec<Vec<Row>>> {
        query_all(self, compiled, options)
    }
}
