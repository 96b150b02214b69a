//! The data-source boundary.
//!
//! A [`Connection`] runs compiled SQL with named bindings and hands back
//! dynamic [`Row`]s. Ownership of the underlying handle stays with the caller
//! or the factory holding it; nothing here pools, opens or closes connections.

#[cfg(feature = "rusqlite")]
mod rusqlite;

use core::time::Duration;

use crate::compiler::Compiled;
use crate::error::Result;
use crate::row::Row;
use crate::value::Value;

/// How the command text is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CommandType {
    #[default]
    Text,
    StoredProcedure,
}

/// Per-command execution options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommandOptions {
    /// Upper bound on how long the command may wait; `None` leaves the
    /// source's own default in place.
    pub timeout: Option<Duration>,
    pub command_type: CommandType,
}

impl CommandOptions {
    pub const fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            command_type: CommandType::Text,
        }
    }

    pub const fn command_type(mut self, command_type: CommandType) -> Self {
        self.command_type = command_type;
        self
    }
}

/// Executes compiled SQL against a data source.
///
/// Bindings are matched to placeholders by name. A [`Compiled`] holding
/// several statements is run statement by statement, in order.
pub trait Connection {
    /// Rows of the last statement.
    fn query(&self, compiled: &Compiled, options: &CommandOptions) -> Result<Vec<Row>>;

    /// Affected-row count, summed over all statements.
    fn execute(&self, compiled: &Compiled, options: &CommandOptions) -> Result<usize>;

    /// One row set per statement, in statement order.
    fn query_multiple(&self, compiled: &Compiled, options: &CommandOptions)
    -> Result<Vec<Vec<Row>>>;

    /// First column of the first row, or `Null` when nothing came back.
    fn query_scalar(&self, compiled: &Compiled, options: &CommandOptions) -> Result<Value> {
        Ok(self
            .query(compiled, options)?
            .into_iter()
            .next()
            .and_then(|row| row.into_values().next())
            .unwrap_or(Value::Null))
    }
}

impl<C: Connection + ?Sized> Connection for &C {
    fn query(&self, compiled: &Compiled, options: &CommandOptions) -> Result<Vec<Row>> {
        (**self).query(compiled, options)
    }

    fn execute(&self, compiled: &Compiled, options: &CommandOptions) -> Result<usize> {
        (**self).execute(compiled, options)
    }

    fn query_multiple(
        &self,
        compiled: &Compiled,
        options: &CommandOptions,
    ) -> Result<Vec<Vec<Row>>> {
        (**self).query_multiple(compiled, options)
    }

    fn query_scalar(&self, compiled: &Compiled, options: &CommandOptions) -> Result<Value> {
        (**self).query_scalar(compiled, options)
    }
}
