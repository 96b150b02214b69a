//! The execution facade: compile, execute, materialize, resolve includes.

use compact_str::CompactString;
use kata_core::query::{AggregateFn, Query};
use kata_core::{
    CommandOptions, Compiled, Compiler, Connection, FromRow, FromValue, KataError, Loaded,
    Record, Result, Row, Value, materialize,
};

use crate::config::ExecutionConfig;
use crate::include::resolve_include;
use crate::multi::MultiReader;

/// Empty binding list for raw SQL without parameters.
pub const NO_BINDINGS: [(&str, Value); 0] = [];

/// Callback receiving every compiled statement before it runs.
pub type Logger = Box<dyn Fn(&Compiled) + Send + Sync>;

/// Runs query descriptions against a connection through a compiler.
///
/// The factory borrows nothing and pools nothing: it owns the connection and
/// compiler it was built with (pass `&rusqlite::Connection` or a
/// `&rusqlite::Transaction` to keep ownership with the caller).
///
/// ```rust,ignore
/// let db = QueryFactory::new(conn, SqliteCompiler);
/// let users: Vec<Loaded<User>> = db.get(
///     &db.query("users")
///         .where_eq("active", true)
///         .include(Include::typed::<Post>("posts", "user_id", "id")),
/// )?;
/// ```
pub struct QueryFactory<C, P> {
    connection: C,
    compiler: P,
    logger: Option<Logger>,
    config: ExecutionConfig,
}

impl<C, P> core::fmt::Debug for QueryFactory<C, P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("QueryFactory")
            .field("logger", &self.logger.is_some())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Construction
// =============================================================================

/// Builder for [`QueryFactory`]; [`build`](Self::build) fails with
/// [`KataError::Misconfigured`] unless both a connection and a compiler were set.
pub struct QueryFactoryBuilder<C, P> {
    connection: Option<C>,
    compiler: Option<P>,
    logger: Option<Logger>,
    config: ExecutionConfig,
}

impl<C, P> Default for QueryFactoryBuilder<C, P> {
    fn default() -> Self {
        Self {
            connection: None,
            compiler: None,
            logger: None,
            config: ExecutionConfig::default(),
        }
    }
}

impl<C, P> QueryFactoryBuilder<C, P> {
    pub fn connection(mut self, connection: C) -> Self {
        self.connection = Some(connection);
        self
    }

    pub fn compiler(mut self, compiler: P) -> Self {
        self.compiler = Some(compiler);
        self
    }

    pub fn logger(mut self, logger: impl Fn(&Compiled) + Send + Sync + 'static) -> Self {
        self.logger = Some(Box::new(logger));
        self
    }

    pub fn config(mut self, config: ExecutionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<QueryFactory<C, P>> {
        let connection = self
            .connection
            .ok_or_else(|| KataError::Misconfigured("no connection configured".into()))?;
        let compiler = self
            .compiler
            .ok_or_else(|| KataError::Misconfigured("no compiler configured".into()))?;
        Ok(QueryFactory {
            connection,
            compiler,
            logger: self.logger,
            config: self.config,
        })
    }
}

impl<C, P> QueryFactory<C, P> {
    pub fn new(connection: C, compiler: P) -> Self {
        Self {
            connection,
            compiler,
            logger: None,
            config: ExecutionConfig::default(),
        }
    }

    pub fn builder() -> QueryFactoryBuilder<C, P> {
        QueryFactoryBuilder::default()
    }

    /// Installs the callback that sees every compiled statement.
    pub fn with_logger(mut self, logger: impl Fn(&Compiled) + Send + Sync + 'static) -> Self {
        self.logger = Some(Box::new(logger));
        self
    }

    pub fn with_config(mut self, config: ExecutionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn connection(&self) -> &C {
        &self.connection
    }

    pub fn compiler(&self) -> &P {
        &self.compiler
    }

    pub fn config(&self) -> &ExecutionConfig {
        &self.config
    }

    /// Hands back the connection and compiler.
    pub fn into_parts(self) -> (C, P) {
        (self.connection, self.compiler)
    }

    /// A fresh select over `table`.
    pub fn query(&self, table: impl Into<CompactString>) -> Query {
        Query::new(table)
    }

    /// A deep copy of `query`; changes to either never reach the other.
    pub fn from_query(&self, query: &Query) -> Query {
        query.clone()
    }

    fn log(&self, compiled: &Compiled) {
        if let Some(logger) = &self.logger {
            logger(compiled);
        }
    }

    /// Default options for writes, scalars and batches: the configured
    /// timeout and [`CommandType::Text`](kata_core::CommandType::Text).
    pub fn command_options(&self) -> CommandOptions {
        CommandOptions::with_timeout(self.config.query_timeout)
    }
}

#[cfg(feature = "rusqlite")]
impl QueryFactory<::rusqlite::Connection, kata_sqlite::SqliteCompiler> {
    /// A factory over a rusqlite connection using the SQLite compiler.
    pub fn sqlite(connection: ::rusqlite::Connection) -> Self {
        Self::new(connection, kata_sqlite::SqliteCompiler)
    }
}

// =============================================================================
// Execution
// =============================================================================

impl<C: Connection, P: Compiler> QueryFactory<C, P> {
    /// Compiles `query` and passes the result through the logger.
    pub fn compile(&self, query: &Query) -> Result<Compiled> {
        let compiled = self.compiler.compile(query)?;
        self.log(&compiled);
        Ok(compiled)
    }

    /// Rows as fetched, without materialization or includes.
    pub fn get_rows(&self, query: &Query) -> Result<Vec<Row>> {
        let compiled = self.compile(query)?;
        self.connection.query(&compiled, &CommandOptions::default())
    }

    /// Fetches, materializes into `T` and resolves every include of `query`.
    pub fn get<T: FromRow + Record>(&self, query: &Query) -> Result<Vec<Loaded<T>>> {
        let mut records: Vec<Loaded<T>> = materialize(self.get_rows(query)?)?;
        for include in &query.includes {
            records = resolve_include(self, records, include)?;
        }
        Ok(records)
    }

    /// The first match; [`KataError::NotFound`] when there is none.
    pub fn first<T: FromRow + Record>(&self, query: &Query) -> Result<Loaded<T>> {
        self.first_or_default(query)?.ok_or(KataError::NotFound)
    }

    /// The first match, or `None`.
    pub fn first_or_default<T: FromRow + Record>(&self, query: &Query) -> Result<Option<Loaded<T>>> {
        Ok(self.get(&query.clone().limit(1))?.into_iter().next())
    }

    /// Runs an insert, update or delete; returns the affected-row count.
    pub fn execute(&self, query: &Query) -> Result<usize> {
        self.execute_with(query, self.command_options())
    }

    /// [`execute`](Self::execute) with explicit command options.
    pub fn execute_with(&self, query: &Query, options: CommandOptions) -> Result<usize> {
        let compiled = self.compile(query)?;
        self.connection.execute(&compiled, &options)
    }

    /// First column of the first row, coerced into `V` (`Null` when empty).
    pub fn execute_scalar<V: FromValue>(&self, query: &Query) -> Result<V> {
        self.execute_scalar_with(query, self.command_options())
    }

    /// [`execute_scalar`](Self::execute_scalar) with explicit command options.
    pub fn execute_scalar_with<V: FromValue>(
        &self,
        query: &Query,
        options: CommandOptions,
    ) -> Result<V> {
        let compiled = self.compile(&query.clone().limit(1))?;
        V::from_value(&self.connection.query_scalar(&compiled, &options)?)
    }

    pub fn aggregate<V: FromValue, S: Into<CompactString>>(
        &self,
        query: &Query,
        function: AggregateFn,
        columns: impl IntoIterator<Item = S>,
    ) -> Result<V> {
        self.execute_scalar(&query.clone().as_aggregate(function, columns))
    }

    /// Number of rows `query` matches.
    pub fn count<V: FromValue>(&self, query: &Query) -> Result<V> {
        self.execute_scalar(&query.clone().as_count(core::iter::empty::<&str>()))
    }

    pub fn average<V: FromValue>(&self, query: &Query, column: &str) -> Result<V> {
        self.aggregate(query, AggregateFn::Avg, [column])
    }

    pub fn sum<V: FromValue>(&self, query: &Query, column: &str) -> Result<V> {
        self.aggregate(query, AggregateFn::Sum, [column])
    }

    pub fn min<V: FromValue>(&self, query: &Query, column: &str) -> Result<V> {
        self.aggregate(query, AggregateFn::Min, [column])
    }

    pub fn max<V: FromValue>(&self, query: &Query, column: &str) -> Result<V> {
        self.aggregate(query, AggregateFn::Max, [column])
    }

    /// Compiles `queries` into one batch, logs it once and runs it.
    ///
    /// Parameters are numbered across the whole batch so bindings never
    /// collide. Includes are not resolved for batched reads.
    pub fn get_multiple(&self, queries: &[Query]) -> Result<MultiReader> {
        self.get_multiple_with(queries, self.command_options())
    }

    /// [`get_multiple`](Self::get_multiple) with explicit command options.
    pub fn get_multiple_with(
        &self,
        queries: &[Query],
        options: CommandOptions,
    ) -> Result<MultiReader> {
        let mut batch = Compiled::default();
        for query in queries {
            let compiled = self.compiler.compile_at(query, batch.bindings.len())?;
            batch = batch.combine(compiled, &self.config.batch_separator);
        }
        self.log(&batch);
        let sets = self.connection.query_multiple(&batch, &options)?;
        Ok(MultiReader::new(sets))
    }

    /// One materialized result list per query, in query order.
    pub fn get_many<T: FromRow>(&self, queries: &[Query]) -> Result<Vec<Vec<T>>> {
        let mut reader = self.get_multiple(queries)?;
        (0..queries.len()).map(|_| reader.read::<T>()).collect()
    }

    /// Runs raw SQL with named bindings and materializes the rows.
    pub fn select<T, K, V>(&self, sql: &str, bindings: impl IntoIterator<Item = (K, V)>) -> Result<Vec<T>>
    where
        T: FromRow,
        K: Into<CompactString>,
        V: Into<Value>,
    {
        let compiled = Compiled::raw(sql, bindings);
        materialize(self.connection.query(&compiled, &CommandOptions::default())?)
    }

    /// Runs a raw statement; returns the affected-row count.
    pub fn statement<K, V>(&self, sql: &str, bindings: impl IntoIterator<Item = (K, V)>) -> Result<usize>
    where
        K: Into<CompactString>,
        V: Into<Value>,
    {
        let compiled = Compiled::raw(sql, bindings);
        self.connection.execute(&compiled, &CommandOptions::default())
    }

    /// Awaitable [`select`](Self::select); completes when the query does.
    pub async fn select_async<T, K, V>(
        &self,
        sql: &str,
        bindings: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Vec<T>>
    where
        T: FromRow,
        K: Into<CompactString>,
        V: Into<Value>,
    {
        self.select(sql, bindings)
    }

    /// Awaitable [`statement`](Self::statement).
    pub async fn statement_async<K, V>(
        &self,
        sql: &str,
        bindings: impl IntoIterator<Item = (K, V)>,
    ) -> Result<usize>
    where
        K: Into<CompactString>,
        V: Into<Value>,
    {
        self.statement(sql, bindings)
    }
}
