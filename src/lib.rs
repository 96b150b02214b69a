//! # kata
//!
//! Query execution over a pluggable SQL compiler: materialization into typed
//! or dynamic records, include resolution (application-side joins),
//! pagination and chunked iteration.
//!
//! ## Quick Start
//!
//! ```rust
//! use kata::prelude::*;
//!
//! kata::record! {
//!     #[derive(Debug, Clone, Default)]
//!     pub struct User {
//!         pub id: i64,
//!         pub name: String,
//!     }
//! }
//!
//! # fn main() -> kata::Result<()> {
//! let conn = rusqlite::Connection::open_in_memory()?;
//! conn.execute_batch(
//!     "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT);
//!      CREATE TABLE posts (id INTEGER PRIMARY KEY, user_id INTEGER, title TEXT);
//!      INSERT INTO users VALUES (1, 'ada');
//!      INSERT INTO posts VALUES (1, 1, 'notes');",
//! )?;
//! let db = QueryFactory::sqlite(conn);
//!
//! let users: Vec<Loaded<User>> = db.get(
//!     &db.query("users").include(Include::new("posts", "user_id", "id")),
//! )?;
//! assert_eq!(users[0].name, "ada");
//! assert_eq!(users[0].related_rows("posts").map(<[_]>::len), Some(1));
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! | Feature     | Default | Enables                                        |
//! |-------------|---------|------------------------------------------------|
//! | `rusqlite`  | ✅      | `Connection` for rusqlite, `QueryFactory::sqlite` |
//! | `tracing`   | ✅      | debug events for queries, includes and pages   |
//! | `serde`     |         | `Value`/`Row` serialization, `ExecutionConfig` deserialization |
//! | `uuid`      |         | `uuid::Uuid` values                            |
//! | `profiling` |         | puffin scopes                                  |

mod config;
mod factory;
mod include;
mod multi;
mod pagination;

// =============================================================================
// Root-level exports
// =============================================================================

/// Result type for kata operations
pub use kata_core::error::Result;

/// Record declaration macro
pub use kata_core::record;

/// Error types
pub mod error {
    pub use kata_core::error::KataError;
}

pub use config::{DEFAULT_PER_PAGE, DEFAULT_QUERY_TIMEOUT, ExecutionConfig};
pub use factory::{Logger, NO_BINDINGS, QueryFactory, QueryFactoryBuilder};
pub use include::resolve_include;
pub use multi::MultiReader;
pub use pagination::{ChunkFlow, Page, Pages};

/// Core types shared with compilers and connections.
///
/// ```rust,ignore
/// use kata::core::query::condition::{and, eq, gt};
/// ```
pub mod core {
    pub use kata_core::*;
}

/// SQLite dialect.
pub mod sqlite {
    pub use kata_sqlite::SqliteCompiler;
}

/// Everything needed to build and run queries.
pub mod prelude {
    pub use crate::sqlite::SqliteCompiler;
    pub use crate::{ChunkFlow, ExecutionConfig, MultiReader, NO_BINDINGS, Page, QueryFactory};
    pub use kata_core::query::condition::{
        and, eq, gt, gte, in_array, is_not_null, is_null, like, lt, lte, neq, not, not_in_array,
        or,
    };
    pub use kata_core::{
        AggregateFn, CommandOptions, CommandType, Compiled, Compiler, Connection, FromRow,
        FromValue, Include, KataError, Loaded, OrderBy, Query, Record, Row, Value,
    };
}
