//! Dialect-independent building blocks for kata: values, dynamic rows, the
//! record accessor boundary, query descriptions, and the compiler and
//! connection seams the execution facade is written against.

#[macro_use]
mod macros;
mod profiling;
mod trace;

pub mod compiler;
pub mod connection;
pub mod error;
pub mod loaded;
pub mod query;
pub mod row;
pub mod value;

// Re-export key types and traits
pub use compiler::{Compiled, Compiler, STATEMENT_SEPARATOR};
pub use connection::{CommandOptions, CommandType, Connection};
pub use error::{KataError, Result};
pub use loaded::{Loaded, RelationData};
pub use query::{
    Aggregate, AggregateFn, ChildShape, Condition, Include, Method, Operator, OrderBy, Query,
};
pub use row::{FromRow, Record, Row, materialize};
pub use value::{FromValue, Value};

#[doc(hidden)]
pub mod __private {
    #[cfg(feature = "profiling")]
    pub use puffin;
    #[cfg(feature = "tracing")]
    pub use tracing;
}
