//! SQLite dialect for kata.
//!
//! Provides [`SqliteCompiler`], which renders kata query descriptions into
//! SQLite SQL with `:name` placeholders. Execution against rusqlite lives in
//! `kata-core` behind its `rusqlite` feature.

mod compiler;

pub use compiler::SqliteCompiler;
