#![cfg(feature = "rusqlite")]

pub use rusqlite::*;
