use compact_str::CompactString;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KataError {
    /// A caller-supplied argument is out of range (checked before any I/O)
    #[error("Invalid argument `{name}`: {message}")]
    InvalidArgument {
        name: &'static str,
        message: CompactString,
    },

    /// The factory was not wired with a connection or compiler
    #[error("Misconfigured: {0}")]
    Misconfigured(CompactString),

    /// A fetched value could not be coerced into the requested record shape
    #[error("Mapping error: {0}")]
    Mapping(CompactString),

    /// A key or field named by an include is absent on the record
    #[error("Field `{field}` not found on `{shape}`")]
    MissingField {
        shape: &'static str,
        field: CompactString,
    },

    /// No rows returned when at least one was expected
    #[error("No rows found")]
    NotFound,

    /// The compiler could not render the query description
    #[error("Compile error: {0}")]
    Compile(CompactString),

    /// The data source does not support the requested operation
    #[error("Unsupported: {0}")]
    Unsupported(CompactString),

    /// Generic error
    #[error("Database error: {0}")]
    Other(CompactString),

    /// Rusqlite specific errors
    #[cfg(feature = "rusqlite")]
    #[error("Rusqlite error: {0}")]
    Rusqlite(#[from] rusqlite::Error),
}

impl KataError {
    pub fn invalid_argument(name: &'static str, message: impl Into<CompactString>) -> Self {
        Self::InvalidArgument {
            name,
            message: message.into(),
        }
    }

    pub fn mapping(message: impl Into<CompactString>) -> Self {
        Self::Mapping(message.into())
    }
}

impl From<core::num::TryFromIntError> for KataError {
    fn from(value: core::num::TryFromIntError) -> Self {
        Self::Mapping(compact_str::format_compact!("integer out of range: {value}"))
    }
}

/// Result type for query execution
pub type Result<T> = std::result::Result<T, KataError>;
