//! Owned SQL values and their conversions to and from record fields.
//!
//! [`Value`] mirrors the storage classes a row can carry. [`FromValue`] is the
//! coercion step used by materialization; `From<T> for Value` is the reverse
//! direction used by the accessor boundary and by query parameters.

#[cfg(feature = "rusqlite")]
mod rusqlite;

use compact_str::format_compact;

use crate::error::{KataError, Result};

/// A single column value (owned).
#[derive(Debug, Clone, PartialEq, PartialOrd, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Value {
    /// Integer value (i64)
    Integer(i64),
    /// Real value (f64)
    Real(f64),
    /// Text value
    Text(String),
    /// Blob value
    Blob(Vec<u8>),
    /// NULL value
    #[default]
    Null,
}

impl Value {
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Storage class name, used in mapping errors.
    pub const fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "INTEGER",
            Value::Real(_) => "REAL",
            Value::Text(_) => "TEXT",
            Value::Blob(_) => "BLOB",
            Value::Null => "NULL",
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{i}"),
            Value::Real(r) => write!(f, "{r}"),
            Value::Text(s) => f.write_str(s),
            Value::Blob(b) => f.write_str(&String::from_utf8_lossy(b)),
            Value::Null => f.write_str("NULL"),
        }
    }
}

//------------------------------------------------------------------------------
// FromValue - coercion into record fields
//------------------------------------------------------------------------------

/// Coerces a [`Value`] into a Rust field type.
///
/// Failures are data-integrity errors ([`KataError::Mapping`]) and are never
/// defaulted away.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self>;
}

fn mismatch<T>(value: &Value) -> KataError {
    KataError::mapping(format_compact!(
        "cannot convert {} into `{}`",
        value.type_name(),
        core::any::type_name::<T>()
    ))
}

macro_rules! impl_integer_from_value {
    ($($ty:ty),*) => { $(
        impl FromValue for $ty {
            fn from_value(value: &Value) -> Result<Self> {
                match value {
                    Value::Integer(i) => {
                        <$ty>::try_from(*i).map_err(|_| mismatch::<Self>(value))
                    }
                    other => Err(mismatch::<Self>(other)),
                }
            }
        }
    )* }
}

impl_integer_from_value!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

// Lossless into i64 only; u64/usize have no infallible mapping.
macro_rules! impl_value_from_integer {
    ($($ty:ty),*) => { $(
        impl From<$ty> for Value {
            fn from(value: $ty) -> Self {
                Value::Integer(i64::from(value))
            }
        }
    )* }
}

impl_value_from_integer!(i8, i16, i32, i64, u8, u16, u32);

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Real(r) => Ok(*r),
            Value::Integer(i) => Ok(*i as f64),
            other => Err(mismatch::<Self>(other)),
        }
    }
}

impl FromValue for f32 {
    fn from_value(value: &Value) -> Result<Self> {
        f64::from_value(value).map(|v| v as f32)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Real(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Real(f64::from(value))
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Integer(0) => Ok(false),
            Value::Integer(1) => Ok(true),
            other => Err(mismatch::<Self>(other)),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Integer(i64::from(value))
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Text(s) => Ok(s.clone()),
            other => Err(mismatch::<Self>(other)),
        }
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_owned())
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Blob(b) => Ok(b.clone()),
            other => Err(mismatch::<Self>(other)),
        }
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Blob(value)
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Value::Blob(value.to_vec())
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self> {
        Ok(value.clone())
    }
}

// -- Option<T>: NULL-aware wrapper --

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T> From<Option<T>> for Value
where
    Value: From<T>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Value::from)
    }
}

// -- Feature-gated types --

#[cfg(feature = "uuid")]
impl FromValue for uuid::Uuid {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Text(s) => uuid::Uuid::parse_str(s)
                .map_err(|e| KataError::mapping(format_compact!("invalid UUID: {e}"))),
            Value::Blob(b) => uuid::Uuid::from_slice(b)
                .map_err(|e| KataError::mapping(format_compact!("invalid UUID: {e}"))),
            other => Err(mismatch::<Self>(other)),
        }
    }
}

#[cfg(feature = "uuid")]
impl From<uuid::Uuid> for Value {
    fn from(value: uuid::Uuid) -> Self {
        Value::Text(value.to_string())
    }
}
