//! Dynamic rows, the record accessor boundary, and row materialization.
//!
//! # Architecture
//!
//! ```text
//! Connection::query  → Vec<Row>          (ordered, case-insensitive names)
//! materialize::<T>() → Vec<T>            (T: FromRow; Row itself is the identity)
//! Record::field()    → Option<Value>     (by-name access used by include resolution)
//! ```
//!
//! Typed shapes get their [`FromRow`] and [`Record`] impls from
//! [`record!`](crate::record), so no runtime reflection is involved.

use compact_str::{CompactString, format_compact};

use crate::error::{KataError, Result};
use crate::value::{FromValue, Value};

// =============================================================================
// Row: ordered dynamic record
// =============================================================================

/// A fetched row as an ordered list of named values.
///
/// Name lookups ignore ASCII case, matching the column-mapping convention of
/// the data-access layer. When a name repeats, lookups see the first column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<(CompactString, Value)>,
}

impl Row {
    pub const fn new() -> Self {
        Self {
            columns: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            columns: Vec::with_capacity(capacity),
        }
    }

    /// Appends a column, keeping column order.
    pub fn push(&mut self, name: impl Into<CompactString>, value: impl Into<Value>) {
        self.columns.push((name.into(), value.into()));
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|(column, _)| column.eq_ignore_ascii_case(name))
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.position(name).map(|idx| &self.columns[idx].1)
    }

    /// Reads and coerces a column; a missing column is [`KataError::MissingField`].
    pub fn get_as<T: FromValue>(&self, name: &str) -> Result<T> {
        let value = self.get(name).ok_or_else(|| KataError::MissingField {
            shape: "Row",
            field: name.into(),
        })?;
        T::from_value(value)
    }

    /// Replaces the value of an existing column or appends a new one.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) {
        match self.position(name) {
            Some(idx) => self.columns[idx].1 = value.into(),
            None => self.columns.push((name.into(), value.into())),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn into_values(self) -> impl Iterator<Item = Value> {
        self.columns.into_iter().map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Renders the row as a JSON object, keeping column order.
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.iter()
                .map(|(name, value)| {
                    let json = serde_json::to_value(value).unwrap_or(serde_json::Value::Null);
                    (name.to_owned(), json)
                })
                .collect(),
        )
    }
}

impl<K, V> FromIterator<(K, V)> for Row
where
    K: Into<CompactString>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            columns: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

impl IntoIterator for Row {
    type Item = (CompactString, Value);
    type IntoIter = std::vec::IntoIter<(CompactString, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.into_iter()
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Row {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, value) in &self.columns {
            map.serialize_entry(name.as_str(), value)?;
        }
        map.end()
    }
}

// =============================================================================
// Record: by-name field access
// =============================================================================

/// Get/set a field by name without static knowledge of the record shape.
///
/// Names are matched ignoring ASCII case.
pub trait Record {
    /// Shape name, used in error messages.
    fn shape(&self) -> &'static str;

    fn field(&self, name: &str) -> Option<Value>;

    fn set_field(&mut self, name: &str, value: Value) -> Result<()>;

    /// Like [`field`](Record::field) but a missing field is an error.
    fn require_field(&self, name: &str) -> Result<Value> {
        self.field(name).ok_or_else(|| KataError::MissingField {
            shape: self.shape(),
            field: name.into(),
        })
    }
}

impl Record for Row {
    fn shape(&self) -> &'static str {
        "Row"
    }

    fn field(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }

    fn set_field(&mut self, name: &str, value: Value) -> Result<()> {
        self.set(name, value);
        Ok(())
    }
}

// =============================================================================
// FromRow: materialization
// =============================================================================

/// Builds a record from a fetched row.
#[diagnostic::on_unimplemented(
    message = "cannot materialize `{Self}` from a row",
    label = "this type does not implement FromRow",
    note = "declare the type with `kata::record!` or fetch `Row` for dynamic records"
)]
pub trait FromRow: Sized {
    fn from_row(row: Row) -> Result<Self>;
}

impl FromRow for Row {
    fn from_row(row: Row) -> Result<Self> {
        Ok(row)
    }
}

/// Maps fetched rows into records; the first coercion failure aborts.
pub fn materialize<T: FromRow>(rows: Vec<Row>) -> Result<Vec<T>> {
    crate::kata_profile_scope!("materialize", "rows");
    rows.into_iter().map(T::from_row).collect()
}

#[doc(hidden)]
pub fn field_error(shape: &str, field: &str, error: KataError) -> KataError {
    match error {
        KataError::Mapping(message) => {
            KataError::Mapping(format_compact!("{shape}.{field}: {message}"))
        }
        other => other,
    }
}
