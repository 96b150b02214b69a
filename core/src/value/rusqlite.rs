//! rusqlite conversions for [`Value`].

use ::rusqlite::types::{FromSql, FromSqlResult, ToSqlOutput, ValueRef};

use super::Value;

impl ::rusqlite::ToSql for Value {
    fn to_sql(&self) -> ::rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            Value::Null => Ok(ToSqlOutput::Owned(::rusqlite::types::Value::Null)),
            Value::Integer(i) => Ok(ToSqlOutput::Owned(::rusqlite::types::Value::Integer(*i))),
            Value::Real(f) => Ok(ToSqlOutput::Owned(::rusqlite::types::Value::Real(*f))),
            Value::Text(s) => Ok(ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes()))),
            Value::Blob(b) => Ok(ToSqlOutput::Borrowed(ValueRef::Blob(b.as_ref()))),
        }
    }
}

impl FromSql for Value {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        Ok(Value::from(value))
    }
}

impl From<ValueRef<'_>> for Value {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => Value::Integer(i),
            ValueRef::Real(r) => Value::Real(r),
            ValueRef::Text(items) => Value::Text(String::from_utf8_lossy(items).into_owned()),
            ValueRef::Blob(items) => Value::Blob(items.to_vec()),
        }
    }
}

impl From<::rusqlite::types::Value> for Value {
    fn from(value: ::rusqlite::types::Value) -> Self {
        match value {
            ::rusqlite::types::Value::Null => Value::Null,
            ::rusqlite::types::Value::Integer(i) => Value::Integer(i),
            ::rusqlite::types::Value::Real(r) => Value::Real(r),
            ::rusqlite::types::Value::Text(s) => Value::Text(s),
            ::rusqlite::types::Value::Blob(b) => Value::Blob(b),
        }
    }
}
