//! Include resolution: an application-side join of child rows onto parents.
//!
//! ```text
//! parents ──local_key──▶ [k1, k2, k1, …]
//!                          │
//!     child query + `related_key IN (k1, k2, k1, …)`
//!                          │
//!     children grouped by related_key ──▶ { k1: [c, c], k2: [c] }
//!                          │
//!     each group materialized once, shared by every parent with that key
//! ```

use hashbrown::HashMap;
use kata_core::{Compiler, Connection, Include, Loaded, Record, RelationData, Result, Row, Value};

use crate::QueryFactory;

/// A hashable join key.
///
/// Reals with an integral value join integers (SQLite hands back either
/// depending on column affinity).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum GroupKey {
    Integer(i64),
    Real(u64),
    Text(String),
    Blob(Vec<u8>),
    Null,
}

impl From<Value> for GroupKey {
    fn from(value: Value) -> Self {
        match value {
            Value::Integer(i) => GroupKey::Integer(i),
            Value::Real(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
                GroupKey::Integer(f as i64)
            }
            Value::Real(f) => GroupKey::Real(f.to_bits()),
            Value::Text(s) => GroupKey::Text(s),
            Value::Blob(b) => GroupKey::Blob(b),
            Value::Null => GroupKey::Null,
        }
    }
}

/// Resolves one include for `parents` and returns them with the relation
/// attached under `include.name`.
///
/// * No parents: returned as given, no query runs.
/// * No children at all: returned as given, nothing attached.
/// * A parent whose key matched nothing gets an empty collection.
///
/// A key field missing on a parent or child is [`KataError::MissingField`].
///
/// [`KataError::MissingField`]: kata_core::KataError::MissingField
pub fn resolve_include<T, C, P>(
    db: &QueryFactory<C, P>,
    mut parents: Vec<Loaded<T>>,
    include: &Include,
) -> Result<Vec<Loaded<T>>>
where
    T: Record,
    C: Connection,
    P: Compiler,
{
    kata_core::kata_profile_scope!("include", "resolve");

    if parents.is_empty() {
        return Ok(parents);
    }

    let keys = parents
        .iter()
        .map(|parent| parent.require_field(&include.local_key))
        .collect::<Result<Vec<Value>>>()?;

    let query = include
        .child_query()
        .where_in(include.related_key.clone(), keys.iter().cloned());
    let children: Vec<Loaded<Row>> = db.get(&query)?;

    kata_core::kata_trace_include!(include.name, parents.len(), children.len());

    if children.is_empty() {
        return Ok(parents);
    }

    let mut groups: HashMap<GroupKey, Vec<Loaded<Row>>> = HashMap::new();
    for child in children {
        let key = child.require_field(&include.related_key)?;
        groups.entry(GroupKey::from(key)).or_default().push(child);
    }

    let mut shared: HashMap<GroupKey, RelationData> = HashMap::with_capacity(groups.len());
    for (key, group) in groups {
        shared.insert(key, include.shape.materialize(group)?);
    }
    let empty = include.shape.materialize(Vec::new())?;

    for (parent, key) in parents.iter_mut().zip(keys) {
        let children = shared
            .get(&GroupKey::from(key))
            .cloned()
            .unwrap_or_else(|| empty.clone());
        parent.attach(include.name.clone(), children);
    }
    Ok(parents)
}
