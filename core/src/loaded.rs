//! `Loaded<T>`: a materialized record plus the relations resolved for it.
//!
//! Include resolution never mutates caller-owned records. It returns each
//! parent wrapped in a [`Loaded`] whose relation store maps the include name
//! to the children materialized for that parent:
//!
//! ```text
//! Loaded<SelectUser>
//!   record:    SelectUser { id: 1, .. }
//!   relations: "posts" → Arc<Vec<Loaded<Post>>>
//!              "roles" → Arc<Vec<Loaded<Row>>>
//! ```
//!
//! Parents sharing a local key share the same `Arc`.

use core::any::Any;
use core::ops::{Deref, DerefMut};
use std::sync::Arc;

use compact_str::CompactString;
use smallvec::SmallVec;

use crate::error::Result;
use crate::row::{FromRow, Record, Row};
use crate::value::Value;

/// Type-erased children of one relation (always a `Vec<Loaded<C>>`).
pub type RelationData = Arc<dyn Any + Send + Sync>;

/// A record together with its resolved relations.
#[derive(Clone, Default)]
pub struct Loaded<T> {
    record: T,
    relations: SmallVec<[(CompactString, RelationData); 2]>,
}

impl<T> Loaded<T> {
    pub fn new(record: T) -> Self {
        Self {
            record,
            relations: SmallVec::new(),
        }
    }

    pub fn record(&self) -> &T {
        &self.record
    }

    pub fn into_inner(self) -> T {
        self.record
    }

    /// Converts the record, keeping every attached relation.
    pub fn try_map<U>(self, f: impl FnOnce(T) -> Result<U>) -> Result<Loaded<U>> {
        Ok(Loaded {
            record: f(self.record)?,
            relations: self.relations,
        })
    }

    /// Attaches (or replaces) the children stored under `name`.
    pub fn attach(&mut self, name: impl Into<CompactString>, children: RelationData) {
        let name = name.into();
        match self.relations.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = children,
            None => self.relations.push((name, children)),
        }
    }

    pub fn has_relation(&self, name: &str) -> bool {
        self.relations.iter().any(|(n, _)| n == name)
    }

    pub fn relation_names(&self) -> impl Iterator<Item = &str> {
        self.relations.iter().map(|(name, _)| name.as_str())
    }

    /// Children attached under `name` as shape `C`.
    ///
    /// `None` when nothing was attached under that name or the children were
    /// materialized into a different shape.
    pub fn related<C: 'static>(&self, name: &str) -> Option<&[Loaded<C>]> {
        self.relations
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, data)| data.downcast_ref::<Vec<Loaded<C>>>())
            .map(Vec::as_slice)
    }

    /// Children of an untyped include.
    pub fn related_rows(&self, name: &str) -> Option<&[Loaded<Row>]> {
        self.related::<Row>(name)
    }
}

impl<T> From<T> for Loaded<T> {
    fn from(record: T) -> Self {
        Self::new(record)
    }
}

impl<T> Deref for Loaded<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.record
    }
}

impl<T> DerefMut for Loaded<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.record
    }
}

impl<T: core::fmt::Debug> core::fmt::Debug for Loaded<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Loaded")
            .field("record", &self.record)
            .field(
                "relations",
                &self.relations.iter().map(|(n, _)| n).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl<T: Record> Record for Loaded<T> {
    fn shape(&self) -> &'static str {
        self.record.shape()
    }

    fn field(&self, name: &str) -> Option<Value> {
        self.record.field(name)
    }

    fn set_field(&mut self, name: &str, value: Value) -> Result<()> {
        self.record.set_field(name, value)
    }
}

impl<T: FromRow> FromRow for Loaded<T> {
    fn from_row(row: Row) -> Result<Self> {
        T::from_row(row).map(Loaded::new)
    }
}
