//! Include descriptors: relations resolved by a secondary query after the
//! primary fetch.

use std::sync::Arc;

use compact_str::CompactString;

use super::Query;
use crate::error::Result;
use crate::loaded::{Loaded, RelationData};
use crate::row::{FromRow, Row};

/// Converts the grouped child rows of one parent into the stored relation.
pub type MaterializeFn = fn(Vec<Loaded<Row>>) -> Result<RelationData>;

/// How children of an include are materialized.
#[derive(Clone, Copy)]
pub enum ChildShape {
    /// Children stay dynamic rows (`Vec<Loaded<Row>>`).
    Dynamic,
    /// Children are converted with `materialize` into `Vec<Loaded<C>>`.
    Typed {
        type_name: &'static str,
        materialize: MaterializeFn,
    },
}

impl ChildShape {
    /// Shape for children of type `C`.
    pub fn of<C: FromRow + Send + Sync + 'static>() -> Self {
        ChildShape::Typed {
            type_name: core::any::type_name::<C>(),
            materialize: materialize_children::<C>,
        }
    }

    pub fn materialize(&self, children: Vec<Loaded<Row>>) -> Result<RelationData> {
        match self {
            ChildShape::Dynamic => Ok(Arc::new(children)),
            ChildShape::Typed { materialize, .. } => materialize(children),
        }
    }

    pub const fn type_name(&self) -> &'static str {
        match self {
            ChildShape::Dynamic => "Row",
            ChildShape::Typed { type_name, .. } => type_name,
        }
    }
}

impl core::fmt::Debug for ChildShape {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ChildShape::Dynamic => f.write_str("Dynamic"),
            ChildShape::Typed { type_name, .. } => f.debug_tuple("Typed").field(type_name).finish(),
        }
    }
}

fn materialize_children<C: FromRow + Send + Sync + 'static>(
    children: Vec<Loaded<Row>>,
) -> Result<RelationData> {
    let typed = children
        .into_iter()
        .map(|child| child.try_map(C::from_row))
        .collect::<Result<Vec<Loaded<C>>>>()?;
    Ok(Arc::new(typed))
}

/// A declared parent/child relation.
///
/// `name` is both the default child table and the name the children are
/// attached under. `related_key` is read from child rows, `local_key` from
/// parents.
#[derive(Debug, Clone)]
pub struct Include {
    pub name: CompactString,
    pub query: Option<Box<Query>>,
    pub related_key: CompactString,
    pub local_key: CompactString,
    pub shape: ChildShape,
}

impl Include {
    /// An include whose children stay dynamic rows.
    pub fn new(
        name: impl Into<CompactString>,
        related_key: impl Into<CompactString>,
        local_key: impl Into<CompactString>,
    ) -> Self {
        Self {
            name: name.into(),
            query: None,
            related_key: related_key.into(),
            local_key: local_key.into(),
            shape: ChildShape::Dynamic,
        }
    }

    /// An include whose children are materialized as `C`.
    pub fn typed<C: FromRow + Send + Sync + 'static>(
        name: impl Into<CompactString>,
        related_key: impl Into<CompactString>,
        local_key: impl Into<CompactString>,
    ) -> Self {
        Self {
            shape: ChildShape::of::<C>(),
            ..Self::new(name, related_key, local_key)
        }
    }

    /// Uses `query` for the children instead of a bare query over `name`.
    pub fn with_query(mut self, query: Query) -> Self {
        self.query = Some(Box::new(query));
        self
    }

    /// The child query before the key filter is added.
    pub fn child_query(&self) -> Query {
        match &self.query {
            Some(query) => (**query).clone(),
            None => Query::new(self.name.clone()),
        }
    }
}
