//! Sequential reader over the result sets of a batched multi-query.

use std::collections::VecDeque;

use kata_core::{FromRow, KataError, Result, Row, materialize};

/// Result sets of a batch, read front to back.
///
/// Each `read*` call consumes the next set. Reading past the last set is
/// [`KataError::Other`].
#[derive(Debug, Clone, Default)]
pub struct MultiReader {
    sets: VecDeque<Vec<Row>>,
    consumed: usize,
}

impl MultiReader {
    pub fn new(sets: Vec<Vec<Row>>) -> Self {
        Self {
            sets: sets.into(),
            consumed: 0,
        }
    }

    fn next_set(&mut self) -> Result<Vec<Row>> {
        let set = self.sets.pop_front().ok_or_else(|| {
            KataError::Other(compact_str::format_compact!(
                "no result set left after reading {}",
                self.consumed
            ))
        })?;
        self.consumed += 1;
        Ok(set)
    }

    /// Materializes the next result set.
    pub fn read<T: FromRow>(&mut self) -> Result<Vec<T>> {
        materialize(self.next_set()?)
    }

    /// First row of the next result set; [`KataError::NotFound`] when empty.
    pub fn read_first<T: FromRow>(&mut self) -> Result<T> {
        self.read_first_or_default()?.ok_or(KataError::NotFound)
    }

    /// First row of the next result set, or `None`.
    pub fn read_first_or_default<T: FromRow>(&mut self) -> Result<Option<T>> {
        self.next_set()?
            .into_iter()
            .next()
            .map(T::from_row)
            .transpose()
    }

    /// Result sets not yet read.
    pub fn remaining(&self) -> usize {
        self.sets.len()
    }

    pub fn is_consumed(&self) -> bool {
        self.sets.is_empty()
    }
}
