//! Pagination and chunked iteration built on count + bounded fetch.

use core::marker::PhantomData;
use core::ops::ControlFlow;

use kata_core::query::Query;
use kata_core::{Compiler, Connection, FromRow, KataError, Loaded, Record, Result};

use crate::QueryFactory;

// =============================================================================
// Page
// =============================================================================

/// One page of a query's results.
///
/// Holds the original query, not the page-limited one, so [`next`](Self::next)
/// always pages over the base filters.
pub struct Page<'db, T, C, P> {
    db: &'db QueryFactory<C, P>,
    query: Query,
    page: u32,
    per_page: u32,
    count: u64,
    list: Vec<Loaded<T>>,
}

impl<T: core::fmt::Debug, C, P> core::fmt::Debug for Page<'_, T, C, P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Page")
            .field("page", &self.page)
            .field("per_page", &self.per_page)
            .field("count", &self.count)
            .field("list", &self.list)
            .finish_non_exhaustive()
    }
}

impl<'db, T, C, P> Page<'db, T, C, P> {
    pub fn query(&self) -> &Query {
        &self.query
    }

    /// 1-based page number.
    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Total rows matched by the query across all pages.
    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn list(&self) -> &[Loaded<T>] {
        &self.list
    }

    pub fn into_list(self) -> Vec<Loaded<T>> {
        self.list
    }

    pub fn total_pages(&self) -> u64 {
        self.count.div_ceil(u64::from(self.per_page))
    }

    pub fn is_first(&self) -> bool {
        self.page == 1
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        u64::from(self.page) * u64::from(self.per_page) < self.count
    }
}

impl<'db, T, C, P> Page<'db, T, C, P>
where
    T: FromRow + Record,
    C: Connection,
    P: Compiler,
{
    /// Fetches the following page against the original query.
    pub fn next(&self) -> Result<Page<'db, T, C, P>> {
        self.db.paginate(&self.query, self.page.saturating_add(1), self.per_page)
    }

    /// Fetches the preceding page; page 1 is its own predecessor.
    pub fn previous(&self) -> Result<Page<'db, T, C, P>> {
        self.db.paginate(&self.query, self.page.saturating_sub(1).max(1), self.per_page)
    }
}

// =============================================================================
// Pages: pull cursor
// =============================================================================

/// Iterator over successive pages; ends after the last page or on an error.
pub struct Pages<'db, T, C, P> {
    db: &'db QueryFactory<C, P>,
    query: Query,
    per_page: u32,
    next_page: Option<u32>,
    _marker: PhantomData<fn() -> T>,
}

impl<'db, T, C, P> Iterator for Pages<'db, T, C, P>
where
    T: FromRow + Record,
    C: Connection,
    P: Compiler,
{
    type Item = Result<Page<'db, T, C, P>>;

    fn next(&mut self) -> Option<Self::Item> {
        let page = self.next_page.take()?;
        let result = self.db.paginate::<T>(&self.query, page, self.per_page);
        if let Ok(current) = &result {
            if current.has_next() {
                self.next_page = page.checked_add(1);
            }
        }
        Some(result)
    }
}

// =============================================================================
// Chunk consumers
// =============================================================================

/// What a chunk consumer returns: whether to go on to the next chunk.
///
/// `bool` (`false` stops), `()` (never stops) and `ControlFlow<()>`.
pub trait ChunkFlow {
    fn should_continue(self) -> bool;
}

impl ChunkFlow for bool {
    fn should_continue(self) -> bool {
        self
    }
}

impl ChunkFlow for () {
    fn should_continue(self) -> bool {
        true
    }
}

impl ChunkFlow for ControlFlow<()> {
    fn should_continue(self) -> bool {
        self.is_continue()
    }
}

// =============================================================================
// Facade operations
// =============================================================================

impl<C: Connection, P: Compiler> QueryFactory<C, P> {
    /// Fetches page `page` (1-based) of `per_page` rows.
    ///
    /// Zero for either argument is [`KataError::InvalidArgument`] and runs
    /// nothing. A count of zero skips the fetch.
    pub fn paginate<T: FromRow + Record>(
        &self,
        query: &Query,
        page: u32,
        per_page: u32,
    ) -> Result<Page<'_, T, C, P>> {
        if page < 1 {
            return Err(KataError::invalid_argument(
                "page",
                "page should be greater than or equal to 1",
            ));
        }
        if per_page < 1 {
            return Err(KataError::invalid_argument(
                "per_page",
                "per_page should be greater than or equal to 1",
            ));
        }

        let count: u64 = self.count(query)?;
        let list = if count > 0 {
            self.get(&query.clone().for_page(page, per_page))?
        } else {
            Vec::new()
        };
        kata_core::kata_trace_page!(page, per_page, count);

        Ok(Page {
            db: self,
            query: query.clone(),
            page,
            per_page,
            count,
            list,
        })
    }

    /// Page 1 using the configured default page size.
    pub fn first_page<T: FromRow + Record>(&self, query: &Query) -> Result<Page<'_, T, C, P>> {
        self.paginate(query, 1, self.config().default_per_page)
    }

    /// Lazily pages through `query`, `per_page` rows at a time.
    pub fn pages<T: FromRow + Record>(&self, query: &Query, per_page: u32) -> Pages<'_, T, C, P> {
        Pages {
            db: self,
            query: query.clone(),
            per_page,
            next_page: Some(1),
            _marker: PhantomData,
        }
    }

    /// Feeds `query`'s rows to `consumer` in chunks of `size`, with the
    /// 1-based chunk number.
    ///
    /// The first chunk is always fetched. No further chunk is fetched once
    /// `consumer` asks to stop.
    ///
    /// ```rust,ignore
    /// db.chunk::<User, _, _>(&query, 100, |users, page| {
    ///     export(users);
    ///     page < 10
    /// })?;
    /// ```
    pub fn chunk<T, F, R>(&self, query: &Query, size: u32, mut consumer: F) -> Result<()>
    where
        T: FromRow + Record,
        F: FnMut(&[Loaded<T>], u32) -> R,
        R: ChunkFlow,
    {
        let mut current = self.paginate::<T>(query, 1, size)?;
        if !consumer(current.list(), current.page()).should_continue() {
            return Ok(());
        }
        while current.has_next() {
            current = current.next()?;
            if !consumer(current.list(), current.page()).should_continue() {
                return Ok(());
            }
        }
        Ok(())
    }
}
