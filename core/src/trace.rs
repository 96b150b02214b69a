//! Tracing macros for query, include and pagination observability.
//!
//! Enable the `tracing` feature to emit events through the `tracing` crate.
//! With the feature off the macros expand to nothing, so call sites carry no
//! `#[cfg]` of their own. The feature is checked in the calling crate; the
//! facade forwards its own `tracing` feature to `kata-core`.

/// Emit a debug-level event with the SQL text and binding count.
///
/// ```ignore
/// kata_trace_query!(&compiled.sql, compiled.bindings.len());
/// ```
#[macro_export]
macro_rules! kata_trace_query {
    ($sql:expr, $bindings:expr) => {
        #[cfg(feature = "tracing")]
        $crate::__private::tracing::debug!(sql = %$sql, bindings = $bindings, "kata.query");
    };
}

/// Emit a debug-level event after an include was resolved.
///
/// ```ignore
/// kata_trace_include!(&include.name, parents.len(), children.len());
/// ```
#[macro_export]
macro_rules! kata_trace_include {
    ($name:expr, $parents:expr, $children:expr) => {
        #[cfg(feature = "tracing")]
        $crate::__private::tracing::debug!(
            include = %$name,
            parents = $parents,
            children = $children,
            "kata.include"
        );
    };
}

/// Emit a debug-level event for a fetched page.
///
/// ```ignore
/// kata_trace_page!(page, per_page, count);
/// ```
#[macro_export]
macro_rules! kata_trace_page {
    ($page:expr, $per_page:expr, $count:expr) => {
        #[cfg(feature = "tracing")]
        $crate::__private::tracing::debug!(
            page = $page,
            per_page = $per_page,
            count = $count,
            "kata.page"
        );
    };
}
