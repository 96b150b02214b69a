//! puffin scopes for materialization and include resolution.
//!
//! Enabled by the `profiling` feature; checked in the calling crate like the
//! tracing macros.

/// Open a puffin scope for the rest of the enclosing block.
#[macro_export]
macro_rules! kata_profile_scope {
    ($category:literal, $operation:literal) => {
        #[cfg(feature = "profiling")]
        $crate::__private::puffin::profile_scope!($category, $operation);
    };
}
