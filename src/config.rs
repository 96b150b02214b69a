//! Execution settings for a [`QueryFactory`](crate::QueryFactory).

use core::time::Duration;

use compact_str::CompactString;
use kata_core::STATEMENT_SEPARATOR;

/// Default command timeout for writes, scalars and batches.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(30);

/// Default page size when none is given.
pub const DEFAULT_PER_PAGE: u32 = 25;

/// Execution settings.
///
/// ```rust,ignore
/// let config = ExecutionConfig::default()
///     .with_query_timeout(Duration::from_secs(5))
///     .with_default_per_page(50);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ExecutionConfig {
    /// Command timeout passed to write, scalar and batched execution.
    /// Deserialized from seconds.
    #[cfg_attr(feature = "serde", serde(deserialize_with = "serde_secs::deserialize"))]
    pub query_timeout: Duration,
    pub default_per_page: u32,
    /// Separator between statements of a batched multi-query.
    pub batch_separator: CompactString,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            query_timeout: DEFAULT_QUERY_TIMEOUT,
            default_per_page: DEFAULT_PER_PAGE,
            batch_separator: CompactString::const_new(STATEMENT_SEPARATOR),
        }
    }
}

impl ExecutionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    pub fn with_default_per_page(mut self, per_page: u32) -> Self {
        self.default_per_page = per_page;
        self
    }

    pub fn with_batch_separator(mut self, separator: impl Into<CompactString>) -> Self {
        self.batch_separator = separator.into();
        self
    }
}

#[cfg(feature = "serde")]
mod serde_secs {
    use core::time::Duration;

    use serde::{Deserialize, Deserializer, de::Error};

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(D::Error::custom)
    }
}
