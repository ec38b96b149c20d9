//! Configuration types for the concept searcher.

use std::time::Duration;

use crate::ranker::MAX_RESULTS;

/// Configuration for the concept searcher.
///
/// # Example
///
/// ```rust
/// use omop_concept_search::{CacheConfig, SearchConfig};
/// use std::time::Duration;
///
/// let config = SearchConfig::builder()
///     .with_cache(CacheConfig::default())
///     .with_parallel(true)
///     .with_max_results(500)
///     .with_timeout(Duration::from_secs(2))
///     .build();
/// assert_eq!(config.max_results, 500);
/// ```
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Cache configuration (None = caching disabled).
    pub cache: Option<CacheConfig>,
    /// Resolve candidates in parallel (requires `parallel` feature).
    pub parallel: bool,
    /// Maximum number of rows returned. Never above [`MAX_RESULTS`].
    pub max_results: usize,
    /// Per-search deadline measured from the start of the call (None = no deadline).
    pub timeout: Option<Duration>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            cache: None,
            parallel: false,
            max_results: MAX_RESULTS,
            timeout: None,
        }
    }
}

impl SearchConfig {
    /// Creates a new builder for SearchConfig.
    pub fn builder() -> SearchConfigBuilder {
        SearchConfigBuilder::default()
    }
}

/// Builder for SearchConfig.
#[derive(Debug, Clone, Default)]
pub struct SearchConfigBuilder {
    cache: Option<CacheConfig>,
    parallel: bool,
    max_results: Option<usize>,
    timeout: Option<Duration>,
}

impl SearchConfigBuilder {
    /// Enables caching with the given configuration.
    ///
    /// See [`CacheConfig`] for how entries expire.
    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Enables or disables parallel resolution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the maximum number of rows. Values above [`MAX_RESULTS`] are capped.
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = Some(max_results);
        self
    }

    /// Sets the per-search timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the SearchConfig.
    pub fn build(self) -> SearchConfig {
        SearchConfig {
            cache: self.cache,
            parallel: self.parallel,
            max_results: self.max_results.unwrap_or(MAX_RESULTS).min(MAX_RESULTS),
            timeout: self.timeout,
        }
    }
}

/// Configuration for the result cache.
///
/// Cached rows are keyed on [`ConceptIndex::generation`](crate::ConceptIndex::generation).
/// An index that keeps the default generation of `0` never invalidates its
/// entries on change; they live until `ttl` passes or the cache is cleared.
/// Use a short `ttl` with such an index, or leave the cache off.
///
/// # Example
///
/// ```rust
/// use omop_concept_search::CacheConfig;
/// use std::time::Duration;
///
/// let cache = CacheConfig {
///     max_entries: 5_000,
///     ttl: Duration::from_secs(60),
/// };
/// ```
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of cached searches.
    pub max_entries: usize,
    /// Time-to-live for cached entries.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
            ttl: Duration::from_secs(300),
        }
    }
}
