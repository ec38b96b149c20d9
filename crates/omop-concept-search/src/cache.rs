//! Search result caching.
//!
//! Provides an LRU cache with TTL expiration for ranked search rows.
//! Thread-safe using `Mutex` for LRU operations.
//!
//! Entries are keyed on the index generation. An index that never reports a
//! generation (the [`ConceptIndex::generation`](crate::ConceptIndex::generation)
//! default of `0`) keeps its entries until the TTL runs out or the cache is
//! cleared.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use lru::LruCache;

use crate::config::CacheConfig;
use crate::result::SearchRow;

/// Cache key: index generation, domain and trimmed query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    generation: u64,
    domain: String,
    query: String,
}

impl CacheKey {
    /// Builds a key. The query should already be trimmed.
    ///
    /// The query is kept verbatim: case and inner whitespace both change
    /// matching and ranking.
    pub fn new(generation: u64, domain: &str, query: &str) -> Self {
        Self {
            generation,
            domain: domain.to_string(),
            query: query.to_string(),
        }
    }

    /// Index generation the rows were computed against.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// A cached result with expiration tracking.
#[derive(Debug, Clone)]
struct CacheEntry {
    rows: Arc<Vec<SearchRow>>,
    created_at: Instant,
}

impl CacheEntry {
    fn new(rows: Arc<Vec<SearchRow>>) -> Self {
        Self {
            rows,
            created_at: Instant::now(),
        }
    }

    fn is_expired(&self, ttl: Duration) -> bool {
        self.created_at.elapsed() > ttl
    }
}

/// Thread-safe LRU cache with TTL expiration for search results.
///
/// # Features
///
/// - **LRU Eviction**: When the cache is full, the least recently used entry is evicted.
/// - **TTL Expiration**: Entries automatically expire after the configured time-to-live.
/// - **Generation keyed**: Keys carry the index generation, so results computed
///   against an older index are never served after a rebuild. The first entry
///   stored for a newer generation purges entries from older ones.
pub struct SearchCache {
    inner: Mutex<LruCache<CacheKey, CacheEntry>>,
    ttl: Duration,
    newest_generation: AtomicU64,
}

impl SearchCache {
    /// Creates a new cache with the given configuration.
    pub fn new(config: CacheConfig) -> Self {
        Self::with_capacity(config.max_entries, config.ttl)
    }

    /// Creates a cache with custom capacity and TTL.
    pub fn with_capacity(max_entries: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
            ttl,
            newest_generation: AtomicU64::new(0),
        }
    }

    /// Gets cached rows by key.
    ///
    /// Returns `None` if the key is missing or the entry has expired. On a hit
    /// the entry is promoted to most-recently-used.
    pub fn get(&self, key: &CacheKey) -> Option<Arc<Vec<SearchRow>>> {
        let mut cache = self.inner.lock().ok()?;

        if let Some(entry) = cache.get(key) {
            if entry.is_expired(self.ttl) {
                cache.pop(key);
                return None;
            }
            return Some(Arc::clone(&entry.rows));
        }

        None
    }

    /// Stores rows in the cache, evicting the least recently used entry if full.
    ///
    /// A key from a generation newer than any seen so far first purges the
    /// older generations.
    pub fn set(&self, key: CacheKey, rows: Arc<Vec<SearchRow>>) {
        let previous = self
            .newest_generation
            .fetch_max(key.generation, Ordering::AcqRel);
        if key.generation > previous {
            self.purge(key.generation);
        }
        if let Ok(mut cache) = self.inner.lock() {
            cache.put(key, CacheEntry::new(rows));
        }
    }

    /// Checks if a key exists in the cache (without affecting LRU order).
    ///
    /// Note: This doesn't check for expiration.
    pub fn contains(&self, key: &CacheKey) -> bool {
        match self.inner.lock() {
            Ok(cache) => cache.contains(key),
            _ => false,
        }
    }

    /// Returns the number of entries, possibly including expired ones.
    pub fn len(&self) -> usize {
        match self.inner.lock() {
            Ok(cache) => cache.len(),
            _ => 0,
        }
    }

    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clears all entries.
    pub fn clear(&self) {
        if let Ok(mut cache) = self.inner.lock() {
            cache.clear();
        }
    }

    /// Removes expired entries and entries from generations other than `current`.
    ///
    /// Called by [`set`](Self::set) when a newer generation shows up.
    pub fn purge(&self, current_generation: u64) {
        if let Ok(mut cache) = self.inner.lock() {
            let ttl = self.ttl;
            let stale: Vec<CacheKey> = cache
                .iter()
                .filter(|(key, entry)| {
                    key.generation != current_generation || entry.is_expired(ttl)
                })
                .map(|(key, _)| key.clone())
                .collect();
            for key in stale {
                cache.pop(&key);
            }
        }
    }
}
