//! Concept searcher implementation.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use omop_vocab::{ConceptId, RelationshipKind, SearchEntry};
use tracing::{debug, debug_span, warn};

use crate::cache::{CacheKey, SearchCache};
use crate::classifier::MatchSignals;
use crate::config::SearchConfig;
use crate::error::{SearchError, SearchOutcome};
use crate::ranker::{rank, RankKey};
use crate::resolver::{assemble_row, resolve_all, resolve_standard, StandardTarget};
use crate::result::{SearchResult, SearchRow, SearchStats};
use crate::retrieval::{retrieve_candidates, ValidatedQuery};
use crate::traits::{ConceptIndex, RelationshipStore};

/// Number of candidates per relationship lookup when resolving in parallel.
#[cfg(feature = "parallel")]
const PARALLEL_CHUNK: usize = 256;

/// Main concept search engine.
///
/// The searcher runs a query against any [`ConceptIndex`] and resolves the
/// matches through any [`RelationshipStore`]. It holds no mutable state apart
/// from the optional result cache, so one searcher can serve concurrent
/// requests from many threads.
///
/// # Example
///
/// ```ignore
/// use omop_concept_search::ConceptSearcher;
///
/// // Assumes `vocab` implements both ConceptIndex and RelationshipStore
/// let searcher = ConceptSearcher::new(&vocab, &vocab);
///
/// let result = searcher.search("lisinopril", "Drug")?;
/// for row in &result {
///     println!("{} -> {} ({})", row.searched_term, row.standard_name, row.standard_vocabulary);
/// }
/// ```
pub struct ConceptSearcher<'a> {
    /// Candidate source.
    index: &'a dyn ConceptIndex,
    /// Maps-to lookups.
    relationships: &'a dyn RelationshipStore,
    /// Searcher configuration.
    config: SearchConfig,
    /// Result cache (optional).
    cache: Option<Arc<SearchCache>>,
}

impl<'a> ConceptSearcher<'a> {
    /// Creates a searcher with default configuration.
    pub fn new(index: &'a dyn ConceptIndex, relationships: &'a dyn RelationshipStore) -> Self {
        Self::with_config(index, relationships, SearchConfig::default())
    }

    /// Creates a searcher with custom configuration.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let config = SearchConfig::builder()
    ///     .with_cache(CacheConfig::default())
    ///     .with_timeout(Duration::from_secs(2))
    ///     .build();
    ///
    /// let searcher = ConceptSearcher::with_config(&vocab, &vocab, config);
    /// ```
    pub fn with_config(
        index: &'a dyn ConceptIndex,
        relationships: &'a dyn RelationshipStore,
        config: SearchConfig,
    ) -> Self {
        let cache = config
            .cache
            .as_ref()
            .map(|c| Arc::new(SearchCache::new(c.clone())));
        Self {
            index,
            relationships,
            config,
            cache,
        }
    }

    /// Creates a searcher that stores results in an existing cache.
    ///
    /// Searchers built over successive pinned snapshots can share one cache;
    /// keys carry the snapshot generation. `config.cache` is ignored.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let cache = Arc::new(SearchCache::new(CacheConfig::default()));
    ///
    /// let snapshot = vocabulary.snapshot();
    /// let searcher =
    ///     ConceptSearcher::with_shared_cache(&*snapshot, &*snapshot, config, Arc::clone(&cache));
    /// ```
    pub fn with_shared_cache(
        index: &'a dyn ConceptIndex,
        relationships: &'a dyn RelationshipStore,
        config: SearchConfig,
        cache: Arc<SearchCache>,
    ) -> Self {
        Self {
            index,
            relationships,
            config,
            cache: Some(cache),
        }
    }

    /// Returns a reference to the cache if enabled.
    pub fn cache(&self) -> Option<&SearchCache> {
        self.cache.as_deref()
    }

    /// Returns a reference to the searcher configuration.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Searches `domain` for concepts whose id, code or name contains `query`.
    ///
    /// The configured timeout, if any, applies from the start of the call.
    ///
    /// # Returns
    ///
    /// * `Ok(SearchResult)` - Ranked rows (possibly empty) and stats
    /// * `Err(SearchError::Validation)` - Query shorter than two characters or empty domain
    /// * `Err(SearchError::Retrieval)` - A collaborator failed
    /// * `Err(SearchError::DeadlineExceeded)` - The timeout passed before assembly
    pub fn search(&self, query: &str, domain: &str) -> SearchOutcome<SearchResult> {
        let deadline = self.config.timeout.map(|t| Instant::now() + t);
        self.run(query, domain, deadline)
    }

    /// Like [`search`](Self::search) with an explicit deadline.
    ///
    /// The earlier of `deadline` and the configured timeout wins.
    pub fn search_with_deadline(
        &self,
        query: &str,
        domain: &str,
        deadline: Instant,
    ) -> SearchOutcome<SearchResult> {
        let configured = self.config.timeout.map(|t| Instant::now() + t);
        let deadline = configured.map_or(deadline, |c| c.min(deadline));
        self.run(query, domain, Some(deadline))
    }

    /// Resolves a single concept to its standard target.
    ///
    /// Returns `None` when the concept has no maps-to edge to a standard
    /// concept.
    pub fn standard_target(&self, concept_id: ConceptId) -> SearchOutcome<Option<StandardTarget>> {
        let targets = self
            .relationships
            .lookup(concept_id, &RelationshipKind::MapsTo)?;
        Ok(resolve_standard(&targets))
    }

    fn run(
        &self,
        query: &str,
        domain: &str,
        deadline: Option<Instant>,
    ) -> SearchOutcome<SearchResult> {
        let start = Instant::now();
        let span = debug_span!("concept_search", domain = %domain);
        let _guard = span.enter();

        let request = ValidatedQuery::new(query, domain)?;
        check_deadline(deadline, start)?;

        let cache_key = self
            .cache
            .as_ref()
            .map(|_| CacheKey::new(self.index.generation(), &request.domain, &request.query));
        if let (Some(cache), Some(key)) = (self.cache.as_ref(), cache_key.as_ref()) {
            if let Some(rows) = cache.get(key) {
                debug!(rows = rows.len(), "served from cache");
                let stats = SearchStats::cached(start.elapsed());
                return Ok(SearchResult::new(rows.as_ref().clone(), stats));
            }
        }

        let candidates = retrieve_candidates(self.index, &request)?;
        check_deadline(deadline, start)?;

        let targets = self.resolve(&candidates)?;
        check_deadline(deadline, start)?;

        let (rows, truncated) = self.assemble(&request, &candidates, &targets);

        if let (Some(cache), Some(key)) = (self.cache.as_ref(), cache_key) {
            cache.set(key, Arc::new(rows.clone()));
        }

        let stats = SearchStats {
            duration: start.elapsed(),
            candidates: candidates.len(),
            mapped: targets.len(),
            truncated,
            cache_hit: false,
        };
        debug!(
            candidates = stats.candidates,
            mapped = stats.mapped,
            rows = rows.len(),
            truncated,
            "search complete"
        );
        Ok(SearchResult::new(rows, stats))
    }

    fn resolve(
        &self,
        candidates: &[SearchEntry],
    ) -> SearchOutcome<HashMap<ConceptId, StandardTarget>> {
        if candidates.is_empty() {
            return Ok(HashMap::new());
        }

        #[cfg(feature = "parallel")]
        {
            if self.config.parallel {
                return Ok(crate::resolver::resolve_all_parallel(
                    self.relationships,
                    candidates,
                    PARALLEL_CHUNK,
                )?);
            }
        }

        Ok(resolve_all(self.relationships, candidates)?)
    }

    fn assemble(
        &self,
        request: &ValidatedQuery,
        candidates: &[SearchEntry],
        targets: &HashMap<ConceptId, StandardTarget>,
    ) -> (Vec<SearchRow>, bool) {
        let keyed = candidates
            .iter()
            .map(|candidate| {
                let target = targets.get(&candidate.concept_id);
                let signals = MatchSignals::classify(&request.query, candidate);
                (RankKey::new(candidate, &signals, target), (candidate, target))
            })
            .collect();

        let (ranked, truncated) = rank(keyed, self.config.max_results);
        let rows = ranked
            .into_iter()
            .map(|(candidate, target)| assemble_row(candidate, target))
            .collect();
        (rows, truncated)
    }
}

/// Fails with [`SearchError::DeadlineExceeded`] once `deadline` has passed.
fn check_deadline(deadline: Option<Instant>, start: Instant) -> SearchOutcome<()> {
    match deadline {
        Some(deadline) if Instant::now() >= deadline => {
            let elapsed = start.elapsed();
            warn!(?elapsed, "search deadline exceeded, discarding partial work");
            Err(SearchError::DeadlineExceeded(elapsed))
        }
        _ => Ok(()),
    }
}
