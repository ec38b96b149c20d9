//! Immutable vocabulary snapshot.
//!
//! A [`VocabularySnapshot`] holds one generation of the vocabulary: the
//! concepts, their search entries partitioned by domain with trigram
//! postings, and relationship edges keyed by kind. It implements both
//! [`ConceptIndex`] and [`RelationshipStore`], so a pinned snapshot can be
//! handed straight to a `ConceptSearcher`.
//!
//! # Example
//!
//! ```ignore
//! use omop_concept_index::VocabularySnapshot;
//! use omop_concept_search::ConceptSearcher;
//!
//! let snapshot = VocabularySnapshot::build(concepts, relationships)?;
//! println!("{}", snapshot.stats());
//!
//! let searcher = ConceptSearcher::new(&snapshot, &snapshot);
//! let result = searcher.search("lisinopril", "Drug")?;
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use omop_concept_search::{
    ConceptIndex, MappedTarget, RelationshipStore, RetrievalError, VocabularyFilter,
};
use omop_vocab::{Concept, ConceptId, Relationship, RelationshipKind, SearchEntry};
use tracing::debug;

use crate::error::{IndexError, IndexResult};
use crate::stats::SnapshotStats;
use crate::trigram::TrigramPostings;

/// Source concept → sorted, deduplicated target concepts.
type EdgeMap = HashMap<ConceptId, Vec<ConceptId>>;

/// Search entries of one domain, ordered by concept id, with their postings.
#[derive(Debug, Clone, Default)]
pub struct DomainPartition {
    entries: Vec<SearchEntry>,
    postings: TrigramPostings,
}

impl DomainPartition {
    fn build(domain: &str, mut entries: Vec<SearchEntry>) -> IndexResult<Self> {
        if u32::try_from(entries.len()).is_err() {
            return Err(IndexError::PartitionTooLarge {
                domain: domain.to_string(),
                entries: entries.len(),
            });
        }
        entries.sort_by_key(|e| e.concept_id);
        let postings =
            TrigramPostings::build(entries.iter().map(|e| e.search_text_upper.as_str()));
        Ok(Self { entries, postings })
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the partition holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in concept id order.
    pub fn entries(&self) -> &[SearchEntry] {
        &self.entries
    }

    fn matching(&self, upper_pattern: &str, filter: &VocabularyFilter) -> Vec<SearchEntry> {
        match self.postings.candidates(upper_pattern) {
            Some(positions) => positions
                .iter()
                .filter_map(|position| self.entries.get(position as usize))
                .filter(|e| e.contains(upper_pattern) && filter.admits(e))
                .cloned()
                .collect(),
            None => self.scan(upper_pattern, filter),
        }
    }

    fn scan(&self, upper_pattern: &str, filter: &VocabularyFilter) -> Vec<SearchEntry> {
        self.entries
            .iter()
            .filter(|e| e.contains(upper_pattern) && filter.admits(e))
            .cloned()
            .collect()
    }
}

/// One generation of the vocabulary, indexed for search.
///
/// Snapshots never change after construction. Refreshing produces a new
/// snapshot that shares untouched partitions and the edge index with its
/// predecessor.
#[derive(Debug, Clone)]
pub struct VocabularySnapshot {
    generation: u64,
    concepts: HashMap<ConceptId, Concept>,
    partitions: HashMap<String, Arc<DomainPartition>>,
    edges: Arc<HashMap<RelationshipKind, EdgeMap>>,
    relationships: Arc<Vec<Relationship>>,
    stats: SnapshotStats,
}

impl VocabularySnapshot {
    /// Builds a snapshot from source rows.
    ///
    /// Every concept is projected into a [`SearchEntry`] in its domain's
    /// partition. Relationships are indexed by kind; edges pointing at
    /// concepts absent from `concepts` are kept but never resolved.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::DuplicateConcept`] if a concept id repeats.
    pub fn build<C, R>(concepts: C, relationships: R) -> IndexResult<Self>
    where
        C: IntoIterator<Item = Concept>,
        R: IntoIterator<Item = Relationship>,
    {
        let start = Instant::now();

        let mut by_id = HashMap::new();
        for concept in concepts {
            let id = concept.id;
            if by_id.insert(id, concept).is_some() {
                return Err(IndexError::DuplicateConcept(id));
            }
        }

        let mut partitions = HashMap::new();
        for (domain, entries) in group_by_domain(by_id.values()) {
            let partition = DomainPartition::build(&domain, entries)?;
            partitions.insert(domain, Arc::new(partition));
        }

        let relationships: Vec<Relationship> = relationships.into_iter().collect();
        let edges = index_edges(&relationships);

        Ok(Self::assemble(
            0,
            by_id,
            partitions,
            Arc::new(edges),
            Arc::new(relationships),
            start,
        ))
    }

    /// An empty snapshot.
    pub fn empty() -> Self {
        Self::assemble(
            0,
            HashMap::new(),
            HashMap::new(),
            Arc::default(),
            Arc::default(),
            Instant::now(),
        )
    }

    /// Produces the next snapshot with `upserts` applied and `removals` dropped.
    ///
    /// Only partitions of domains touched by the change are rebuilt; the
    /// others and the edge index are shared with `self`. A concept that moves
    /// domain touches both its old and new partition.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::DuplicateConcept`] if `upserts` repeats an id.
    pub fn refreshed<I>(&self, upserts: I, removals: &[ConceptId]) -> IndexResult<Self>
    where
        I: IntoIterator<Item = Concept>,
    {
        let start = Instant::now();
        let mut concepts = self.concepts.clone();
        let mut touched: HashSet<String> = HashSet::new();

        for id in removals {
            if let Some(old) = concepts.remove(id) {
                touched.insert(old.domain);
            }
        }

        let mut seen = HashSet::new();
        for concept in upserts {
            if !seen.insert(concept.id) {
                return Err(IndexError::DuplicateConcept(concept.id));
            }
            touched.insert(concept.domain.clone());
            if let Some(old) = concepts.insert(concept.id, concept) {
                touched.insert(old.domain);
            }
        }

        let mut partitions = self.partitions.clone();
        let mut grouped = group_by_domain(
            concepts
                .values()
                .filter(|concept| touched.contains(&concept.domain)),
        );
        for domain in &touched {
            match grouped.remove(domain) {
                Some(entries) => {
                    let partition = DomainPartition::build(domain, entries)?;
                    partitions.insert(domain.clone(), Arc::new(partition));
                }
                None => {
                    partitions.remove(domain);
                }
            }
        }

        debug!(
            touched = touched.len(),
            removals = removals.len(),
            "refreshed snapshot partitions"
        );

        Ok(Self::assemble(
            self.generation,
            concepts,
            partitions,
            Arc::clone(&self.edges),
            Arc::clone(&self.relationships),
            start,
        ))
    }

    fn assemble(
        generation: u64,
        concepts: HashMap<ConceptId, Concept>,
        partitions: HashMap<String, Arc<DomainPartition>>,
        edges: Arc<HashMap<RelationshipKind, EdgeMap>>,
        relationships: Arc<Vec<Relationship>>,
        start: Instant,
    ) -> Self {
        let mut stats = SnapshotStats {
            generation,
            concept_count: concepts.len(),
            ..SnapshotStats::default()
        };

        for (domain, partition) in &partitions {
            stats
                .entries_per_domain
                .insert(domain.clone(), partition.len());
            stats.trigram_count += partition.postings.len();
        }

        for (kind, by_source) in edges.iter() {
            let count: usize = by_source.values().map(Vec::len).sum();
            if *kind == RelationshipKind::MapsTo {
                stats.maps_to_edges += count;
            } else {
                stats.other_edges += count;
            }
            stats.dangling_edges += by_source
                .values()
                .flatten()
                .filter(|target| !concepts.contains_key(target))
                .count();
        }

        stats.build_time_ms = start.elapsed().as_millis() as u64;

        Self {
            generation,
            concepts,
            partitions,
            edges,
            relationships,
            stats,
        }
    }

    pub(crate) fn with_generation(mut self, generation: u64) -> Self {
        self.generation = generation;
        self.stats.generation = generation;
        self
    }

    /// Generation number assigned by the owning [`SharedVocabulary`](crate::SharedVocabulary).
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Build statistics.
    pub fn stats(&self) -> &SnapshotStats {
        &self.stats
    }

    /// Number of concepts.
    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    /// Returns true if the snapshot holds no concepts.
    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }

    /// Looks up a concept by id.
    pub fn concept(&self, id: ConceptId) -> Option<&Concept> {
        self.concepts.get(&id)
    }

    /// All concepts, in no particular order.
    pub fn concepts(&self) -> impl Iterator<Item = &Concept> {
        self.concepts.values()
    }

    /// Source relationship rows as given to [`build`](Self::build).
    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    /// The partition for `domain`, if any concept carries that domain.
    pub fn partition(&self, domain: &str) -> Option<&DomainPartition> {
        self.partitions.get(domain).map(Arc::as_ref)
    }

    /// Domains with at least one concept.
    pub fn domains(&self) -> impl Iterator<Item = &str> {
        self.partitions.keys().map(String::as_str)
    }

    /// Raw target ids of `kind` edges from `source`, including dangling ones.
    pub fn targets(&self, source: ConceptId, kind: &RelationshipKind) -> &[ConceptId] {
        self.edges
            .get(kind)
            .and_then(|by_source| by_source.get(&source))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Matches `upper_pattern` by scanning the partition without postings.
    ///
    /// Returns the same entries as [`ConceptIndex::query`]; kept for
    /// benchmarking and cross-checking the trigram path.
    pub fn scan(
        &self,
        domain: &str,
        upper_pattern: &str,
        filter: &VocabularyFilter,
    ) -> Vec<SearchEntry> {
        if filter.is_empty() {
            return Vec::new();
        }
        self.partitions
            .get(domain)
            .map(|partition| partition.scan(upper_pattern, filter))
            .unwrap_or_default()
    }

    /// Returns true if two snapshots share the partition for `domain`.
    pub fn shares_partition(&self, other: &Self, domain: &str) -> bool {
        match (self.partitions.get(domain), other.partitions.get(domain)) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Default for VocabularySnapshot {
    fn default() -> Self {
        Self::empty()
    }
}

impl ConceptIndex for VocabularySnapshot {
    fn query(
        &self,
        domain: &str,
        upper_pattern: &str,
        filter: &VocabularyFilter,
    ) -> Result<Vec<SearchEntry>, RetrievalError> {
        if filter.is_empty() {
            return Ok(Vec::new());
        }
        let entries = match self.partitions.get(domain) {
            Some(partition) => partition.matching(upper_pattern, filter),
            None => Vec::new(),
        };
        debug!(
            domain,
            pattern = upper_pattern,
            matched = entries.len(),
            generation = self.generation,
            "snapshot query"
        );
        Ok(entries)
    }

    fn generation(&self) -> u64 {
        self.generation
    }
}

impl RelationshipStore for VocabularySnapshot {
    fn lookup(
        &self,
        source: ConceptId,
        kind: &RelationshipKind,
    ) -> Result<Vec<MappedTarget>, RetrievalError> {
        Ok(self
            .targets(source, kind)
            .iter()
            .filter_map(|target| self.concepts.get(target))
            .map(MappedTarget::from)
            .collect())
    }
}

fn group_by_domain<'a, I>(concepts: I) -> HashMap<String, Vec<SearchEntry>>
where
    I: Iterator<Item = &'a Concept>,
{
    let mut grouped: HashMap<String, Vec<SearchEntry>> = HashMap::new();
    for concept in concepts {
        grouped
            .entry(concept.domain.clone())
            .or_default()
            .push(SearchEntry::from_concept(concept));
    }
    grouped
}

fn index_edges(relationships: &[Relationship]) -> HashMap<RelationshipKind, EdgeMap> {
    let mut edges: HashMap<RelationshipKind, EdgeMap> = HashMap::new();
    for rel in relationships {
        edges
            .entry(rel.kind.clone())
            .or_default()
            .entry(rel.source_concept_id)
            .or_default()
            .push(rel.target_concept_id);
    }
    for by_source in edges.values_mut() {
        for targets in by_source.values_mut() {
            targets.sort_unstable();
            targets.dedup();
        }
    }
    edges
}
