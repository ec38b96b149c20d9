//! Shared, atomically swappable vocabulary handle.
//!
//! [`SharedVocabulary`] owns the current [`VocabularySnapshot`] behind a
//! read-write lock. Readers pin a snapshot with [`snapshot`](SharedVocabulary::snapshot)
//! and keep a consistent view for as long as they hold the `Arc`, while
//! [`rebuild`](SharedVocabulary::rebuild) and [`refresh`](SharedVocabulary::refresh)
//! prepare the next generation off-lock and swap it in.
//!
//! The handle is not itself a [`ConceptIndex`](omop_concept_search::ConceptIndex):
//! a search always runs against one pinned snapshot, so retrieval, resolution
//! and the cache key all see the same generation.
//!
//! # Example
//!
//! ```ignore
//! use omop_concept_index::SharedVocabulary;
//! use omop_concept_search::ConceptSearcher;
//!
//! let vocabulary = SharedVocabulary::build(concepts, relationships)?;
//!
//! // Pin one generation for the whole search.
//! let snapshot = vocabulary.snapshot();
//! let searcher = ConceptSearcher::new(&*snapshot, &*snapshot);
//! let result = searcher.search("lisinopril", "Drug")?;
//!
//! // Meanwhile, on another thread:
//! vocabulary.refresh(changed_concepts, &retired_ids)?;
//! ```

use std::sync::Arc;

use omop_vocab::{Concept, ConceptId, Relationship};
use parking_lot::{Mutex, RwLock};
use tracing::info;

use crate::error::IndexResult;
use crate::snapshot::VocabularySnapshot;
use crate::stats::SnapshotStats;

/// Thread-safe owner of the current vocabulary snapshot.
///
/// Writers are serialized; each successful rebuild or refresh installs a
/// snapshot with the next generation number. A failed rebuild leaves the
/// current snapshot in place.
#[derive(Debug)]
pub struct SharedVocabulary {
    current: RwLock<Arc<VocabularySnapshot>>,
    writer: Mutex<()>,
}

impl SharedVocabulary {
    /// Wraps an existing snapshot as generation 1.
    pub fn new(snapshot: VocabularySnapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot.with_generation(1))),
            writer: Mutex::new(()),
        }
    }

    /// Builds the first generation from source rows.
    pub fn build<C, R>(concepts: C, relationships: R) -> IndexResult<Self>
    where
        C: IntoIterator<Item = Concept>,
        R: IntoIterator<Item = Relationship>,
    {
        let snapshot = VocabularySnapshot::build(concepts, relationships)?;
        let shared = Self::new(snapshot);
        shared.log_installed("build");
        Ok(shared)
    }

    /// Pins the current snapshot.
    pub fn snapshot(&self) -> Arc<VocabularySnapshot> {
        self.current.read().clone()
    }

    /// Generation of the current snapshot.
    pub fn generation(&self) -> u64 {
        self.current.read().generation()
    }

    /// Statistics of the current snapshot.
    pub fn stats(&self) -> SnapshotStats {
        self.current.read().stats().clone()
    }

    /// Replaces the whole vocabulary and returns the new generation.
    pub fn rebuild<C, R>(&self, concepts: C, relationships: R) -> IndexResult<u64>
    where
        C: IntoIterator<Item = Concept>,
        R: IntoIterator<Item = Relationship>,
    {
        let _writer = self.writer.lock();
        let generation = self.generation() + 1;
        let snapshot =
            VocabularySnapshot::build(concepts, relationships)?.with_generation(generation);
        self.install(snapshot);
        self.log_installed("rebuild");
        Ok(generation)
    }

    /// Applies changed and retired concepts and returns the new generation.
    ///
    /// Relationships are carried over from the current snapshot unchanged.
    pub fn refresh<I>(&self, upserts: I, removals: &[ConceptId]) -> IndexResult<u64>
    where
        I: IntoIterator<Item = Concept>,
    {
        let _writer = self.writer.lock();
        let base = self.snapshot();
        let generation = base.generation() + 1;
        let snapshot = base
            .refreshed(upserts, removals)?
            .with_generation(generation);
        self.install(snapshot);
        self.log_installed("refresh");
        Ok(generation)
    }

    fn install(&self, snapshot: VocabularySnapshot) {
        *self.current.write() = Arc::new(snapshot);
    }

    fn log_installed(&self, reason: &str) {
        let stats = self.stats();
        info!(
            reason,
            generation = stats.generation,
            concepts = stats.concept_count,
            entries = stats.entry_count(),
            build_ms = stats.build_time_ms,
            "vocabulary snapshot installed"
        );
    }
}

impl Default for SharedVocabulary {
    fn default() -> Self {
        Self::new(VocabularySnapshot::empty())
    }
}

impl From<VocabularySnapshot> for SharedVocabulary {
    fn from(snapshot: VocabularySnapshot) -> Self {
        Self::new(snapshot)
    }
}
