//! Collaborator traits for concept search.
//!
//! This module defines the two read-only interfaces the searcher consumes:
//! [`ConceptIndex`] for candidate retrieval and [`RelationshipStore`] for
//! maps-to lookups.
//!
//! # Architecture Note
//!
//! This crate intentionally does NOT depend on any storage crate. The traits
//! are defined here; implementations live with the storage (the in-memory
//! reference implementation is `omop-concept-index`, a SQL-backed one would
//! live in the consuming service).
//!
//! # Example: Implementing the traits for a database pool
//!
//! ```ignore
//! use omop_concept_search::{ConceptIndex, MappedTarget, RelationshipStore, RetrievalError, VocabularyFilter};
//! use omop_vocab::{ConceptId, RelationshipKind, SearchEntry};
//!
//! impl ConceptIndex for VocabularyDb {
//!     fn query(
//!         &self,
//!         domain: &str,
//!         upper_pattern: &str,
//!         filter: &VocabularyFilter,
//!     ) -> Result<Vec<SearchEntry>, RetrievalError> {
//!         // SELECT ... FROM concept_search
//!         //  WHERE domain_id = $1 AND vocabulary_id = ANY($2)
//!         //    AND search_text_upper LIKE '%' || $3 || '%'
//!         self.select_entries(domain, filter.vocabularies, upper_pattern)
//!             .map(|rows| rows.into_iter().filter(|e| filter.admits(e)).collect())
//!             .map_err(|e| RetrievalError::Unavailable(e.to_string()))
//!     }
//! }
//!
//! impl RelationshipStore for VocabularyDb {
//!     fn lookup(
//!         &self,
//!         source: ConceptId,
//!         kind: &RelationshipKind,
//!     ) -> Result<Vec<MappedTarget>, RetrievalError> {
//!         self.select_targets(source, kind.as_str())
//!             .map_err(|e| RetrievalError::Unavailable(e.to_string()))
//!     }
//! }
//! ```

use std::collections::HashMap;

use omop_vocab::{Concept, ConceptId, RelationshipKind, SearchEntry, StandardFlag};

use crate::error::RetrievalError;
use crate::policy::VocabularyFilter;

/// Target concept of a relationship edge, as returned by a [`RelationshipStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MappedTarget {
    /// Target concept id.
    pub concept_id: ConceptId,
    /// Target concept name.
    pub name: String,
    /// Target concept code.
    pub code: String,
    /// Target vocabulary.
    pub vocabulary: String,
    /// Target concept class.
    pub class: String,
    /// Target standard designation.
    pub standard_flag: StandardFlag,
}

impl From<&Concept> for MappedTarget {
    fn from(concept: &Concept) -> Self {
        Self {
            concept_id: concept.id,
            name: concept.name.clone(),
            code: concept.code.clone(),
            vocabulary: concept.vocabulary.clone(),
            class: concept.class.clone(),
            standard_flag: concept.standard_flag,
        }
    }
}

/// Read-only, pre-normalized concept index.
///
/// Implementations must return every [`SearchEntry`] whose `domain` equals
/// `domain` exactly, that `filter` admits, and whose `search_text_upper`
/// contains `upper_pattern` anywhere. Order is irrelevant.
///
/// Implementations backing large vocabularies are expected to answer without
/// scanning every row, e.g. with a trigram index over `search_text_upper`
/// scoped by domain.
pub trait ConceptIndex: Send + Sync {
    /// Fetches candidate entries.
    fn query(
        &self,
        domain: &str,
        upper_pattern: &str,
        filter: &VocabularyFilter,
    ) -> Result<Vec<SearchEntry>, RetrievalError>;

    /// Identifies the state of the index.
    ///
    /// Must change whenever the indexed content changes. Used to key cached
    /// results. The default suits indexes that never change: with it, cached
    /// rows expire only by TTL or [`SearchCache::clear`](crate::SearchCache::clear).
    fn generation(&self) -> u64 {
        0
    }
}

/// Read-only relationship lookup.
pub trait RelationshipStore: Send + Sync {
    /// Returns the targets of all `kind` edges leaving `source`.
    ///
    /// Returns an empty Vec if the concept has no such edges.
    fn lookup(
        &self,
        source: ConceptId,
        kind: &RelationshipKind,
    ) -> Result<Vec<MappedTarget>, RetrievalError>;

    /// Batched form of [`lookup`](Self::lookup).
    ///
    /// The default issues one lookup per source. Stores that can answer in a
    /// single round trip should override it. Sources without edges may be
    /// omitted from the map.
    fn lookup_many(
        &self,
        sources: &[ConceptId],
        kind: &RelationshipKind,
    ) -> Result<HashMap<ConceptId, Vec<MappedTarget>>, RetrievalError> {
        let mut targets = HashMap::with_capacity(sources.len());
        for &source in sources {
            let found = self.lookup(source, kind)?;
            if !found.is_empty() {
                targets.insert(source, found);
            }
        }
        Ok(targets)
    }
}

impl<T: ConceptIndex + ?Sized> ConceptIndex for &T {
    fn query(
        &self,
        domain: &str,
        upper_pattern: &str,
        filter: &VocabularyFilter,
    ) -> Result<Vec<SearchEntry>, RetrievalError> {
        (**self).query(domain, upper_pattern, filter)
    }

    fn generation(&self) -> u64 {
        (**self).generation()
    }
}

impl<T: RelationshipStore + ?Sized> RelationshipStore for &T {
    fn lookup(
        &self,
        source: ConceptId,
        kind: &RelationshipKind,
    ) -> Result<Vec<MappedTarget>, RetrievalError> {
        (**self).lookup(source, kind)
    }

    fn lookup_many(
        &self,
        sources: &[ConceptId],
        kind: &RelationshipKind,
    ) -> Result<HashMap<ConceptId, Vec<MappedTarget>>, RetrievalError> {
        (**self).lookup_many(sources, kind)
    }
}
