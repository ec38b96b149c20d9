//! # omop-concept-index
//!
//! In-memory collaborators for `omop-concept-search`.
//!
//! This crate provides a ready-made [`ConceptIndex`](omop_concept_search::ConceptIndex)
//! and [`RelationshipStore`](omop_concept_search::RelationshipStore) over a
//! vocabulary loaded into memory, plus a handle for swapping in new
//! vocabulary generations while searches are running.
//!
//! ## Features
//!
//! - **Trigram postings**: roaring-bitmap posting lists per domain narrow
//!   substring matches before verification
//! - **Atomic swaps**: [`SharedVocabulary`] installs rebuilt or refreshed
//!   snapshots without blocking pinned readers
//! - **`persistence`**: save/load snapshot rows to disk with a JSON manifest
//! - **`full`**: persistence plus parallel resolution in the searcher
//!
//! ## Quick Start
//!
//! ```ignore
//! use omop_concept_index::SharedVocabulary;
//! use omop_concept_search::ConceptSearcher;
//!
//! let vocabulary = SharedVocabulary::build(concepts, relationships)?;
//! let snapshot = vocabulary.snapshot();
//!
//! let searcher = ConceptSearcher::new(&*snapshot, &*snapshot);
//! let result = searcher.search("E11.9", "Condition")?;
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                   omop-concept-index                     │
//! │                                                          │
//! │  SharedVocabulary ── RwLock<Arc<VocabularySnapshot>>     │
//! │                                                          │
//! │  VocabularySnapshot                                      │
//! │  ├── concepts: id → Concept                              │
//! │  ├── partitions: domain → DomainPartition                │
//! │  │   ├── entries (SearchEntry, by concept id)            │
//! │  │   └── TrigramPostings (trigram → RoaringBitmap)       │
//! │  └── edges: kind → source → targets                      │
//! │                                                          │
//! │  persistence (feature) ── SnapshotFile + Manifest        │
//! └─────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod trigram;

mod shared;
mod snapshot;
mod stats;

#[cfg(feature = "persistence")]
pub mod persistence;

pub use error::{IndexError, IndexResult};
pub use shared::SharedVocabulary;
pub use snapshot::{DomainPartition, VocabularySnapshot};
pub use stats::SnapshotStats;
