//! # omop-vocab
//!
//! Data model for OMOP standardized vocabularies.
//!
//! This crate provides the row types shared by the concept search engine and
//! its storage collaborators:
//! - **[`Concept`]**: a coded clinical term within a vocabulary
//! - **[`SearchEntry`]**: the pre-normalized search projection of a concept
//! - **[`Relationship`]**: a directed edge between two concepts
//!
//! ## Usage
//!
//! ```rust
//! use omop_vocab::{Concept, SearchEntry, StandardFlag};
//!
//! let concept = Concept {
//!     id: 1308216,
//!     name: "Lisinopril".to_string(),
//!     code: "29046".to_string(),
//!     vocabulary: "RxNorm".to_string(),
//!     domain: "Drug".to_string(),
//!     class: "Ingredient".to_string(),
//!     standard_flag: StandardFlag::Standard,
//! };
//!
//! let entry = SearchEntry::from_concept(&concept);
//! assert_eq!(entry.search_text, "1308216 29046 Lisinopril");
//! assert!(entry.contains("LISINO"));
//! ```
//!
//! ## Ownership
//!
//! Concepts and relationships are owned by whatever process loads the
//! vocabulary. A [`SearchEntry`] is a derived cache over its concept and can
//! always be rebuilt with [`SearchEntry::from_concept`].

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod concept;
mod entry;
mod error;
mod relationship;

pub use concept::{Concept, StandardFlag};
pub use entry::SearchEntry;
pub use error::{VocabError, VocabResult};
pub use relationship::{Relationship, RelationshipKind};

/// OMOP concept identifier (`concept_id`, a signed 32/64-bit integer column).
pub type ConceptId = i64;
