//! # omop-concept-search
//!
//! Domain-scoped concept search with standard concept resolution for OMOP
//! vocabularies.
//!
//! Given a free-text or code query and a clinical domain, the searcher finds
//! concepts whose id, code or name contains the query, restricted to the
//! vocabularies appropriate for the domain, and resolves each match to the
//! standard concept it maps to.
//!
//! ## Key Features
//!
//! - **Closed domain policy** - Five registered domains, each with its permitted vocabularies
//! - **Deterministic ranking** - Exact id, exact code, mapping tier, length delta, name
//! - **Bounded output** - Never more than 1000 rows
//! - **Storage agnostic** - Works with any [`ConceptIndex`] / [`RelationshipStore`]
//! - **Configurable caching** - LRU cache keyed on the index generation
//! - **Optional parallelism** - Enable `parallel` feature for multi-threaded resolution
//!
//! ## Quick Start
//!
//! ```ignore
//! use omop_concept_search::ConceptSearcher;
//! use omop_concept_index::SharedVocabulary;
//!
//! let vocabulary = SharedVocabulary::build(concepts, relationships)?;
//! let snapshot = vocabulary.snapshot();
//!
//! let searcher = ConceptSearcher::new(&*snapshot, &*snapshot);
//! let result = searcher.search("lisinopril", "Drug")?;
//!
//! for row in &result {
//!     println!("{} => {}", row.searched_term, row.standard_name);
//! }
//! ```
//!
//! ## Ranking
//!
//! | Priority | Signal | Better |
//! |----------|--------|--------|
//! | 1 | Query is the concept id | yes |
//! | 2 | Query is the concept code (case-sensitive) | yes |
//! | 3 | Mapping tier | mapped < self-standard < other |
//! | 4 | `\|len(query) - len(name)\|` | smaller |
//! | 5 | Concept name | lexicographically smaller |
//!
//! ## Feature Flags
//!
//! - `parallel` - Resolves maps-to lookups on the rayon pool
//! - `serde` - Serialize/Deserialize for rows and targets
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    omop-concept-search                        │
//! │                                                               │
//! │  ConceptSearcher                                              │
//! │  ├── validate (query, domain)            → ValidatedQuery     │
//! │  ├── policy: domain → VocabularyFilter                        │
//! │  ├── retrieve candidates (ConceptIndex)                       │
//! │  ├── classify: exact id / exact code / length delta           │
//! │  ├── resolve maps-to targets (RelationshipStore)              │
//! │  └── rank + truncate                     → SearchResult       │
//! │                                                               │
//! │  Dependencies:                                                │
//! │  └── omop-vocab - Concept, SearchEntry, Relationship types    │
//! └──────────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod cache;
mod classifier;
mod config;
mod error;
mod policy;
mod ranker;
mod resolver;
mod result;
mod retrieval;
mod searcher;
mod traits;

// Public re-exports
pub use cache::{CacheKey, SearchCache};
pub use classifier::{exact_code_match, exact_id_match, name_length_delta, MatchSignals};
pub use config::{CacheConfig, SearchConfig, SearchConfigBuilder};
pub use error::{RetrievalError, SearchError, SearchOutcome, ValidationError};
pub use policy::{
    policy_for, ClassFilter, DomainPolicy, VocabularyFilter, DOMAIN_POLICIES, DRUG_CLASSES,
};
pub use ranker::{rank, RankKey, MAX_RESULTS};
#[cfg(feature = "parallel")]
pub use resolver::resolve_all_parallel;
pub use resolver::{assemble_row, resolve_all, resolve_standard, MappingTier, StandardTarget};
pub use result::{SearchResult, SearchRow, SearchStats};
pub use retrieval::{retrieve_candidates, ValidatedQuery, MIN_QUERY_CHARS};
pub use searcher::ConceptSearcher;
pub use traits::{ConceptIndex, MappedTarget, RelationshipStore};

// Re-export commonly used types from dependencies for convenience
pub use omop_vocab::{ConceptId, SearchEntry};
