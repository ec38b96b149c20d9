//! End-to-end search over in-memory vocabulary snapshots.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use omop_concept_index::{SharedVocabulary, VocabularySnapshot};
use omop_concept_search::{
    CacheConfig, ConceptIndex, ConceptSearcher, MappedTarget, RelationshipStore, RetrievalError,
    SearchCache, SearchConfig, SearchError, SearchResult, ValidationError, VocabularyFilter,
};
use omop_vocab::{Concept, ConceptId, Relationship, RelationshipKind, StandardFlag};

fn concept(
    id: ConceptId,
    name: &str,
    code: &str,
    vocabulary: &str,
    domain: &str,
    class: &str,
    flag: StandardFlag,
) -> Concept {
    Concept {
        id,
        name: name.to_string(),
        code: code.to_string(),
        vocabulary: vocabulary.to_string(),
        domain: domain.to_string(),
        class: class.to_string(),
        standard_flag: flag,
    }
}

fn concepts() -> Vec<Concept> {
    use StandardFlag::{Classification, None, Standard};
    vec![
        concept(1308216, "Lisinopril", "29046", "RxNorm", "Drug", "Ingredient", Standard),
        concept(21601783, "lisinopril", "C09AA03", "ATC", "Drug", "ATC 5th", Classification),
        concept(1308251, "lisinopril 10 MG Oral Tablet", "314076", "RxNorm", "Drug", "Clinical Drug", Standard),
        concept(44000001, "Lisinopril 10mg tablet", "00093-1111", "NDC", "Drug", "11-digit NDC", None),
        concept(44000002, "lisinopril [VA Product]", "4019380", "VA Product", "Drug", "VA Product", None),
        concept(207, "Burn of skin", "X207", "SNOMED", "Condition", "Clinical Finding", None),
        concept(201826, "Type 2 diabetes mellitus", "44054006", "SNOMED", "Condition", "Clinical Finding", Standard),
        concept(45561952, "Type 2 diabetes mellitus without complications", "E11.9", "ICD10CM", "Condition", "5-char billing code", None),
        concept(2070, "Code 207 related", "207", "ICD9CM", "Condition", "4-dig billing code", None),
        concept(4000207, "Disorder 207", "4000207", "Read", "Condition", "Read", None),
    ]
}

fn relationships() -> Vec<Relationship> {
    vec![
        Relationship::maps_to(44000001, 1308251),
        Relationship::maps_to(1308216, 1308216),
        Relationship::maps_to(45561952, 201826),
        Relationship::maps_to(207, 201826),
    ]
}

fn snapshot() -> VocabularySnapshot {
    VocabularySnapshot::build(concepts(), relationships()).unwrap()
}

#[test]
fn test_lisinopril_order_over_snapshot() {
    let snapshot = snapshot();
    let searcher = ConceptSearcher::new(&snapshot, &snapshot);
    let result = searcher.search("lisinopril", "Drug").unwrap();

    assert_eq!(
        result.searched_ids(),
        vec![1308216, 44000001, 1308251, 21601783]
    );
    assert_eq!(result.rows[1].standard_concept_id, 1308251);
    assert_eq!(result.rows[1].standard_name, "lisinopril 10 MG Oral Tablet");
}

#[test]
fn test_exact_id_then_exact_code_over_snapshot() {
    let snapshot = snapshot();
    let searcher = ConceptSearcher::new(&snapshot, &snapshot);
    let result = searcher.search("207", "Condition").unwrap();

    let ids = result.searched_ids();
    assert_eq!(&ids[..2], &[207, 2070]);
    assert_eq!(result.rows[0].standard_concept_id, 201826);
    assert!(!ids.contains(&4000207));
}

#[test]
fn test_code_query_with_punctuation() {
    let snapshot = snapshot();
    let searcher = ConceptSearcher::new(&snapshot, &snapshot);
    let result = searcher.search("e11.9", "Condition").unwrap();

    assert_eq!(result.searched_ids(), vec![45561952]);
    assert_eq!(result.rows[0].standard_vocabulary, "SNOMED");
}

#[test]
fn test_validation_and_unknown_domain_over_snapshot() {
    let snapshot = snapshot();
    let searcher = ConceptSearcher::new(&snapshot, &snapshot);

    assert_eq!(
        searcher.search(" l ", "Drug").unwrap_err(),
        SearchError::Validation(ValidationError::QueryTooShort)
    );
    assert!(searcher.search("lisinopril", "Device").unwrap().is_empty());
}

#[test]
fn test_two_char_query_scans_partition() {
    let snapshot = snapshot();
    let searcher = ConceptSearcher::new(&snapshot, &snapshot);
    let result = searcher.search("10", "Drug").unwrap();

    let mut ids = result.searched_ids();
    ids.sort_unstable();
    assert_eq!(ids, vec![1308251, 44000001]);
}

#[test]
fn test_standard_target_over_snapshot() {
    let snapshot = snapshot();
    let searcher = ConceptSearcher::new(&snapshot, &snapshot);

    let target = searcher.standard_target(45561952).unwrap().unwrap();
    assert_eq!(target.concept_id, 201826);
    assert!(searcher.standard_target(21601783).unwrap().is_none());
}

#[test]
fn test_pinned_search_across_rebuild() {
    let shared = SharedVocabulary::build(concepts(), relationships()).unwrap();
    let pinned = shared.snapshot();

    let mut reduced = concepts();
    reduced.retain(|c| c.id != 1308251);
    shared.rebuild(reduced, relationships()).unwrap();

    let searcher = ConceptSearcher::new(&*pinned, &*pinned);
    let result = searcher.search("lisinopril", "Drug").unwrap();
    assert!(result.searched_ids().contains(&1308251));

    let current = shared.snapshot();
    let searcher = ConceptSearcher::new(&*current, &*current);
    let result = searcher.search("lisinopril", "Drug").unwrap();
    assert!(!result.searched_ids().contains(&1308251));
    // the NDC row lost its standard target and now ranks as unmapped
    let ndc = result
        .iter()
        .find(|row| row.searched_concept_id == 44000001)
        .unwrap();
    assert_eq!(ndc.standard_concept_id, 44000001);
}

/// Runs one search against whichever snapshot is current, through a shared cache.
fn search_current(
    shared: &SharedVocabulary,
    cache: &Arc<SearchCache>,
    query: &str,
    domain: &str,
) -> SearchResult {
    let snapshot = shared.snapshot();
    ConceptSearcher::with_shared_cache(
        &*snapshot,
        &*snapshot,
        SearchConfig::default(),
        Arc::clone(cache),
    )
    .search(query, domain)
    .unwrap()
}

#[test]
fn test_refresh_invalidates_cached_results() {
    let shared = SharedVocabulary::build(concepts(), relationships()).unwrap();
    let cache = Arc::new(SearchCache::new(CacheConfig::default()));

    let first = search_current(&shared, &cache, "diabetes", "Condition");
    assert!(!first.stats.cache_hit);
    let again = search_current(&shared, &cache, "diabetes", "Condition");
    assert!(again.stats.cache_hit);

    shared
        .refresh(
            vec![concept(
                201826,
                "Diabetes mellitus type 2",
                "44054006",
                "SNOMED",
                "Condition",
                "Clinical Finding",
                StandardFlag::Standard,
            )],
            &[],
        )
        .unwrap();

    let refreshed = search_current(&shared, &cache, "diabetes", "Condition");
    assert!(!refreshed.stats.cache_hit);
    let row = refreshed
        .iter()
        .find(|row| row.searched_concept_id == 45561952)
        .unwrap();
    assert_eq!(row.standard_name, "Diabetes mellitus type 2");
    // generation 1 rows were dropped when generation 2 was stored
    assert_eq!(cache.len(), 1);
}

/// Installs a new generation on its first lookup, then answers from `pinned`.
struct RebuildOnFirstLookup<'a> {
    shared: &'a SharedVocabulary,
    pinned: &'a VocabularySnapshot,
    fired: AtomicBool,
}

impl RelationshipStore for RebuildOnFirstLookup<'_> {
    fn lookup(
        &self,
        source: ConceptId,
        kind: &RelationshipKind,
    ) -> Result<Vec<MappedTarget>, RetrievalError> {
        if !self.fired.swap(true, Ordering::SeqCst) {
            self.shared
                .rebuild(
                    vec![
                        concept(10, "asthma new", "A10", "SNOMED", "Condition", "Clinical Finding", StandardFlag::None),
                        concept(20, "wheeze std A", "A20", "SNOMED", "Condition", "Clinical Finding", StandardFlag::Standard),
                        concept(30, "wheeze std B", "A30", "SNOMED", "Condition", "Clinical Finding", StandardFlag::Standard),
                    ],
                    vec![Relationship::maps_to(10, 30)],
                )
                .unwrap();
        }
        self.pinned.lookup(source, kind)
    }
}

#[test]
fn test_rebuild_between_retrieval_and_resolution() {
    let shared = SharedVocabulary::build(
        vec![
            concept(10, "asthma old", "A10", "SNOMED", "Condition", "Clinical Finding", StandardFlag::None),
            concept(20, "wheeze std A", "A20", "SNOMED", "Condition", "Clinical Finding", StandardFlag::Standard),
            concept(30, "wheeze std B", "A30", "SNOMED", "Condition", "Clinical Finding", StandardFlag::Standard),
        ],
        vec![Relationship::maps_to(10, 20)],
    )
    .unwrap();

    let pinned = shared.snapshot();
    let store = RebuildOnFirstLookup {
        shared: &shared,
        pinned: &*pinned,
        fired: AtomicBool::new(false),
    };
    let result = ConceptSearcher::new(&*pinned, &store)
        .search("asthma old", "Condition")
        .unwrap();

    assert_eq!(shared.generation(), 2);
    let row = result.first().unwrap();
    assert_eq!(row.searched_concept_id, 10);
    assert_eq!(row.searched_name, "asthma old");
    assert_eq!(row.standard_concept_id, 20);
    assert_eq!(row.standard_name, "wheeze std A");

    // the next search pins the new generation and sees the new mapping
    let current = shared.snapshot();
    let result = ConceptSearcher::new(&*current, &*current)
        .search("asthma new", "Condition")
        .unwrap();
    assert_eq!(result.first().unwrap().standard_concept_id, 30);
}

#[test]
fn test_retired_concept_disappears_after_refresh() {
    let shared = SharedVocabulary::build(concepts(), relationships()).unwrap();
    let generation = shared.refresh(Vec::new(), &[45561952]).unwrap();
    assert_eq!(generation, 2);

    let filter = VocabularyFilter::for_domain("Condition");
    let hits = shared
        .snapshot()
        .query("Condition", "E11.9", &filter)
        .unwrap();
    assert!(hits.is_empty());
    assert_eq!(shared.stats().concept_count, concepts().len() - 1);
}
