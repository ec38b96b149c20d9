//! Property tests for search invariants.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use omop_concept_search::{
    CacheConfig, ConceptIndex, ConceptSearcher, MappedTarget, RelationshipStore, RetrievalError,
    SearchConfig, SearchError, ValidationError, VocabularyFilter, DOMAIN_POLICIES, MAX_RESULTS,
};
use omop_vocab::{Concept, ConceptId, RelationshipKind, SearchEntry, StandardFlag};
use proptest::prelude::*;

#[derive(Debug)]
struct PropVocabulary {
    concepts: Vec<Concept>,
    maps_to: HashMap<ConceptId, Vec<ConceptId>>,
    index_calls: AtomicUsize,
}

impl ConceptIndex for PropVocabulary {
    fn query(
        &self,
        domain: &str,
        upper_pattern: &str,
        filter: &VocabularyFilter,
    ) -> Result<Vec<SearchEntry>, RetrievalError> {
        self.index_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .concepts
            .iter()
            .map(SearchEntry::from_concept)
            .filter(|e| e.domain == domain && filter.admits(e) && e.contains(upper_pattern))
            .collect())
    }
}

impl RelationshipStore for PropVocabulary {
    fn lookup(
        &self,
        source: ConceptId,
        _kind: &RelationshipKind,
    ) -> Result<Vec<MappedTarget>, RetrievalError> {
        Ok(self
            .maps_to
            .get(&source)
            .into_iter()
            .flatten()
            .filter_map(|id| self.concepts.iter().find(|c| c.id == *id))
            .map(MappedTarget::from)
            .collect())
    }
}

fn flag() -> impl Strategy<Value = StandardFlag> {
    prop_oneof![
        Just(StandardFlag::Standard),
        Just(StandardFlag::Classification),
        Just(StandardFlag::None),
    ]
}

fn concept(id: ConceptId) -> impl Strategy<Value = Concept> {
    (
        "[a-c]{1,6}",
        "[0-9A-C]{1,4}",
        prop_oneof![Just("SNOMED"), Just("ICD10CM"), Just("LOINC")],
        prop_oneof![Just("Condition"), Just("Measurement")],
        flag(),
    )
        .prop_map(move |(name, code, vocabulary, domain, standard_flag)| Concept {
            id,
            name,
            code,
            vocabulary: vocabulary.to_string(),
            domain: domain.to_string(),
            class: "Clinical Finding".to_string(),
            standard_flag,
        })
}

fn vocabulary() -> impl Strategy<Value = PropVocabulary> {
    (1usize..40)
        .prop_flat_map(|n| {
            let concepts: Vec<_> = (0..n).map(|i| concept(100 + i as ConceptId)).collect();
            let edges = prop::collection::vec((0..n, 0..n), 0..n);
            (concepts, edges)
        })
        .prop_map(|(concepts, edges)| {
            let mut maps_to: HashMap<ConceptId, Vec<ConceptId>> = HashMap::new();
            for (s, t) in edges {
                maps_to
                    .entry(concepts[s].id)
                    .or_default()
                    .push(concepts[t].id);
            }
            PropVocabulary {
                concepts,
                maps_to,
                index_calls: AtomicUsize::new(0),
            }
        })
}

fn registered(domain: &str) -> bool {
    DOMAIN_POLICIES.iter().any(|p| p.domain == domain)
}

proptest! {
    #[test]
    fn prop_unknown_domain_is_empty(
        vocab in vocabulary(),
        query in "[a-c0-9]{2,5}",
        domain in "[A-Za-z]{1,12}",
    ) {
        prop_assume!(!registered(&domain));
        let searcher = ConceptSearcher::new(&vocab, &vocab);
        let result = searcher.search(&query, &domain).unwrap();
        prop_assert!(result.is_empty());
    }

    #[test]
    fn prop_short_query_rejected_without_retrieval(
        vocab in vocabulary(),
        query in "[ \t]{0,3}[a-c0-9]?[ \t]{0,3}",
    ) {
        let searcher = ConceptSearcher::new(&vocab, &vocab);
        let err = searcher.search(&query, "Condition").unwrap_err();
        prop_assert_eq!(err, SearchError::Validation(ValidationError::QueryTooShort));
        prop_assert_eq!(vocab.index_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn prop_search_is_idempotent(vocab in vocabulary(), query in "[a-c0-9]{2,3}") {
        let searcher = ConceptSearcher::new(&vocab, &vocab);
        let first = searcher.search(&query, "Condition").unwrap();
        let second = searcher.search(&query, "Condition").unwrap();
        prop_assert_eq!(first.rows, second.rows);
    }

    #[test]
    fn prop_cached_search_matches_uncached(
        vocab in vocabulary(),
        queries in prop::collection::vec("[a-c0-9]{1,2}[ ]{1,2}[a-c0-9]{1,2}", 1..6),
    ) {
        let config = SearchConfig::builder().with_cache(CacheConfig::default()).build();
        let cached = ConceptSearcher::with_config(&vocab, &vocab, config);
        let uncached = ConceptSearcher::new(&vocab, &vocab);
        for query in queries.iter().chain(queries.iter()) {
            let expected = uncached.search(query, "Condition").unwrap();
            let actual = cached.search(query, "Condition").unwrap();
            prop_assert_eq!(actual.rows, expected.rows);
        }
    }

    #[test]
    fn prop_exact_id_rows_come_first(vocab in vocabulary(), pick in 0usize..40) {
        let id = vocab.concepts[pick % vocab.concepts.len()].id;
        let searcher = ConceptSearcher::new(&vocab, &vocab);
        let result = searcher.search(&id.to_string(), "Condition").unwrap();

        let mut seen_other = false;
        for row in &result {
            if row.searched_concept_id == id {
                prop_assert!(!seen_other, "exact id row after a non-matching row");
            } else {
                seen_other = true;
            }
        }
    }

    #[test]
    fn prop_rows_are_bounded_and_match_query(vocab in vocabulary(), query in "[a-c]{2}") {
        let searcher = ConceptSearcher::new(&vocab, &vocab);
        let result = searcher.search(&query, "Measurement").unwrap();
        prop_assert!(result.len() <= MAX_RESULTS);
        let upper = query.to_uppercase();
        for row in &result {
            prop_assert!(row.searched_term.to_uppercase().contains(&upper));
            prop_assert!(row.searched_vocabulary == "SNOMED" || row.searched_vocabulary == "LOINC");
        }
    }

    #[test]
    fn prop_mapped_rows_resolve_to_standard(vocab in vocabulary(), query in "[a-c]{2}") {
        let searcher = ConceptSearcher::new(&vocab, &vocab);
        let result = searcher.search(&query, "Condition").unwrap();
        for row in &result {
            if row.standard_concept_id != row.searched_concept_id {
                let target = vocab
                    .concepts
                    .iter()
                    .find(|c| c.id == row.standard_concept_id)
                    .unwrap();
                prop_assert!(target.is_standard());
            }
        }
    }
}
