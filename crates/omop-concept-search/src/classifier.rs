//! Per-candidate match signals.

use omop_vocab::{ConceptId, SearchEntry};

/// Match signals of one candidate against the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatchSignals {
    /// Query parses as an integer equal to the concept id.
    pub exact_id_match: bool,
    /// Query equals the concept code (case-sensitive).
    pub exact_code_match: bool,
    /// Absolute difference between query and name lengths, in characters.
    pub name_length_delta: usize,
}

impl MatchSignals {
    /// Classifies a candidate.
    pub fn classify(query: &str, candidate: &SearchEntry) -> Self {
        Self {
            exact_id_match: exact_id_match(query, candidate.concept_id),
            exact_code_match: exact_code_match(query, &candidate.code),
            name_length_delta: name_length_delta(query, &candidate.name),
        }
    }
}

/// True iff `query` parses as an integer equal to `concept_id`.
pub fn exact_id_match(query: &str, concept_id: ConceptId) -> bool {
    query.parse::<ConceptId>().is_ok_and(|id| id == concept_id)
}

/// True iff `query` equals `code` exactly.
#[inline]
pub fn exact_code_match(query: &str, code: &str) -> bool {
    query == code
}

/// `|len(query) - len(name)|` counted in characters.
pub fn name_length_delta(query: &str, name: &str) -> usize {
    query.chars().count().abs_diff(name.chars().count())
}
