//! Result ranking.
//!
//! Rows are ordered ascending on
//! `(exact id ? 0 : 1, exact code ? 0 : 1, mapping tier, name length delta, name, id)`
//! and truncated to the result limit. The trailing concept id only separates
//! candidates that agree on every other signal, which keeps the order total.

use std::cmp::Ordering;

use omop_vocab::{ConceptId, SearchEntry};

use crate::classifier::MatchSignals;
use crate::resolver::{MappingTier, StandardTarget};

/// Hard upper bound on rows returned by a search.
pub const MAX_RESULTS: usize = 1000;

/// Sort key of a candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankKey {
    exact_id: u8,
    exact_code: u8,
    tier: MappingTier,
    name_length_delta: usize,
    name: String,
    concept_id: ConceptId,
}

impl RankKey {
    /// Builds the key for a classified and resolved candidate.
    pub fn new(
        candidate: &SearchEntry,
        signals: &MatchSignals,
        target: Option<&StandardTarget>,
    ) -> Self {
        Self {
            exact_id: u8::from(!signals.exact_id_match),
            exact_code: u8::from(!signals.exact_code_match),
            tier: MappingTier::of(candidate, target),
            name_length_delta: signals.name_length_delta,
            name: candidate.name.clone(),
            concept_id: candidate.concept_id,
        }
    }

    /// Mapping tier component.
    pub fn tier(&self) -> MappingTier {
        self.tier
    }
}

impl Ord for RankKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.exact_id
            .cmp(&other.exact_id)
            .then(self.exact_code.cmp(&other.exact_code))
            .then(self.tier.cmp(&other.tier))
            .then(self.name_length_delta.cmp(&other.name_length_delta))
            .then_with(|| self.name.cmp(&other.name))
            .then(self.concept_id.cmp(&other.concept_id))
    }
}

impl PartialOrd for RankKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Sorts keyed items and keeps the first `limit`.
///
/// Returns the kept items and whether anything was dropped. `limit` is capped
/// at [`MAX_RESULTS`].
pub fn rank<T>(mut keyed: Vec<(RankKey, T)>, limit: usize) -> (Vec<T>, bool) {
    let limit = limit.min(MAX_RESULTS);
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    let truncated = keyed.len() > limit;
    keyed.truncate(limit);
    (keyed.into_iter().map(|(_, item)| item).collect(), truncated)
}
