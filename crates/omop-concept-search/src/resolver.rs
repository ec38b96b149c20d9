//! Standard concept resolution.
//!
//! Each candidate is resolved through its maps-to edges. Only targets flagged
//! as standard qualify. When several qualify, the one with the lowest concept
//! id is chosen so results stay reproducible.

use std::collections::HashMap;

use omop_vocab::{ConceptId, RelationshipKind, SearchEntry};
use tracing::debug;

use crate::error::RetrievalError;
use crate::result::SearchRow;
use crate::traits::{MappedTarget, RelationshipStore};

/// The standard concept a candidate maps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandardTarget {
    /// Target concept id.
    pub concept_id: ConceptId,
    /// Target name.
    pub name: String,
    /// Target code.
    pub code: String,
    /// Target vocabulary.
    pub vocabulary: String,
    /// Target concept class.
    pub class: String,
}

impl From<&MappedTarget> for StandardTarget {
    fn from(target: &MappedTarget) -> Self {
        Self {
            concept_id: target.concept_id,
            name: target.name.clone(),
            code: target.code.clone(),
            vocabulary: target.vocabulary.clone(),
            class: target.class.clone(),
        }
    }
}

/// How a candidate's standard fields were obtained. Lower is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MappingTier {
    /// Resolved through a maps-to edge.
    Mapped = 0,
    /// The candidate is itself standard.
    SelfStandard = 1,
    /// Neither; the candidate is echoed unmapped.
    Unmapped = 2,
}

impl MappingTier {
    /// Determines the tier of a candidate.
    pub fn of(candidate: &SearchEntry, target: Option<&StandardTarget>) -> Self {
        if target.is_some() {
            MappingTier::Mapped
        } else if candidate.is_standard() {
            MappingTier::SelfStandard
        } else {
            MappingTier::Unmapped
        }
    }
}

/// Picks the standard target among a candidate's maps-to targets.
///
/// Non-standard targets are ignored. Ties go to the lowest concept id.
pub fn resolve_standard(targets: &[MappedTarget]) -> Option<StandardTarget> {
    targets
        .iter()
        .filter(|t| t.standard_flag.is_standard())
        .min_by_key(|t| t.concept_id)
        .map(StandardTarget::from)
}

/// Resolves every candidate in one batched lookup.
///
/// Candidates without a qualifying target are absent from the map.
pub fn resolve_all<R>(
    store: &R,
    candidates: &[SearchEntry],
) -> Result<HashMap<ConceptId, StandardTarget>, RetrievalError>
where
    R: RelationshipStore + ?Sized,
{
    let ids: Vec<ConceptId> = candidates.iter().map(|c| c.concept_id).collect();
    let edges = store.lookup_many(&ids, &RelationshipKind::MapsTo)?;
    Ok(collect_targets(edges))
}

/// Resolves candidates with chunked lookups spread over the rayon pool.
#[cfg(feature = "parallel")]
pub fn resolve_all_parallel<R>(
    store: &R,
    candidates: &[SearchEntry],
    chunk_size: usize,
) -> Result<HashMap<ConceptId, StandardTarget>, RetrievalError>
where
    R: RelationshipStore + ?Sized,
{
    use rayon::prelude::*;

    let ids: Vec<ConceptId> = candidates.iter().map(|c| c.concept_id).collect();
    let chunks: Vec<HashMap<ConceptId, Vec<MappedTarget>>> = ids
        .par_chunks(chunk_size.max(1))
        .map(|chunk| store.lookup_many(chunk, &RelationshipKind::MapsTo))
        .collect::<Result<_, _>>()?;
    Ok(chunks.into_iter().flat_map(collect_targets).collect())
}

fn collect_targets(
    edges: HashMap<ConceptId, Vec<MappedTarget>>,
) -> HashMap<ConceptId, StandardTarget> {
    let resolved: HashMap<ConceptId, StandardTarget> = edges
        .into_iter()
        .filter_map(|(source, targets)| resolve_standard(&targets).map(|t| (source, t)))
        .collect();
    debug!(mapped = resolved.len(), "resolved standard targets");
    resolved
}

/// Builds the output row for a candidate.
///
/// The standard fields come from the target when there is one and from the
/// candidate otherwise. The searched fields always echo the candidate.
pub fn assemble_row(candidate: &SearchEntry, target: Option<&StandardTarget>) -> SearchRow {
    let (standard_concept_id, standard_name, standard_code, standard_vocabulary, standard_class) =
        match target {
            Some(t) => (t.concept_id, &t.name, &t.code, &t.vocabulary, &t.class),
            None => (
                candidate.concept_id,
                &candidate.name,
                &candidate.code,
                &candidate.vocabulary,
                &candidate.class,
            ),
        };
    SearchRow {
        standard_name: standard_name.clone(),
        standard_concept_id,
        standard_code: standard_code.clone(),
        standard_vocabulary: standard_vocabulary.clone(),
        standard_concept_class: standard_class.clone(),
        searched_name: candidate.name.clone(),
        searched_concept_id: candidate.concept_id,
        searched_code: candidate.code.clone(),
        searched_vocabulary: candidate.vocabulary.clone(),
        searched_concept_class: candidate.class.clone(),
        searched_term: candidate.search_text.clone(),
    }
}
