//! Search entries: the derived, pre-normalized projection of a concept.

use crate::concept::{Concept, StandardFlag};
use crate::ConceptId;

/// Search projection of a [`Concept`].
///
/// One entry exists per concept. `search_text` concatenates the id, code and
/// name separated by single spaces; `search_text_upper` holds its uppercase
/// form so substring lookups can be done case-insensitively without
/// normalizing at query time.
///
/// An entry is a cache. It can go stale when its source concept changes and
/// is then rebuilt with [`SearchEntry::from_concept`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchEntry {
    /// Source concept identifier.
    pub concept_id: ConceptId,
    /// Domain of the source concept.
    pub domain: String,
    /// `"<id> <code> <name>"`.
    pub search_text: String,
    /// Uppercase form of `search_text`.
    pub search_text_upper: String,
    /// Concept name.
    pub name: String,
    /// Concept code.
    pub code: String,
    /// Vocabulary identifier.
    pub vocabulary: String,
    /// Concept class.
    pub class: String,
    /// Standard designation.
    pub standard_flag: StandardFlag,
}

impl SearchEntry {
    /// Projects a concept into its search entry.
    pub fn from_concept(concept: &Concept) -> Self {
        let search_text = format!("{} {} {}", concept.id, concept.code, concept.name);
        let search_text_upper = search_text.to_uppercase();
        Self {
            concept_id: concept.id,
            domain: concept.domain.clone(),
            search_text,
            search_text_upper,
            name: concept.name.clone(),
            code: concept.code.clone(),
            vocabulary: concept.vocabulary.clone(),
            class: concept.class.clone(),
            standard_flag: concept.standard_flag,
        }
    }

    /// Tests whether `upper_pattern` occurs anywhere in `search_text_upper`.
    ///
    /// The pattern must already be uppercased.
    #[inline]
    pub fn contains(&self, upper_pattern: &str) -> bool {
        self.search_text_upper.contains(upper_pattern)
    }

    /// Returns true if this entry was projected from `concept` as it is now.
    pub fn is_current_for(&self, concept: &Concept) -> bool {
        *self == Self::from_concept(concept)
    }

    /// Returns true if the entry's normalized text agrees with its raw text.
    pub fn is_normalized(&self) -> bool {
        self.search_text_upper == self.search_text.to_uppercase()
    }

    /// Returns true if the entry itself is a standard concept.
    #[inline]
    pub fn is_standard(&self) -> bool {
        self.standard_flag.is_standard()
    }
}

impl From<&Concept> for SearchEntry {
    fn from(concept: &Concept) -> Self {
        Self::from_concept(concept)
    }
}
