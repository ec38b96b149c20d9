//! Concept relationships.

use std::fmt;
use std::str::FromStr;

use crate::error::{VocabError, VocabResult};
use crate::ConceptId;

/// Relationship id for the maps-to edge.
pub(crate) const MAPS_TO: &str = "Maps to";

/// Kind of a concept relationship (`relationship_id` column).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RelationshipKind {
    /// Source concept maps to its designated standard target.
    MapsTo,
    /// Any other relationship, kept by id.
    Other(String),
}

impl RelationshipKind {
    /// Returns the relationship id.
    pub fn as_str(&self) -> &str {
        match self {
            RelationshipKind::MapsTo => MAPS_TO,
            RelationshipKind::Other(id) => id,
        }
    }
}

impl FromStr for RelationshipKind {
    type Err = VocabError;

    fn from_str(s: &str) -> VocabResult<Self> {
        match s.trim() {
            "" => Err(VocabError::EmptyRelationshipId),
            MAPS_TO => Ok(RelationshipKind::MapsTo),
            other => Ok(RelationshipKind::Other(other.to_string())),
        }
    }
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A directed edge between two concepts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Relationship {
    /// Source concept.
    pub source_concept_id: ConceptId,
    /// Target concept.
    pub target_concept_id: ConceptId,
    /// Relationship kind.
    pub kind: RelationshipKind,
}

impl Relationship {
    /// Creates a maps-to edge.
    pub fn maps_to(source_concept_id: ConceptId, target_concept_id: ConceptId) -> Self {
        Self {
            source_concept_id,
            target_concept_id,
            kind: RelationshipKind::MapsTo,
        }
    }

    /// Returns true if this is a maps-to edge.
    #[inline]
    pub fn is_maps_to(&self) -> bool {
        self.kind == RelationshipKind::MapsTo
    }
}
