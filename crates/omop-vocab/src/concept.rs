//! Concept rows and the standard concept flag.

use std::fmt;
use std::str::FromStr;

use crate::error::{VocabError, VocabResult};
use crate::ConceptId;

/// Standard concept designation (`standard_concept` column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StandardFlag {
    /// Canonical concept within its domain (`"S"`).
    Standard,
    /// Classification concept, e.g. ATC levels (`"C"`).
    Classification,
    /// Non-standard source concept (empty / NULL).
    #[default]
    None,
}

impl StandardFlag {
    /// Returns the column encoding of this flag.
    pub fn as_str(&self) -> &'static str {
        match self {
            StandardFlag::Standard => "S",
            StandardFlag::Classification => "C",
            StandardFlag::None => "",
        }
    }

    /// Returns true for [`StandardFlag::Standard`].
    #[inline]
    pub fn is_standard(&self) -> bool {
        matches!(self, StandardFlag::Standard)
    }
}

impl FromStr for StandardFlag {
    type Err = VocabError;

    fn from_str(s: &str) -> VocabResult<Self> {
        match s.trim() {
            "S" => Ok(StandardFlag::Standard),
            "C" => Ok(StandardFlag::Classification),
            "" => Ok(StandardFlag::None),
            other => Err(VocabError::InvalidStandardFlag(other.to_string())),
        }
    }
}

impl fmt::Display for StandardFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A coded clinical term within a standardized vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Concept {
    /// Unique concept identifier.
    pub id: ConceptId,
    /// Concept name.
    pub name: String,
    /// Code within the source vocabulary.
    pub code: String,
    /// Vocabulary (coding system) identifier, e.g. `RxNorm`.
    pub vocabulary: String,
    /// Clinical domain, e.g. `Drug`.
    pub domain: String,
    /// Concept class, e.g. `Ingredient`.
    pub class: String,
    /// Standard designation.
    pub standard_flag: StandardFlag,
}

impl Concept {
    /// Returns true if this concept is itself a standard concept.
    #[inline]
    pub fn is_standard(&self) -> bool {
        self.standard_flag.is_standard()
    }
}
