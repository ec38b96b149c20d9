//! Domain vocabulary policy.
//!
//! A closed table mapping each searchable clinical domain to the vocabularies
//! its concepts may come from. The `Drug` domain additionally restricts
//! concept classes so that only prescribable products, ingredients, NDC codes
//! and ATC levels are returned.
//!
//! Domains missing from [`DOMAIN_POLICIES`] are not errors: they resolve to
//! [`VocabularyFilter::EMPTY`], which admits nothing.

use omop_vocab::SearchEntry;

/// Additional concept class restriction applied after the vocabulary check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassFilter {
    /// Concept classes that pass.
    pub classes: &'static [&'static str],
    /// Vocabulary whose concepts pass regardless of class.
    pub or_vocabulary: &'static str,
}

impl ClassFilter {
    /// Returns true if an entry with this class and vocabulary passes.
    #[inline]
    pub fn admits(&self, class: &str, vocabulary: &str) -> bool {
        vocabulary == self.or_vocabulary || self.classes.contains(&class)
    }
}

/// Policy entry for one domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomainPolicy {
    /// Domain name, matched exactly.
    pub domain: &'static str,
    /// Permitted vocabulary identifiers.
    pub vocabularies: &'static [&'static str],
    /// Optional class restriction.
    pub class_filter: Option<ClassFilter>,
}

/// Concept classes admitted in the `Drug` domain.
pub const DRUG_CLASSES: &[&str] = &[
    "Clinical Drug",
    "Branded Drug",
    "Ingredient",
    "Clinical Pack",
    "Branded Pack",
    "Quant Clinical Drug",
    "Quant Branded Drug",
    "11-digit NDC",
    "ATC 1st",
    "ATC 2nd",
    "ATC 3rd",
    "ATC 4th",
    "ATC 5th",
];

/// The registered domains.
pub const DOMAIN_POLICIES: &[DomainPolicy] = &[
    DomainPolicy {
        domain: "Condition",
        vocabularies: &["SNOMED", "ICD9CM", "ICD10CM"],
        class_filter: None,
    },
    DomainPolicy {
        domain: "Observation",
        vocabularies: &["SNOMED", "LOINC", "ICD9CM", "ICD10CM", "CPT4", "HCPCS"],
        class_filter: None,
    },
    DomainPolicy {
        domain: "Drug",
        vocabularies: &["RxNorm", "NDC", "CPT4", "CVX", "HCPCS", "ATC"],
        class_filter: Some(ClassFilter {
            classes: DRUG_CLASSES,
            or_vocabulary: "ATC",
        }),
    },
    DomainPolicy {
        domain: "Measurement",
        vocabularies: &["SNOMED", "LOINC", "CPT4", "HCPCS"],
        class_filter: None,
    },
    DomainPolicy {
        domain: "Procedure",
        vocabularies: &["SNOMED", "ICD9Proc", "ICD10PCS", "CPT4", "HCPCS"],
        class_filter: None,
    },
];

/// Looks up the policy for a domain.
pub fn policy_for(domain: &str) -> Option<&'static DomainPolicy> {
    DOMAIN_POLICIES.iter().find(|p| p.domain == domain)
}

/// Vocabulary/class filter handed to a [`ConceptIndex`](crate::ConceptIndex).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VocabularyFilter {
    /// Permitted vocabularies. Empty means nothing is admitted.
    pub vocabularies: &'static [&'static str],
    /// Optional class restriction.
    pub class_filter: Option<ClassFilter>,
}

impl VocabularyFilter {
    /// Filter that admits nothing (unregistered domains).
    pub const EMPTY: VocabularyFilter = VocabularyFilter {
        vocabularies: &[],
        class_filter: None,
    };

    /// Builds the filter for a domain.
    pub fn for_domain(domain: &str) -> Self {
        policy_for(domain).map_or(Self::EMPTY, Self::from)
    }

    /// Returns true if the filter admits no vocabulary at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vocabularies.is_empty()
    }

    /// Returns true if concepts of `vocabulary` may pass.
    #[inline]
    pub fn admits_vocabulary(&self, vocabulary: &str) -> bool {
        self.vocabularies.contains(&vocabulary)
    }

    /// Returns true if the entry passes both the vocabulary and class checks.
    pub fn admits(&self, entry: &SearchEntry) -> bool {
        self.admits_vocabulary(&entry.vocabulary)
            && self
                .class_filter
                .map_or(true, |f| f.admits(&entry.class, &entry.vocabulary))
    }
}

impl From<&DomainPolicy> for VocabularyFilter {
    fn from(policy: &DomainPolicy) -> Self {
        Self {
            vocabularies: policy.vocabularies,
            class_filter: policy.class_filter,
        }
    }
}
