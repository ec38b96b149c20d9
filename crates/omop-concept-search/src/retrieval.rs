//! Request validation and candidate retrieval.

use omop_vocab::SearchEntry;
use tracing::debug;

use crate::error::{RetrievalError, ValidationError};
use crate::policy::VocabularyFilter;
use crate::traits::ConceptIndex;

/// Minimum number of characters in a trimmed query.
pub const MIN_QUERY_CHARS: usize = 2;

/// A search request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedQuery {
    /// Trimmed query text, used for matching and classification.
    pub query: String,
    /// Uppercase query, used for substring lookup.
    pub upper: String,
    /// Domain name.
    pub domain: String,
    /// Vocabulary filter for the domain.
    pub filter: VocabularyFilter,
}

impl ValidatedQuery {
    /// Validates a raw `(query, domain)` pair.
    ///
    /// The query is checked before the domain, so a request failing both
    /// reports [`ValidationError::QueryTooShort`].
    pub fn new(query: &str, domain: &str) -> Result<Self, ValidationError> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_CHARS {
            return Err(ValidationError::QueryTooShort);
        }
        let domain = domain.trim();
        if domain.is_empty() {
            return Err(ValidationError::DomainRequired);
        }
        Ok(Self {
            query: query.to_string(),
            upper: query.to_uppercase(),
            domain: domain.to_string(),
            filter: VocabularyFilter::for_domain(domain),
        })
    }

    /// Returns true if the domain is not registered.
    #[inline]
    pub fn is_unknown_domain(&self) -> bool {
        self.filter.is_empty()
    }
}

/// Fetches the unordered candidate set for a validated request.
///
/// Unregistered domains return an empty set without touching the index.
pub fn retrieve_candidates<I>(
    index: &I,
    request: &ValidatedQuery,
) -> Result<Vec<SearchEntry>, RetrievalError>
where
    I: ConceptIndex + ?Sized,
{
    if request.is_unknown_domain() {
        debug!(domain = %request.domain, "domain not registered, no candidates");
        return Ok(Vec::new());
    }
    let candidates = index.query(&request.domain, &request.upper, &request.filter)?;
    debug!(
        domain = %request.domain,
        candidates = candidates.len(),
        "retrieved candidates"
    );
    Ok(candidates)
}
