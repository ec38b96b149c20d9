//! Error types for concept search.

use std::time::Duration;

use thiserror::Error;

/// Malformed search input. Raised before any retrieval is attempted.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// The trimmed query is shorter than two characters.
    #[error("query too short")]
    QueryTooShort,

    /// The domain is empty.
    #[error("domain required")]
    DomainRequired,
}

/// Failure of a storage collaborator (concept index or relationship store).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RetrievalError {
    /// The collaborator could not serve the request.
    #[error("collaborator unavailable: {0}")]
    Unavailable(String),

    /// The collaborator did not answer in time.
    #[error("collaborator timed out after {0:?}")]
    TimedOut(Duration),
}

/// Errors that can occur during a search.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// Input rejected; no rows.
    #[error("invalid search request: {0}")]
    Validation(#[from] ValidationError),

    /// A collaborator failed; surfaced as-is, never retried here.
    #[error("retrieval failed: {0}")]
    Retrieval(#[from] RetrievalError),

    /// The caller's deadline passed before result assembly.
    #[error("search deadline exceeded after {0:?}")]
    DeadlineExceeded(Duration),
}

impl SearchError {
    /// Returns true for input validation failures.
    pub fn is_validation(&self) -> bool {
        matches!(self, SearchError::Validation(_))
    }
}

/// Result type for concept search operations.
pub type SearchOutcome<T> = std::result::Result<T, SearchError>;
