//! Error types for vocabulary row decoding.

use thiserror::Error;

/// Errors that can occur while decoding vocabulary column values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VocabError {
    /// The `standard_concept` column held an unrecognised value.
    #[error("invalid standard concept flag: {0:?}")]
    InvalidStandardFlag(String),

    /// A relationship id was empty.
    #[error("empty relationship id")]
    EmptyRelationshipId,
}

/// Result type for vocabulary operations.
pub type VocabResult<T> = std::result::Result<T, VocabError>;
