//! Error types for the index crate.

use omop_vocab::ConceptId;

#[cfg(feature = "persistence")]
use std::path::PathBuf;

/// Result type for index operations.
pub type IndexResult<T> = Result<T, IndexError>;

/// Errors that can occur while building, refreshing or persisting an index.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// The same concept id appeared twice in build input.
    #[error("Duplicate concept id {0} in build input")]
    DuplicateConcept(ConceptId),

    /// A domain partition outgrew the 32-bit posting space.
    #[error("Domain {domain} has {entries} entries, exceeding the posting limit")]
    PartitionTooLarge {
        /// Domain name.
        domain: String,
        /// Number of entries.
        entries: usize,
    },

    /// I/O error during persistence operations.
    #[cfg(feature = "persistence")]
    #[error("I/O error at {path}: {source}")]
    IoError {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Invalid file format during load.
    #[cfg(feature = "persistence")]
    #[error("Invalid file format: {message}")]
    InvalidFormat {
        /// What was wrong.
        message: String,
    },

    /// Serialization error.
    #[cfg(feature = "persistence")]
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Deserialization error.
    #[cfg(feature = "persistence")]
    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    /// Payload checksum did not match the header.
    #[cfg(feature = "persistence")]
    #[error("Checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// Checksum recorded in the file.
        expected: String,
        /// Checksum of the payload read.
        actual: String,
    },
}

impl IndexError {
    /// Creates an I/O error with path context.
    #[cfg(feature = "persistence")]
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::IoError {
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid format error.
    #[cfg(feature = "persistence")]
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }
}
