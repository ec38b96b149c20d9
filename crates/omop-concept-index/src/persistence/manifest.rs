//! JSON manifest describing a saved snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use super::SnapshotFile;
use crate::error::{IndexError, IndexResult};

/// Manifest for a saved vocabulary snapshot.
///
/// Written next to the snapshot file so operators can see which release is
/// loaded and verify the file without decoding it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotManifest {
    /// Vocabulary release label.
    pub release: String,
    /// Timestamp when the snapshot was saved.
    pub saved_at: DateTime<Utc>,
    /// Version of the writing library.
    pub writer_version: String,
    /// Number of concepts in the snapshot.
    pub concept_count: usize,
    /// Number of relationship rows in the snapshot.
    pub relationship_count: usize,
    /// Payload size in bytes.
    pub payload_bytes: usize,
    /// Hex SHA-256 of the payload.
    pub checksum: String,
    /// Snapshot filename (relative to manifest).
    pub filename: String,
}

impl SnapshotManifest {
    /// Describes `file`, to be saved as `filename`.
    pub fn new(file: &SnapshotFile, filename: &str) -> Self {
        Self {
            release: file.release.clone(),
            saved_at: Utc::now(),
            writer_version: env!("CARGO_PKG_VERSION").to_string(),
            concept_count: file.rows.concepts.len(),
            relationship_count: file.rows.relationships.len(),
            payload_bytes: file.payload_len(),
            checksum: file.checksum_hex(),
            filename: filename.to_string(),
        }
    }

    /// Returns true if `file` is the snapshot this manifest describes.
    pub fn describes(&self, file: &SnapshotFile) -> bool {
        self.checksum == file.checksum_hex() && self.release == file.release
    }

    /// Saves the manifest to a JSON file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> IndexResult<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| IndexError::io_error(path, e))?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| IndexError::SerializationError(e.to_string()))?;
        Ok(())
    }

    /// Loads a manifest from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> IndexResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| IndexError::io_error(path, e))?;
        let reader = BufReader::new(file);
        let manifest: Self = serde_json::from_reader(reader)
            .map_err(|e| IndexError::DeserializationError(e.to_string()))?;
        Ok(manifest)
    }
}

impl std::fmt::Display for SnapshotManifest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Vocabulary Snapshot Manifest")?;
        writeln!(f, "  Release:       {}", self.release)?;
        writeln!(f, "  Saved:         {}", self.saved_at)?;
        writeln!(f, "  Concepts:      {}", self.concept_count)?;
        writeln!(f, "  Relationships: {}", self.relationship_count)?;
        writeln!(f, "  Payload:       {} bytes", self.payload_bytes)?;
        writeln!(f, "  Checksum:      {}", self.checksum)?;
        writeln!(f, "  File:          {}", self.filename)?;
        Ok(())
    }
}
