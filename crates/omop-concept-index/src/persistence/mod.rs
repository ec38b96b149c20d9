//! Save/load vocabulary snapshots to/from disk.
//!
//! A snapshot file stores the source rows of a [`VocabularySnapshot`]
//! (concepts and relationships), not the derived postings. Loading
//! rebuilds the index from the rows, so the file format stays independent
//! of the index layout.
//!
//! # File Format
//!
//! The snapshot file format (`.ocvs`) is a binary format:
//!
//! ```text
//! [4 bytes]  Magic: "OCVS"
//! [4 bytes]  Version (u32 LE)
//! [4 bytes]  Release label length (u32 LE)
//! [var]      Release label (UTF-8)
//! [32 bytes] SHA-256 of the payload
//! [8 bytes]  Payload length (u64 LE)
//! [var]      Payload: bincode-encoded rows
//! ```
//!
//! # Example
//!
//! ```ignore
//! use omop_concept_index::persistence::{SnapshotFile, SnapshotManifest};
//!
//! let file = SnapshotFile::new("v5.0 2024-08-30", &snapshot)?;
//! file.save("vocabulary.ocvs")?;
//!
//! let loaded = SnapshotFile::load("vocabulary.ocvs")?;
//! let snapshot = loaded.into_snapshot()?;
//! ```

mod manifest;

pub use manifest::SnapshotManifest;

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use omop_vocab::{Concept, Relationship};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{IndexError, IndexResult};
use crate::snapshot::VocabularySnapshot;

/// Magic bytes for snapshot files.
const SNAPSHOT_MAGIC: &[u8; 4] = b"OCVS";

/// Current snapshot file format version.
const SNAPSHOT_VERSION: u32 = 1;

/// Source rows of a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRows {
    /// Concepts ordered by id.
    pub concepts: Vec<Concept>,
    /// Relationships in their original order.
    pub relationships: Vec<Relationship>,
}

impl SnapshotRows {
    /// Collects the rows of a snapshot.
    pub fn from_snapshot(snapshot: &VocabularySnapshot) -> Self {
        let mut concepts: Vec<Concept> = snapshot.concepts().cloned().collect();
        concepts.sort_by_key(|c| c.id);
        Self {
            concepts,
            relationships: snapshot.relationships().to_vec(),
        }
    }
}

/// A serialized snapshot file with metadata.
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    /// Vocabulary release label.
    pub release: String,
    /// SHA-256 of the encoded rows.
    pub checksum: [u8; 32],
    /// Source rows.
    pub rows: SnapshotRows,
    /// Encoded rows.
    payload: Vec<u8>,
}

impl SnapshotFile {
    /// Creates a snapshot file from a snapshot.
    pub fn new(release: &str, snapshot: &VocabularySnapshot) -> IndexResult<Self> {
        Self::from_rows(release, SnapshotRows::from_snapshot(snapshot))
    }

    /// Creates a snapshot file from source rows.
    pub fn from_rows(release: &str, rows: SnapshotRows) -> IndexResult<Self> {
        let payload = bincode::serde::encode_to_vec(&rows, bincode::config::standard())
            .map_err(|e| IndexError::SerializationError(e.to_string()))?;
        Ok(Self {
            release: release.to_string(),
            checksum: checksum(&payload),
            rows,
            payload,
        })
    }

    /// Saves the snapshot to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> IndexResult<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| IndexError::io_error(path, e))?;
        let mut writer = BufWriter::new(file);

        // Write magic bytes
        writer
            .write_all(SNAPSHOT_MAGIC)
            .map_err(|e| IndexError::io_error(path, e))?;

        // Write version
        writer
            .write_all(&SNAPSHOT_VERSION.to_le_bytes())
            .map_err(|e| IndexError::io_error(path, e))?;

        // Write release label (length-prefixed)
        let release_bytes = self.release.as_bytes();
        let release_len = u32::try_from(release_bytes.len())
            .map_err(|_| IndexError::invalid_format("Release label too long"))?;
        writer
            .write_all(&release_len.to_le_bytes())
            .map_err(|e| IndexError::io_error(path, e))?;
        writer
            .write_all(release_bytes)
            .map_err(|e| IndexError::io_error(path, e))?;

        // Write checksum
        writer
            .write_all(&self.checksum)
            .map_err(|e| IndexError::io_error(path, e))?;

        // Write payload (length-prefixed)
        writer
            .write_all(&(self.payload.len() as u64).to_le_bytes())
            .map_err(|e| IndexError::io_error(path, e))?;
        writer
            .write_all(&self.payload)
            .map_err(|e| IndexError::io_error(path, e))?;

        writer.flush().map_err(|e| IndexError::io_error(path, e))?;

        Ok(())
    }

    /// Loads and verifies a snapshot file.
    pub fn load<P: AsRef<Path>>(path: P) -> IndexResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| IndexError::io_error(path, e))?;
        let mut reader = BufReader::new(file);

        // Read and verify magic bytes
        let mut magic = [0u8; 4];
        reader
            .read_exact(&mut magic)
            .map_err(|e| IndexError::io_error(path, e))?;
        if &magic != SNAPSHOT_MAGIC {
            return Err(IndexError::invalid_format("Invalid magic bytes"));
        }

        // Read and verify version
        let mut version_bytes = [0u8; 4];
        reader
            .read_exact(&mut version_bytes)
            .map_err(|e| IndexError::io_error(path, e))?;
        let version = u32::from_le_bytes(version_bytes);
        if version != SNAPSHOT_VERSION {
            return Err(IndexError::invalid_format(format!(
                "Unsupported version: {} (expected {})",
                version, SNAPSHOT_VERSION
            )));
        }

        // Read release label
        let mut len_bytes = [0u8; 4];
        reader
            .read_exact(&mut len_bytes)
            .map_err(|e| IndexError::io_error(path, e))?;
        let release_len = u32::from_le_bytes(len_bytes) as usize;
        let mut release_bytes = vec![0u8; release_len];
        reader
            .read_exact(&mut release_bytes)
            .map_err(|e| IndexError::io_error(path, e))?;
        let release = String::from_utf8(release_bytes)
            .map_err(|_| IndexError::invalid_format("Release label is not UTF-8"))?;

        // Read checksum
        let mut expected = [0u8; 32];
        reader
            .read_exact(&mut expected)
            .map_err(|e| IndexError::io_error(path, e))?;

        // Read payload
        let mut payload_len = [0u8; 8];
        reader
            .read_exact(&mut payload_len)
            .map_err(|e| IndexError::io_error(path, e))?;
        let payload_len = usize::try_from(u64::from_le_bytes(payload_len))
            .map_err(|_| IndexError::invalid_format("Payload too large"))?;
        let mut payload = Vec::new();
        reader
            .take(payload_len as u64)
            .read_to_end(&mut payload)
            .map_err(|e| IndexError::io_error(path, e))?;
        if payload.len() != payload_len {
            return Err(IndexError::invalid_format(format!(
                "Truncated payload: expected {} bytes, got {}",
                payload_len,
                payload.len()
            )));
        }

        // Verify checksum
        let actual = checksum(&payload);
        if actual != expected {
            return Err(IndexError::ChecksumMismatch {
                expected: hex::encode(&expected),
                actual: hex::encode(&actual),
            });
        }

        let (rows, _): (SnapshotRows, usize) =
            bincode::serde::decode_from_slice(&payload, bincode::config::standard())
                .map_err(|e| IndexError::DeserializationError(e.to_string()))?;

        Ok(Self {
            release,
            checksum: actual,
            rows,
            payload,
        })
    }

    /// Rebuilds the index from the stored rows.
    pub fn into_snapshot(self) -> IndexResult<VocabularySnapshot> {
        VocabularySnapshot::build(self.rows.concepts, self.rows.relationships)
    }

    /// Returns the checksum as a hex string.
    pub fn checksum_hex(&self) -> String {
        hex::encode(&self.checksum)
    }

    /// Size of the encoded rows in bytes.
    pub fn payload_len(&self) -> usize {
        self.payload.len()
    }
}

fn checksum(payload: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(payload);
    hasher.finalize().into()
}

mod hex {
    pub fn encode(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use omop_vocab::StandardFlag;
    use tempfile::tempdir;

    fn create_test_snapshot() -> VocabularySnapshot {
        let concept = |id: i64, name: &str, vocabulary: &str, flag: StandardFlag| Concept {
            id,
            name: name.to_string(),
            code: format!("C{id}"),
            vocabulary: vocabulary.to_string(),
            domain: "Drug".to_string(),
            class: "Ingredient".to_string(),
            standard_flag: flag,
        };
        VocabularySnapshot::build(
            vec![
                concept(1308216, "lisinopril", "RxNorm", StandardFlag::Standard),
                concept(44000001, "Zestril 10mg", "NDC", StandardFlag::None),
            ],
            vec![Relationship::maps_to(44000001, 1308216)],
        )
        .unwrap()
    }

    #[test]
    fn test_save_and_load() {
        let snapshot = create_test_snapshot();
        let file = SnapshotFile::new("v5.0 2024-08-30", &snapshot).unwrap();

        let dir = tempdir().unwrap();
        let path = dir.path().join("vocabulary.ocvs");
        file.save(&path).unwrap();

        let loaded = SnapshotFile::load(&path).unwrap();
        assert_eq!(loaded.release, "v5.0 2024-08-30");
        assert_eq!(loaded.checksum, file.checksum);
        assert_eq!(loaded.rows, file.rows);

        let rebuilt = loaded.into_snapshot().unwrap();
        assert_eq!(rebuilt.len(), 2);
        assert_eq!(rebuilt.stats().maps_to_edges, 1);
    }

    #[test]
    fn test_rows_are_ordered_by_id() {
        let rows = SnapshotRows::from_snapshot(&create_test_snapshot());
        let ids: Vec<_> = rows.concepts.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1308216, 44000001]);
    }

    #[test]
    fn test_checksum_is_deterministic() {
        let snapshot = create_test_snapshot();
        let a = SnapshotFile::new("r", &snapshot).unwrap();
        let b = SnapshotFile::new("r", &snapshot).unwrap();
        assert_eq!(a.checksum_hex(), b.checksum_hex());
        assert_eq!(a.checksum_hex().len(), 64);
    }

    #[test]
    fn test_invalid_magic() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("invalid.ocvs");
        std::fs::write(&path, b"BAAD").unwrap();

        let err = SnapshotFile::load(&path).unwrap_err();
        assert!(matches!(err, IndexError::InvalidFormat { .. }));
    }

    #[test]
    fn test_corrupted_payload() {
        let file = SnapshotFile::new("r", &create_test_snapshot()).unwrap();
        let dir = tempdir().unwrap();
        let path = dir.path().join("corrupt.ocvs");
        file.save(&path).unwrap();

        let mut bytes = std::fs::read(&path).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xff;
        std::fs::write(&path, bytes).unwrap();

        let err = SnapshotFile::load(&path).unwrap_err();
        assert!(matches!(err, IndexError::ChecksumMismatch { .. }));
    }

    #[test]
    fn test_truncated_payload() {
        let file = SnapshotFile::new("r", &create_test_snapshot()).unwrap();
        let dir = tempdir().unwrap();
        let path = dir.path().join("short.ocvs");
        file.save(&path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        std::fs::write(&path, &bytes[..bytes.len() - 3]).unwrap();

        let err = SnapshotFile::load(&path).unwrap_err();
        assert!(matches!(err, IndexError::InvalidFormat { .. }));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        let err = SnapshotFile::load(dir.path().join("absent.ocvs")).unwrap_err();
        assert!(matches!(err, IndexError::IoError { .. }));
    }
}
