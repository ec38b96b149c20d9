//! Statistics about vocabulary snapshot builds.

use std::collections::BTreeMap;

/// Statistics about a vocabulary snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapshotStats {
    /// Generation of the snapshot these stats describe.
    pub generation: u64,
    /// Number of concepts in the snapshot.
    pub concept_count: usize,
    /// Search entries per domain.
    pub entries_per_domain: BTreeMap<String, usize>,
    /// Number of distinct trigrams across all partitions.
    pub trigram_count: usize,
    /// Number of maps-to edges.
    pub maps_to_edges: usize,
    /// Number of edges of any other kind.
    pub other_edges: usize,
    /// Edges whose target concept is absent from the snapshot.
    pub dangling_edges: usize,
    /// Time taken to build in milliseconds.
    pub build_time_ms: u64,
}

impl SnapshotStats {
    /// Total number of search entries.
    pub fn entry_count(&self) -> usize {
        self.entries_per_domain.values().sum()
    }

    /// Number of domain partitions.
    pub fn domain_count(&self) -> usize {
        self.entries_per_domain.len()
    }
}

impl std::fmt::Display for SnapshotStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Vocabulary Snapshot Statistics:")?;
        writeln!(f, "  Generation:      {}", self.generation)?;
        writeln!(f, "  Concepts:        {}", self.concept_count)?;
        writeln!(f, "  Search entries:  {}", self.entry_count())?;
        for (domain, count) in &self.entries_per_domain {
            writeln!(f, "    {:<14} {}", domain, count)?;
        }
        writeln!(f, "  Trigrams:        {}", self.trigram_count)?;
        writeln!(f, "  Maps-to edges:   {}", self.maps_to_edges)?;
        writeln!(f, "  Other edges:     {}", self.other_edges)?;
        writeln!(f, "  Dangling edges:  {}", self.dangling_edges)?;
        writeln!(f, "  Build time:      {}ms", self.build_time_ms)?;
        Ok(())
    }
}
