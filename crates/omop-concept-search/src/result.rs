//! Search result types.

use std::time::Duration;

use omop_vocab::ConceptId;

/// One output row: the matched concept and the standard concept it resolves to.
///
/// `standard_*` fields describe the resolved standard target (or the matched
/// concept itself when it has none). `searched_*` fields always describe the
/// concept that matched the query.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchRow {
    /// Resolved concept name.
    pub standard_name: String,
    /// Resolved concept id.
    pub standard_concept_id: ConceptId,
    /// Resolved concept code.
    pub standard_code: String,
    /// Resolved vocabulary.
    pub standard_vocabulary: String,
    /// Resolved concept class.
    pub standard_concept_class: String,
    /// Matched concept name.
    pub searched_name: String,
    /// Matched concept id.
    pub searched_concept_id: ConceptId,
    /// Matched concept code.
    pub searched_code: String,
    /// Matched vocabulary.
    pub searched_vocabulary: String,
    /// Matched concept class.
    pub searched_concept_class: String,
    /// `"<id> <code> <name>"` of the matched concept.
    pub searched_term: String,
}

/// Result of a search.
///
/// # Example
///
/// ```ignore
/// let result = searcher.search("lisinopril", "Drug")?;
///
/// println!("{} rows in {:?}", result.len(), result.stats.duration);
///
/// for row in &result {
///     println!("{} -> {}", row.searched_term, row.standard_name);
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct SearchResult {
    /// Ranked rows, at most the configured limit.
    pub rows: Vec<SearchRow>,
    /// Execution statistics.
    pub stats: SearchStats,
}

impl SearchResult {
    /// Creates a result.
    pub fn new(rows: Vec<SearchRow>, stats: SearchStats) -> Self {
        Self { rows, stats }
    }

    /// Creates an empty result.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if there are no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the first (best-ranked) row.
    pub fn first(&self) -> Option<&SearchRow> {
        self.rows.first()
    }

    /// Returns an iterator over rows in rank order.
    pub fn iter(&self) -> std::slice::Iter<'_, SearchRow> {
        self.rows.iter()
    }

    /// Returns the matched concept ids in rank order.
    pub fn searched_ids(&self) -> Vec<ConceptId> {
        self.rows.iter().map(|r| r.searched_concept_id).collect()
    }
}

impl IntoIterator for SearchResult {
    type Item = SearchRow;
    type IntoIter = std::vec::IntoIter<SearchRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a> IntoIterator for &'a SearchResult {
    type Item = &'a SearchRow;
    type IntoIter = std::slice::Iter<'a, SearchRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Statistics from a search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Total duration.
    pub duration: Duration,
    /// Candidates returned by the index.
    pub candidates: usize,
    /// Candidates that resolved to a mapped standard target.
    pub mapped: usize,
    /// Whether rows were dropped by the result limit.
    pub truncated: bool,
    /// Whether the result was served from cache.
    pub cache_hit: bool,
}

impl SearchStats {
    /// Stats for a result served from cache.
    pub fn cached(duration: Duration) -> Self {
        Self {
            duration,
            cache_hit: true,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: ConceptId) -> SearchRow {
        SearchRow {
            standard_name: "Lisinopril".to_string(),
            standard_concept_id: 1308216,
            standard_code: "29046".to_string(),
            standard_vocabulary: "RxNorm".to_string(),
            standard_concept_class: "Ingredient".to_string(),
            searched_name: "lisinopril".to_string(),
            searched_concept_id: id,
            searched_code: "C09AA03".to_string(),
            searched_vocabulary: "ATC".to_string(),
            searched_concept_class: "ATC 5th".to_string(),
            searched_term: format!("{id} C09AA03 lisinopril"),
        }
    }

    #[test]
    fn test_search_result_empty() {
        let result = SearchResult::empty();
        assert_eq!(result.len(), 0);
        assert!(result.is_empty());
        assert!(result.first().is_none());
    }

    #[test]
    fn test_search_result_order_preserved() {
        let result = SearchResult::new(vec![row(3), row(1), row(2)], SearchStats::default());
        assert_eq!(result.searched_ids(), vec![3, 1, 2]);
        assert_eq!(result.first().map(|r| r.searched_concept_id), Some(3));

        let ids: Vec<ConceptId> = (&result).into_iter().map(|r| r.searched_concept_id).collect();
        assert_eq!(ids, vec![3, 1, 2]);

        let owned: Vec<SearchRow> = result.into_iter().collect();
        assert_eq!(owned.len(), 3);
    }

    #[test]
    fn test_cached_stats() {
        let stats = SearchStats::cached(Duration::from_micros(40));
        assert!(stats.cache_hit);
        assert_eq!(stats.candidates, 0);
        assert!(!stats.truncated);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_row_serializes_with_column_names() {
        let json = serde_json::to_value(row(21601783)).unwrap();
        assert_eq!(json["standard_concept_id"], 1308216);
        assert_eq!(json["searched_term"], "21601783 C09AA03 lisinopril");
        assert_eq!(json["searched_concept_class"], "ATC 5th");
    }
}
