//! Trigram posting lists over uppercase search text.
//!
//! Every window of three consecutive characters in an entry's
//! `search_text_upper` records the entry's position in a roaring bitmap.
//! A substring of three or more characters can only occur in entries that
//! carry all of its trigrams, so intersecting the pattern's posting lists
//! yields a small superset of the matches without scanning the partition.
//!
//! # Example
//!
//! ```ignore
//! use omop_concept_index::trigram::TrigramPostings;
//!
//! let postings = TrigramPostings::build(["1 A LISINOPRIL", "2 B ENALAPRIL"].iter().copied());
//! let hits = postings.candidates("PRIL").unwrap();
//! assert_eq!(hits.len(), 2);
//! ```

use std::collections::HashMap;

use roaring::RoaringBitmap;

/// Window width.
pub const GRAM: usize = 3;

type Trigram = [char; GRAM];

/// Trigram → entry-position postings for one partition.
#[derive(Debug, Clone, Default)]
pub struct TrigramPostings {
    postings: HashMap<Trigram, RoaringBitmap>,
}

impl TrigramPostings {
    /// Creates empty postings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds postings from texts; the n-th text gets position n.
    ///
    /// Positions beyond `u32::MAX` are not representable; callers bound the
    /// partition size before building.
    pub fn build<'a, I>(texts: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut postings = Self::new();
        for (position, text) in texts.into_iter().enumerate() {
            if let Ok(position) = u32::try_from(position) {
                postings.insert(position, text);
            }
        }
        postings
    }

    /// Records every trigram of `text` at `position`.
    pub fn insert(&mut self, position: u32, text: &str) {
        let chars: Vec<char> = text.chars().collect();
        for window in chars.windows(GRAM) {
            let gram = [window[0], window[1], window[2]];
            self.postings.entry(gram).or_default().insert(position);
        }
    }

    /// Number of distinct trigrams.
    pub fn len(&self) -> usize {
        self.postings.len()
    }

    /// Returns true if no trigram has been recorded.
    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    /// Positions that may contain `pattern`.
    ///
    /// Returns `None` for patterns shorter than [`GRAM`] characters, which
    /// the postings cannot narrow; the caller must scan instead. The returned
    /// set is a superset of the true matches and must be verified.
    pub fn candidates(&self, pattern: &str) -> Option<RoaringBitmap> {
        let chars: Vec<char> = pattern.chars().collect();
        if chars.len() < GRAM {
            return None;
        }

        let mut lists = Vec::with_capacity(chars.len() - GRAM + 1);
        for window in chars.windows(GRAM) {
            let gram = [window[0], window[1], window[2]];
            match self.postings.get(&gram) {
                Some(list) => lists.push(list),
                None => return Some(RoaringBitmap::new()),
            }
        }

        // smallest first keeps intermediate results small
        lists.sort_by_key(|list| list.len());
        let (first, rest) = lists.split_first()?;
        let mut result = (*first).clone();
        for list in rest {
            result &= *list;
            if result.is_empty() {
                break;
            }
        }
        Some(result)
    }
}
