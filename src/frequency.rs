//! Word frequency aggregation
//!
//! Counts are kept in first-seen order, which is also the tie-break for
//! [`FrequencyTable::top_k`]: among words with equal counts, the one that
//! appeared first in the token stream ranks first.

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::types::TaggedToken;

/// A word and how often it occurs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrequencyEntry {
    pub word: String,
    pub count: usize,
}

/// Token → occurrence count, in first-seen order
#[derive(Debug, Clone, Default, Serialize)]
pub struct FrequencyTable {
    entries: Vec<FrequencyEntry>,
    #[serde(skip)]
    index: FxHashMap<String, usize>,
}

impl PartialEq for FrequencyTable {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for FrequencyTable {}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count every token in the stream.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut table = Self::new();
        for token in tokens {
            table.add(token.as_ref());
        }
        table
    }

    /// Count part-of-speech tags instead of surfaces.
    pub fn pos_breakdown(tokens: &[TaggedToken]) -> Self {
        Self::from_tokens(tokens.iter().map(|t| t.pos.as_str()))
    }

    /// Record one occurrence of `word`.
    pub fn add(&mut self, word: &str) {
        self.add_n(word, 1);
    }

    /// Record `n` occurrences of `word`.
    pub fn add_n(&mut self, word: &str, n: usize) {
        if n == 0 {
            return;
        }
        match self.index.get(word) {
            Some(&slot) => self.entries[slot].count += n,
            None => {
                self.index.insert(word.to_string(), self.entries.len());
                self.entries.push(FrequencyEntry {
                    word: word.to_string(),
                    count: n,
                });
            }
        }
    }

    /// Count for `word` (0 when absent)
    pub fn get(&self, word: &str) -> usize {
        self.index
            .get(word)
            .map(|&slot| self.entries[slot].count)
            .unwrap_or(0)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.index.contains_key(word)
    }

    /// Number of distinct words
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts
    pub fn total(&self) -> usize {
        self.entries.iter().map(|e| e.count).sum()
    }

    /// Highest count, or 0 for an empty table
    pub fn max_count(&self) -> usize {
        self.entries.iter().map(|e| e.count).max().unwrap_or(0)
    }

    /// Entries in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> + '_ {
        self.entries.iter().map(|e| (e.word.as_str(), e.count))
    }

    /// Keep only words occurring at least `min` times.
    pub fn filter_by_minimum(&self, min: usize) -> FrequencyTable {
        let mut kept = FrequencyTable::new();
        for entry in self.entries.iter().filter(|e| e.count >= min) {
            kept.add_n(&entry.word, entry.count);
        }
        kept
    }

    /// The `k` most frequent words, count descending, ties in first-seen order.
    pub fn top_k(&self, k: usize) -> Vec<FrequencyEntry> {
        let mut ranked = self.entries.clone();
        // Stable sort keeps first-seen order among equal counts.
        ranked.sort_by(|a, b| b.count.cmp(&a.count));
        ranked.truncate(k);
        ranked
    }

    /// Every entry, most frequent first.
    pub fn most_common(&self) -> Vec<FrequencyEntry> {
        self.top_k(self.entries.len())
    }

    /// Entries whose word contains `term` (case-insensitive), most frequent
    /// first. An empty term matches everything.
    pub fn search(&self, term: &str) -> Vec<FrequencyEntry> {
        let needle = term.to_lowercase();
        self.most_common()
            .into_iter()
            .filter(|e| e.word.to_lowercase().contains(&needle))
            .collect()
    }
}

impl<S: AsRef<str>> FromIterator<S> for FrequencyTable {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::from_tokens(iter)
    }
}
