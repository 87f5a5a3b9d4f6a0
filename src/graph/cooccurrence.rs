//! Co-occurrence pair extraction and counting
//!
//! Two windowing modes are supported:
//!
//! - **sliding**: a fixed-size window over the flat token stream. Token `i`
//!   pairs with every token `j` where `i < j < i + window_size`.
//! - **line**: every pair of tokens on the same input line, regardless of
//!   distance. Pairs never cross a line boundary.
//!
//! Only tokens accepted by the vocabulary predicate take part. Every pair is
//! canonicalized ([`CooccurrencePair`]) so direction never matters.

use std::io;

use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;

use crate::error::Result;
use crate::types::{AnalysisConfig, CooccurrencePair, WindowMode};

/// Line counts at or above this are paired on the rayon pool.
const PARALLEL_LINE_THRESHOLD: usize = 256;

/// Emits canonical co-occurrence pairs from tokens or lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CooccurrenceExtractor {
    mode: WindowMode,
    window_size: usize,
    collapse_consecutive: bool,
    dedup_per_line: bool,
}

impl Default for CooccurrenceExtractor {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}

impl CooccurrenceExtractor {
    pub fn new(mode: WindowMode, window_size: usize) -> Self {
        Self {
            mode,
            window_size,
            collapse_consecutive: false,
            dedup_per_line: false,
        }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            mode: config.window_mode,
            window_size: config.window_size,
            collapse_consecutive: config.collapse_consecutive,
            dedup_per_line: config.dedup_per_line,
        }
    }

    pub fn with_collapse_consecutive(mut self, collapse: bool) -> Self {
        self.collapse_consecutive = collapse;
        self
    }

    pub fn with_dedup_per_line(mut self, dedup: bool) -> Self {
        self.dedup_per_line = dedup;
        self
    }

    pub fn mode(&self) -> WindowMode {
        self.mode
    }

    /// Extract and count pairs according to the configured mode.
    ///
    /// `tokens` feeds sliding mode, `lines` feeds line mode.
    pub fn extract<T, L, F>(&self, tokens: &[T], lines: &[Vec<L>], in_vocabulary: F) -> PairCounts
    where
        T: AsRef<str>,
        L: AsRef<str> + Sync,
        F: Fn(&str) -> bool + Sync,
    {
        let pairs = match self.mode {
            WindowMode::Sliding => self.sliding_pairs(tokens, in_vocabulary),
            WindowMode::Line => self.line_pairs(lines, in_vocabulary),
        };
        PairCounts::from_pairs(pairs)
    }

    /// Sliding-window pairs over a flat stream, in emission order.
    ///
    /// Collapsing happens before windowing; tokens outside the vocabulary
    /// still occupy window positions.
    pub fn sliding_pairs<S, F>(&self, tokens: &[S], in_vocabulary: F) -> Vec<CooccurrencePair>
    where
        S: AsRef<str>,
        F: Fn(&str) -> bool,
    {
        let mut stream: Vec<&str> = tokens.iter().map(|t| t.as_ref()).collect();
        if self.collapse_consecutive {
            stream.dedup();
        }

        let mut pairs = Vec::new();
        for i in 0..stream.len() {
            if !in_vocabulary(stream[i]) {
                continue;
            }
            let end = i.saturating_add(self.window_size).min(stream.len());
            for j in (i + 1)..end {
                if in_vocabulary(stream[j]) {
                    pairs.push(CooccurrencePair::new(stream[i], stream[j]));
                }
            }
        }
        pairs
    }

    /// Exhaustive per-line pairs, in line order.
    ///
    /// Each line is restricted to the vocabulary first, then collapsed.
    /// Many lines are processed in parallel; output order is the same as
    /// the sequential order.
    pub fn line_pairs<S, F>(&self, lines: &[Vec<S>], in_vocabulary: F) -> Vec<CooccurrencePair>
    where
        S: AsRef<str> + Sync,
        F: Fn(&str) -> bool + Sync,
    {
        if lines.len() >= PARALLEL_LINE_THRESHOLD {
            lines
                .par_iter()
                .map(|line| self.pairs_in_line(line, &in_vocabulary))
                .collect::<Vec<_>>()
                .into_iter()
                .flatten()
                .collect()
        } else {
            lines
                .iter()
                .flat_map(|line| self.pairs_in_line(line, &in_vocabulary))
                .collect()
        }
    }

    fn pairs_in_line<S, F>(&self, line: &[S], in_vocabulary: &F) -> Vec<CooccurrencePair>
    where
        S: AsRef<str>,
        F: Fn(&str) -> bool,
    {
        let mut kept: Vec<&str> = line
            .iter()
            .map(|t| t.as_ref())
            .filter(|&t| in_vocabulary(t))
            .collect();
        if self.collapse_consecutive {
            kept.dedup();
        }
        if kept.len() < 2 {
            return Vec::new();
        }

        let mut seen: FxHashSet<CooccurrencePair> = FxHashSet::default();
        let mut pairs = Vec::new();
        for i in 0..kept.len() {
            for j in (i + 1)..kept.len() {
                let pair = CooccurrencePair::new(kept[i], kept[j]);
                if self.dedup_per_line && !seen.insert(pair.clone()) {
                    continue;
                }
                pairs.push(pair);
            }
        }
        pairs
    }
}

/// One row of the exported pair table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PairRow {
    pub word1: String,
    pub word2: String,
    pub count: usize,
}

/// Multiset of canonical pairs, in first-seen order
#[derive(Debug, Clone, Default)]
pub struct PairCounts {
    entries: Vec<(CooccurrencePair, usize)>,
    index: FxHashMap<CooccurrencePair, usize>,
}

impl PartialEq for PairCounts {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl PairCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a sequence of pairs.
    pub fn from_pairs<I: IntoIterator<Item = CooccurrencePair>>(pairs: I) -> Self {
        let mut counts = Self::new();
        for pair in pairs {
            counts.add_n(pair, 1);
        }
        counts
    }

    pub fn add(&mut self, a: &str, b: &str) {
        self.add_n(CooccurrencePair::new(a, b), 1);
    }

    pub fn add_n(&mut self, pair: CooccurrencePair, n: usize) {
        match self.index.get(&pair) {
            Some(&slot) => self.entries[slot].1 += n,
            None => {
                self.index.insert(pair.clone(), self.entries.len());
                self.entries.push((pair, n));
            }
        }
    }

    /// Count for the pair `{a, b}` in either order
    pub fn get(&self, a: &str, b: &str) -> usize {
        self.index
            .get(&CooccurrencePair::new(a, b))
            .map(|&slot| self.entries[slot].1)
            .unwrap_or(0)
    }

    /// Number of distinct pairs
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of pair occurrences
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, c)| c).sum()
    }

    pub fn max_count(&self) -> usize {
        self.entries.iter().map(|(_, c)| *c).max().unwrap_or(0)
    }

    /// Pairs in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (&CooccurrencePair, usize)> + '_ {
        self.entries.iter().map(|(p, c)| (p, *c))
    }

    /// Keep pairs observed at least `min` times.
    pub fn retain_min(&self, min: usize) -> PairCounts {
        let mut kept = PairCounts::new();
        for (pair, count) in self.iter().filter(|&(_, c)| c >= min) {
            kept.add_n(pair.clone(), count);
        }
        kept
    }

    /// Up to `n` pairs, count descending, ties in first-seen order.
    pub fn most_common(&self, n: usize) -> Vec<(&CooccurrencePair, usize)> {
        let mut ranked: Vec<_> = self.iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(n);
        ranked
    }

    /// Table rows with count ≥ `min`, count descending, ties by pair.
    pub fn rows(&self, min: usize) -> Vec<PairRow> {
        let mut rows: Vec<PairRow> = self
            .iter()
            .filter(|&(_, c)| c >= min)
            .map(|(pair, count)| PairRow {
                word1: pair.first().to_string(),
                word2: pair.second().to_string(),
                count,
            })
            .collect();
        rows.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.word1.cmp(&b.word1))
                .then_with(|| a.word2.cmp(&b.word2))
        });
        rows
    }

    /// Write [`rows`](Self::rows) as CSV with a `word1,word2,count` header.
    pub fn write_csv<W: io::Write>(&self, writer: W, min: usize) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        let rows = self.rows(min);
        if rows.is_empty() {
            csv_writer.write_record(["word1", "word2", "count"])?;
        }
        for row in rows {
            csv_writer.serialize(row)?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

impl FromIterator<CooccurrencePair> for PairCounts {
    fn from_iter<I: IntoIterator<Item = CooccurrencePair>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}
