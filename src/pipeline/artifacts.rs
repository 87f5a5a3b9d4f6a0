//! Pipeline artifacts.
//!
//! [`AnalysisOutput`] bundles everything one run of
//! [`AnalysisPipeline`](super::runner::AnalysisPipeline) produces, ready for
//! a renderer: the curated tokens, the frequency chart data, the pair table
//! and the network.
//!
//! A network that cannot be built is not a failed run. The frequency side is
//! still useful, so the network is kept as a `Result` and the caller decides
//! how to present the [`InsufficientGraphData`] reason.

use std::io;

use serde::Serialize;

use crate::error::{InsufficientGraphData, Result};
use crate::frequency::{FrequencyEntry, FrequencyTable};
use crate::graph::cooccurrence::{PairCounts, PairRow};
use crate::graph::network::CooccurrenceNetwork;
use crate::nlp::tokenizer::TokenizedText;
use crate::types::AnalysisConfig;

/// Everything one pipeline run produces
#[derive(Debug, Clone)]
pub struct AnalysisOutput {
    /// Settings the run used
    pub config: AnalysisConfig,
    /// Tokens after merge rules and retagging
    pub tokens: TokenizedText,
    /// Counts over the whole filtered stream
    pub frequencies: FrequencyTable,
    /// Counts of words at or above the minimum frequency (the vocabulary)
    pub filtered_frequencies: FrequencyTable,
    /// Chart data: the `top_k` most frequent vocabulary words
    pub top_words: Vec<FrequencyEntry>,
    /// Co-occurrence counts between vocabulary words
    pub pairs: PairCounts,
    pub network: std::result::Result<CooccurrenceNetwork, InsufficientGraphData>,
}

impl AnalysisOutput {
    pub fn vocabulary_size(&self) -> usize {
        self.filtered_frequencies.len()
    }

    /// The network, if one could be built
    pub fn network(&self) -> Option<&CooccurrenceNetwork> {
        self.network.as_ref().ok()
    }

    /// Why no network could be built
    pub fn network_error(&self) -> Option<&InsufficientGraphData> {
        self.network.as_ref().err()
    }

    /// Pair table rows at or above the configured minimum co-occurrence
    pub fn pair_rows(&self) -> Vec<PairRow> {
        self.pairs.rows(self.config.min_cooccurrence)
    }

    /// Write [`pair_rows`](Self::pair_rows) as CSV.
    pub fn write_pairs_csv<W: io::Write>(&self, writer: W) -> Result<()> {
        self.pairs.write_csv(writer, self.config.min_cooccurrence)
    }

    /// Serializable digest of the run
    pub fn summary(&self) -> OutputSummary {
        OutputSummary {
            tokens: self.tokens.tokens.len(),
            lines: self.tokens.original_lines.len(),
            distinct_words: self.frequencies.len(),
            vocabulary: self.vocabulary_size(),
            distinct_pairs: self.pairs.len(),
            top_words: self.top_words.clone(),
            network: self.network.as_ref().map(|n| n.summary().clone()).ok(),
            network_error: self.network_error().map(ToString::to_string),
        }
    }
}

/// Counts and headline results of a run, for JSON consumers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputSummary {
    pub tokens: usize,
    /// Lines that kept at least one token
    pub lines: usize,
    pub distinct_words: usize,
    pub vocabulary: usize,
    pub distinct_pairs: usize,
    pub top_words: Vec<FrequencyEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<crate::graph::network::NetworkSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_error: Option<String>,
}
