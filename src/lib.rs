//! # kyoki
//!
//! Word frequency and co-occurrence network extraction for text that has been
//! run through a morphological analyzer.
//!
//! The crate turns raw text into a curated token stream (one token sequence
//! per input line, plus a flat stream with part-of-speech tags), rewrites
//! multi-word expressions with user-defined merge rules, and derives two
//! structures from it:
//!
//! - a word-frequency table ([`frequency::FrequencyTable`])
//! - a co-occurrence network ([`graph::network::CooccurrenceNetwork`]) with
//!   integer edge weights and a community id on every node
//!
//! Rendering (word clouds, charts, network drawings) is left to the caller.
//!
//! ## Quick start
//!
//! ```rust
//! use kyoki::nlp::analyzer::UnicodeWordAnalyzer;
//! use kyoki::pipeline::runner::AnalysisPipeline;
//! use kyoki::pipeline::observer::NoopObserver;
//! use kyoki::types::AnalysisConfig;
//!
//! let pipeline = AnalysisPipeline::new(UnicodeWordAnalyzer::new());
//! let config = AnalysisConfig::default().with_min_frequency(1);
//! let output = pipeline
//!     .run("rust graph rust graph\nrust graph", &config, &mut NoopObserver)
//!     .unwrap();
//!
//! assert_eq!(output.frequencies.get("rust"), 3);
//! assert!(output.network.is_ok());
//! ```

/// Enter a tracing span for a pipeline stage (when the `tracing` feature is
/// enabled). When disabled, this is a no-op and the compiler eliminates it.
macro_rules! trace_stage {
    ($name:expr) => {
        #[cfg(feature = "tracing")]
        let _span = tracing::info_span!("pipeline_stage", stage = $name).entered();
    };
}

/// Emit a `debug`-level tracing event when the `tracing` feature is enabled.
macro_rules! trace_event {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        tracing::debug!($($arg)*);
    };
}

pub mod edit;
pub mod error;
pub mod frequency;
pub mod graph;
pub mod nlp;
pub mod pipeline;
pub mod types;

pub use error::{ErrorCode, InsufficientGraphData, KyokiError, Result};
pub use frequency::FrequencyTable;
pub use graph::cooccurrence::{CooccurrenceExtractor, PairCounts};
pub use graph::network::{CooccurrenceNetwork, NetworkBuilder};
pub use nlp::analyzer::MorphAnalyzer;
pub use nlp::merge::{MergeRule, MergeRuleSet};
pub use nlp::stopwords::StopwordSet;
pub use nlp::tokenizer::{LineTokenizer, TokenizedText};
pub use types::{AnalysisConfig, CooccurrencePair, SelfLoopPolicy, TaggedToken, WindowMode};
