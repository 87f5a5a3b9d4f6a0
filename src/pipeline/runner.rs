//! Pipeline runner: orchestrates stage execution and artifact flow.
//!
//! [`AnalysisPipeline`] owns the tokenizer, a preprocessor and the stopword
//! set. [`AnalysisPipeline::run`] executes the stages in order, threading
//! artifacts between them and notifying a [`PipelineObserver`] at each
//! boundary:
//!
//! 1. tokenize (line view plus flat stream)
//! 2. preprocess (merge rules), then retag merged tokens
//! 3. count frequencies and select the vocabulary
//! 4. extract co-occurrence pairs between vocabulary words
//! 5. build the network
//!
//! # Static dispatch
//!
//! `AnalysisPipeline` is generic over the analyzer and the preprocessor, so
//! the default [`NoopPreprocessor`] adds zero bytes and zero runtime cost.

use crate::error::{KyokiError, Result};
use crate::graph::cooccurrence::{CooccurrenceExtractor, PairCounts};
use crate::graph::network::NetworkBuilder;
use crate::nlp::analyzer::MorphAnalyzer;
use crate::nlp::merge::MergeRuleSet;
use crate::nlp::pos_cache::PosCache;
use crate::nlp::stopwords::StopwordSet;
use crate::nlp::tokenizer::LineTokenizer;
use crate::pipeline::artifacts::AnalysisOutput;
use crate::pipeline::observer::{
    PipelineObserver, StageClock, StageReport, StageReportBuilder, STAGE_COOCCURRENCE,
    STAGE_FREQUENCY, STAGE_NETWORK, STAGE_PREPROCESS, STAGE_TOKENIZE,
};
use crate::pipeline::spec::ResolvedSpec;
use crate::pipeline::traits::{MergeRulePreprocessor, NoopPreprocessor, Preprocessor};
use crate::types::{AnalysisConfig, WindowMode};

// ============================================================================
// AnalysisPipeline
// ============================================================================

/// Tokenizer, preprocessor and stopwords composed into one runnable unit.
///
/// | Param | Trait | Default impl |
/// |-------|-------|--------------|
/// | `A`   | [`MorphAnalyzer`] | none |
/// | `Pre` | [`Preprocessor`] | [`NoopPreprocessor`] |
#[derive(Debug, Clone)]
pub struct AnalysisPipeline<A, Pre = NoopPreprocessor> {
    tokenizer: LineTokenizer<A>,
    preprocessor: Pre,
    stopwords: StopwordSet,
}

impl<A: MorphAnalyzer> AnalysisPipeline<A> {
    /// A pipeline with the default (Japanese) stopwords and no merge rules.
    pub fn new(analyzer: A) -> Self {
        Self {
            tokenizer: LineTokenizer::new(analyzer),
            preprocessor: NoopPreprocessor,
            stopwords: StopwordSet::new(),
        }
    }

    /// A pipeline using the stopwords and merge rules of a resolved spec.
    /// Run it with `spec.config`.
    pub fn from_spec(analyzer: A, spec: &ResolvedSpec) -> AnalysisPipeline<A, MergeRulePreprocessor> {
        Self::new(analyzer)
            .with_stopwords(spec.stopwords.clone())
            .with_merge_rules(spec.merge_rules.clone())
    }
}

impl<A: MorphAnalyzer, Pre: Preprocessor> AnalysisPipeline<A, Pre> {
    pub fn with_stopwords(mut self, stopwords: StopwordSet) -> Self {
        self.stopwords = stopwords;
        self
    }

    /// Replace the preprocessor stage.
    pub fn with_preprocessor<P: Preprocessor>(self, preprocessor: P) -> AnalysisPipeline<A, P> {
        AnalysisPipeline {
            tokenizer: self.tokenizer,
            preprocessor,
            stopwords: self.stopwords,
        }
    }

    /// Join multi-word expressions before counting.
    pub fn with_merge_rules(self, rules: MergeRuleSet) -> AnalysisPipeline<A, MergeRulePreprocessor> {
        self.with_preprocessor(MergeRulePreprocessor::new(rules))
    }

    pub fn tokenizer(&self) -> &LineTokenizer<A> {
        &self.tokenizer
    }

    pub fn preprocessor(&self) -> &Pre {
        &self.preprocessor
    }

    pub fn preprocessor_mut(&mut self) -> &mut Pre {
        &mut self.preprocessor
    }

    pub fn stopwords(&self) -> &StopwordSet {
        &self.stopwords
    }

    pub fn stopwords_mut(&mut self) -> &mut StopwordSet {
        &mut self.stopwords
    }

    // ========================================================================
    // run: execute stages in order
    // ========================================================================

    /// Execute the pipeline over `text`.
    ///
    /// Tokenization errors and an empty vocabulary abort the run. A network
    /// that cannot be built does not: the output then carries the reason in
    /// [`AnalysisOutput::network`].
    ///
    /// The `observer` receives callbacks at each stage boundary. Pass
    /// [`NoopObserver`](crate::pipeline::observer::NoopObserver) for
    /// zero-overhead execution.
    pub fn run(
        &self,
        text: &str,
        cfg: &AnalysisConfig,
        observer: &mut impl PipelineObserver,
    ) -> Result<AnalysisOutput> {
        // Stage 1: Tokenize
        trace_stage!(STAGE_TOKENIZE);
        observer.on_stage_start(STAGE_TOKENIZE);
        let clock = StageClock::start();
        let mut tokens = self.tokenizer.tokenize(text, &self.stopwords)?;
        let report = StageReportBuilder::new(clock.elapsed())
            .tokens(tokens.tokens.len())
            .lines(tokens.pre_tokens_lines.len())
            .build();
        observer.on_stage_end(STAGE_TOKENIZE, &report);

        // Stage 2: Preprocess + retag
        trace_stage!(STAGE_PREPROCESS);
        observer.on_stage_start(STAGE_PREPROCESS);
        let clock = StageClock::start();
        self.preprocessor.preprocess(&mut tokens, &self.stopwords);
        let mut cache = PosCache::new();
        self.tokenizer.retag(&mut tokens, &mut cache)?;
        let report = StageReportBuilder::new(clock.elapsed())
            .tokens(tokens.tokens.len())
            .build();
        observer.on_stage_end(STAGE_PREPROCESS, &report);
        observer.on_tokens(&tokens);

        // Stage 3: Frequencies + vocabulary
        trace_stage!(STAGE_FREQUENCY);
        observer.on_stage_start(STAGE_FREQUENCY);
        let clock = StageClock::start();
        let frequencies = tokens.frequencies();
        let vocabulary = frequencies.filter_by_minimum(cfg.min_frequency);
        if vocabulary.is_empty() {
            return Err(KyokiError::InsufficientFrequency {
                min_frequency: cfg.min_frequency,
            });
        }
        let top_words = vocabulary.top_k(cfg.top_k);
        let report = StageReportBuilder::new(clock.elapsed())
            .words(vocabulary.len())
            .build();
        observer.on_stage_end(STAGE_FREQUENCY, &report);
        observer.on_frequencies(&frequencies);

        // Stage 4: Co-occurrence pairs
        trace_stage!(STAGE_COOCCURRENCE);
        observer.on_stage_start(STAGE_COOCCURRENCE);
        let clock = StageClock::start();
        let extractor = CooccurrenceExtractor::from_config(cfg);
        let in_vocabulary = |w: &str| vocabulary.contains(w);
        let pairs = PairCounts::from_pairs(match cfg.window_mode {
            WindowMode::Sliding => extractor.sliding_pairs(&tokens.surfaces(), in_vocabulary),
            WindowMode::Line => extractor.line_pairs(&tokens.pre_token_surfaces(), in_vocabulary),
        });
        let report = StageReportBuilder::new(clock.elapsed())
            .pairs(pairs.len())
            .build();
        observer.on_stage_end(STAGE_COOCCURRENCE, &report);
        observer.on_pairs(&pairs);

        // Stage 5: Network
        trace_stage!(STAGE_NETWORK);
        observer.on_stage_start(STAGE_NETWORK);
        let clock = StageClock::start();
        let network = NetworkBuilder::from_config(cfg).build(&pairs, &frequencies);
        let report = match &network {
            Ok(net) => StageReportBuilder::new(clock.elapsed())
                .nodes(net.node_count())
                .edges(net.edge_count())
                .build(),
            Err(_) => StageReport::new(clock.elapsed()),
        };
        observer.on_stage_end(STAGE_NETWORK, &report);
        if let Ok(net) = &network {
            observer.on_network(net);
        }

        Ok(AnalysisOutput {
            config: cfg.clone(),
            tokens,
            frequencies,
            filtered_frequencies: vocabulary,
            top_words,
            pairs,
            network,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
