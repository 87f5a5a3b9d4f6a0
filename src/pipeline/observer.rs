//! Pipeline observer: hooks for logging, profiling, and debugging.
//!
//! Observers receive notifications at stage boundaries without coupling to
//! stage logic. Use cases include timing stages, capturing intermediate
//! artifacts for a UI preview, and emitting structured telemetry.
//!
//! Every hook has an empty default body, so an observer implements only what
//! it needs. [`NoopObserver`] implements nothing and compiles away.

use std::time::{Duration, Instant};

use serde::Serialize;

use crate::frequency::FrequencyTable;
use crate::graph::cooccurrence::PairCounts;
use crate::graph::network::CooccurrenceNetwork;
use crate::nlp::tokenizer::TokenizedText;

// ============================================================================
// Stage names
// ============================================================================

pub const STAGE_TOKENIZE: &str = "tokenize";
pub const STAGE_PREPROCESS: &str = "preprocess";
pub const STAGE_FREQUENCY: &str = "frequency";
pub const STAGE_COOCCURRENCE: &str = "cooccurrence";
pub const STAGE_NETWORK: &str = "network";

/// Stage names in execution order.
pub const STAGES: [&str; 5] = [
    STAGE_TOKENIZE,
    STAGE_PREPROCESS,
    STAGE_FREQUENCY,
    STAGE_COOCCURRENCE,
    STAGE_NETWORK,
];

// ============================================================================
// StageClock / StageReport
// ============================================================================

/// Wall-clock timer for one stage.
#[derive(Debug, Clone, Copy)]
pub struct StageClock {
    started: Instant,
}

impl StageClock {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// What a stage did: its duration plus whichever counts apply to it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StageReport {
    #[serde(with = "duration_micros")]
    elapsed: Duration,
    #[serde(skip_serializing_if = "Option::is_none")]
    tokens: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    lines: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    words: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pairs: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    nodes: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    edges: Option<usize>,
}

impl StageReport {
    /// A report carrying only the elapsed time.
    pub fn new(elapsed: Duration) -> Self {
        Self {
            elapsed,
            ..Self::default()
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1000.0
    }

    /// Tokens in the flat stream
    pub fn tokens(&self) -> Option<usize> {
        self.tokens
    }

    /// Input lines
    pub fn lines(&self) -> Option<usize> {
        self.lines
    }

    /// Distinct words kept
    pub fn words(&self) -> Option<usize> {
        self.words
    }

    /// Distinct co-occurrence pairs
    pub fn pairs(&self) -> Option<usize> {
        self.pairs
    }

    pub fn nodes(&self) -> Option<usize> {
        self.nodes
    }

    pub fn edges(&self) -> Option<usize> {
        self.edges
    }
}

/// Builder for [`StageReport`]s with counts attached.
#[derive(Debug, Clone)]
pub struct StageReportBuilder {
    report: StageReport,
}

impl StageReportBuilder {
    pub fn new(elapsed: Duration) -> Self {
        Self {
            report: StageReport::new(elapsed),
        }
    }

    pub fn tokens(mut self, n: usize) -> Self {
        self.report.tokens = Some(n);
        self
    }

    pub fn lines(mut self, n: usize) -> Self {
        self.report.lines = Some(n);
        self
    }

    pub fn words(mut self, n: usize) -> Self {
        self.report.words = Some(n);
        self
    }

    pub fn pairs(mut self, n: usize) -> Self {
        self.report.pairs = Some(n);
        self
    }

    pub fn nodes(mut self, n: usize) -> Self {
        self.report.nodes = Some(n);
        self
    }

    pub fn edges(mut self, n: usize) -> Self {
        self.report.edges = Some(n);
        self
    }

    pub fn build(self) -> StageReport {
        self.report
    }
}

mod duration_micros {
    use std::time::Duration;

    use serde::Serializer;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u128(d.as_micros())
    }
}

// ============================================================================
// PipelineObserver
// ============================================================================

/// Callbacks fired by [`AnalysisPipeline::run`](super::runner::AnalysisPipeline::run).
///
/// Stage hooks fire for every stage that starts; artifact hooks fire once the
/// corresponding artifact exists. A run that fails part-way stops notifying
/// at the failing stage.
pub trait PipelineObserver {
    fn on_stage_start(&mut self, _stage: &'static str) {}

    fn on_stage_end(&mut self, _stage: &'static str, _report: &StageReport) {}

    /// Tokens after merge rules have been applied
    fn on_tokens(&mut self, _tokens: &TokenizedText) {}

    /// The unfiltered frequency table
    fn on_frequencies(&mut self, _frequencies: &FrequencyTable) {}

    fn on_pairs(&mut self, _pairs: &PairCounts) {}

    fn on_network(&mut self, _network: &CooccurrenceNetwork) {}
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {}

/// Records the report of every finished stage, in order.
#[derive(Debug, Clone, Default)]
pub struct StageTimingObserver {
    reports: Vec<(&'static str, StageReport)>,
}

impl StageTimingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> &[(&'static str, StageReport)] {
        &self.reports
    }

    /// The report for `stage`, if it finished.
    pub fn report(&self, stage: &str) -> Option<&StageReport> {
        self.reports
            .iter()
            .find(|(name, _)| *name == stage)
            .map(|(_, report)| report)
    }

    /// Sum of all stage durations
    pub fn total(&self) -> Duration {
        self.reports.iter().map(|(_, r)| r.elapsed()).sum()
    }

    /// One line per stage, for logs.
    pub fn summary(&self) -> String {
        self.reports
            .iter()
            .map(|(name, r)| format!("{name}: {:.3} ms", r.elapsed_ms()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl PipelineObserver for StageTimingObserver {
    fn on_stage_end(&mut self, stage: &'static str, report: &StageReport) {
        self.reports.push((stage, report.clone()));
    }
}
