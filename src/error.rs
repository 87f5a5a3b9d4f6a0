//! Error types.
//!
//! Every failure the core can produce is a variant of [`KyokiError`]. None of
//! them are fatal to the process: the caller decides how to present them,
//! using [`KyokiError::code`] for a stable key and [`KyokiError::hint`] for a
//! suggested remedy.

use std::fmt;
use std::io;

use serde::Serialize;
use thiserror::Error;

pub use crate::pipeline::error_code::ErrorCode;
use crate::pipeline::errors::PipelineSpecError;

/// Result type alias for fallible kyoki operations.
pub type Result<T> = std::result::Result<T, KyokiError>;

/// The main error type.
#[derive(Error, Debug)]
pub enum KyokiError {
    /// The analyzer backend could not be constructed or reached.
    #[error("morphological analyzer '{analyzer}' is unavailable: {reason}")]
    AnalyzerUnavailable { analyzer: String, reason: String },

    /// The analyzer was reachable but failed while analyzing.
    #[error("morphological analysis failed: {0}")]
    Analysis(String),

    /// Empty or whitespace-only text was passed in.
    #[error("input text is empty")]
    EmptyInput,

    /// The analyzer produced no tokens for non-empty input.
    #[error("analyzer produced no tokens for {chars} characters of input")]
    AnalysisYieldedNothing { chars: usize },

    /// No word reaches the minimum frequency.
    #[error("no words occur at least {min_frequency} times")]
    InsufficientFrequency { min_frequency: usize },

    /// Network construction could not produce a usable graph.
    #[error(transparent)]
    InsufficientGraphData(#[from] InsufficientGraphData),

    /// A merge rule with the same token sequence already exists.
    #[error("a merge rule for ({}) already exists", .sequence.join(", "))]
    DuplicateMergeRule { sequence: Vec<String> },

    /// A merge rule's declared length differs from its token count.
    #[error("merge rule declares {declared} tokens but {actual} were given")]
    MergeRuleLengthMismatch { declared: usize, actual: usize },

    /// The analysis spec failed validation.
    #[error("invalid analysis spec: {}", .errors.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    InvalidConfig { errors: Vec<PipelineSpecError> },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl KyokiError {
    /// Create an analyzer-unavailable error.
    pub fn analyzer_unavailable(analyzer: impl Into<String>, reason: impl Into<String>) -> Self {
        KyokiError::AnalyzerUnavailable {
            analyzer: analyzer.into(),
            reason: reason.into(),
        }
    }

    /// Create an analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        KyokiError::Analysis(msg.into())
    }

    /// Stable code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::AnalyzerUnavailable { .. } => ErrorCode::AnalyzerUnavailable,
            Self::Analysis(_) => ErrorCode::AnalysisFailed,
            Self::EmptyInput => ErrorCode::EmptyInput,
            Self::AnalysisYieldedNothing { .. } => ErrorCode::AnalysisYieldedNothing,
            Self::InsufficientFrequency { .. } => ErrorCode::InsufficientFrequency,
            Self::InsufficientGraphData(kind) => kind.code(),
            Self::DuplicateMergeRule { .. } => ErrorCode::DuplicateMergeRule,
            Self::MergeRuleLengthMismatch { .. } => ErrorCode::MergeRuleLengthMismatch,
            Self::InvalidConfig { errors } => errors
                .first()
                .map(|e| e.code)
                .unwrap_or(ErrorCode::InvalidValue),
            Self::Io(_) => ErrorCode::Io,
            Self::Json(_) | Self::Csv(_) => ErrorCode::Serialization,
        }
    }

    /// Suggested remedy, suitable for showing next to the message.
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::AnalyzerUnavailable { .. } => {
                Some("Install the analyzer and its dictionary, then retry".to_string())
            }
            Self::EmptyInput => Some("Load or type some text first".to_string()),
            Self::AnalysisYieldedNothing { .. } => {
                Some("Check the analyzer's dictionary and output format settings".to_string())
            }
            Self::InsufficientFrequency { min_frequency } => Some(format!(
                "Lower the minimum frequency below {min_frequency}"
            )),
            Self::InsufficientGraphData(kind) => Some(kind.hint()),
            Self::DuplicateMergeRule { .. } => {
                Some("Remove the existing rule before adding it again".to_string())
            }
            Self::MergeRuleLengthMismatch { .. } => {
                Some("Merge rules join 2, 3 or 4 tokens".to_string())
            }
            Self::InvalidConfig { errors } => errors.iter().find_map(|e| e.hint.clone()),
            Self::Analysis(_) | Self::Io(_) | Self::Json(_) | Self::Csv(_) => None,
        }
    }
}

/// Why the co-occurrence network could not be built.
///
/// Each kind corresponds to one gate of network construction and carries the
/// numbers a caller needs to suggest a specific remedy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InsufficientGraphData {
    /// No pair reached the minimum co-occurrence count.
    NoPairs {
        min_cooccurrence: usize,
        distinct_pairs: usize,
        max_count: usize,
    },
    /// Every candidate edge was removed (self-loops or thresholds).
    NoEdges {
        candidate_pairs: usize,
        self_loops_removed: usize,
    },
    /// Fewer than two nodes remained after component and weight pruning.
    TooSmallAfterFiltering { nodes: usize, min_weight: u64 },
}

impl InsufficientGraphData {
    /// Stable code for this kind.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NoPairs { .. } => ErrorCode::NoCooccurrencePairs,
            Self::NoEdges { .. } => ErrorCode::NoEdges,
            Self::TooSmallAfterFiltering { .. } => ErrorCode::NetworkTooSmall,
        }
    }

    /// Suggested remedy.
    pub fn hint(&self) -> String {
        match self {
            Self::NoPairs {
                min_cooccurrence,
                max_count,
                ..
            } if *max_count > 0 => format!(
                "Lower the minimum co-occurrence count from {min_cooccurrence} to {max_count} or less"
            ),
            Self::NoPairs { .. } => {
                "Widen the co-occurrence window or lower the minimum frequency".to_string()
            }
            Self::NoEdges {
                self_loops_removed, ..
            } if *self_loops_removed > 0 => {
                "Keep self-loops or increase the number of edges shown".to_string()
            }
            Self::NoEdges { .. } => "Increase the number of edges shown".to_string(),
            Self::TooSmallAfterFiltering { .. } => {
                "Widen the co-occurrence window, lower the thresholds, or show more edges"
                    .to_string()
            }
        }
    }
}

impl fmt::Display for InsufficientGraphData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoPairs {
                min_cooccurrence,
                distinct_pairs,
                ..
            } => write!(
                f,
                "insufficient co-occurrence data: none of {distinct_pairs} pairs occur at least {min_cooccurrence} times"
            ),
            Self::NoEdges {
                candidate_pairs,
                self_loops_removed,
            } => write!(
                f,
                "no edges left from {candidate_pairs} candidate pairs ({self_loops_removed} self-loops removed)"
            ),
            Self::TooSmallAfterFiltering { nodes, min_weight } => write!(
                f,
                "insufficient network after filtering: {nodes} node(s) left with edge weight >= {min_weight}"
            ),
        }
    }
}

impl std::error::Error for InsufficientGraphData {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graph_kinds_have_distinct_codes() {
        let kinds = [
            InsufficientGraphData::NoPairs {
                min_cooccurrence: 3,
                distinct_pairs: 4,
                max_count: 2,
            },
            InsufficientGraphData::NoEdges {
                candidate_pairs: 1,
                self_loops_removed: 1,
            },
            InsufficientGraphData::TooSmallAfterFiltering {
                nodes: 1,
                min_weight: 2,
            },
        ];
        let codes: Vec<_> = kinds.iter().map(|k| k.code()).collect();
        assert_eq!(
            codes,
            vec![
                ErrorCode::NoCooccurrencePairs,
                ErrorCode::NoEdges,
                ErrorCode::NetworkTooSmall
            ]
        );
    }

    #[test]
    fn test_analysis_failure_is_not_unavailability() {
        assert_eq!(
            KyokiError::analysis("unexpected output").code(),
            ErrorCode::AnalysisFailed
        );
        assert_eq!(
            KyokiError::analyzer_unavailable("mecab", "not found").code(),
            ErrorCode::AnalyzerUnavailable
        );
    }

    #[test]
    fn test_no_pairs_hint_suggests_reachable_threshold() {
        let kind = InsufficientGraphData::NoPairs {
            min_cooccurrence: 5,
            distinct_pairs: 10,
            max_count: 3,
        };
        assert!(kind.hint().contains("from 5 to 3"));
    }

    #[test]
    fn test_wrapped_graph_error_keeps_code() {
        let err: KyokiError = InsufficientGraphData::NoEdges {
            candidate_pairs: 2,
            self_loops_removed: 2,
        }
        .into();
        assert_eq!(err.code(), ErrorCode::NoEdges);
        assert!(err.hint().unwrap().contains("self-loops"));
    }

    #[test]
    fn test_duplicate_rule_message() {
        let err = KyokiError::DuplicateMergeRule {
            sequence: vec!["人工".into(), "知能".into()],
        };
        assert_eq!(err.to_string(), "a merge rule for (人工, 知能) already exists");
    }

    #[test]
    fn test_invalid_config_message_lists_errors() {
        let err = KyokiError::InvalidConfig {
            errors: vec![PipelineSpecError::new(
                ErrorCode::InvalidValue,
                "/max_edges",
                "max_edges must be greater than 0",
            )],
        };
        assert_eq!(err.code(), ErrorCode::InvalidValue);
        assert!(err.to_string().contains("/max_edges"));
    }
}
