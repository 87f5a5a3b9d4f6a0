//! Stable machine-readable error codes.
//!
//! Codes are serialized in `snake_case` and never renamed once published, so
//! UI layers can key user-facing messages off them.

use std::fmt;

use serde::Serialize;

/// A stable identifier for every failure the crate can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    // ─── Spec validation ────────────────────────────────────────────────
    /// `v` is missing or not a supported version
    UnsupportedVersion,
    /// A numeric setting is outside its accepted range
    InvalidValue,
    /// Two settings that cannot be combined
    InvalidCombo,
    /// A field the schema does not know about
    UnknownField,

    // ─── Merge rules ────────────────────────────────────────────────────
    /// A rule with the same token sequence already exists
    DuplicateMergeRule,
    /// Declared rule length differs from the number of tokens supplied
    MergeRuleLengthMismatch,

    // ─── Tokenization ───────────────────────────────────────────────────
    /// The morphological analyzer could not be constructed or reached
    AnalyzerUnavailable,
    /// The analyzer was reachable but failed while processing input
    AnalysisFailed,
    /// Input text was empty or whitespace only
    EmptyInput,
    /// The analyzer ran but produced no tokens
    AnalysisYieldedNothing,

    // ─── Visualization preconditions ────────────────────────────────────
    /// No word reaches the minimum frequency
    InsufficientFrequency,
    /// No pair reaches the minimum co-occurrence count
    NoCooccurrencePairs,
    /// Every candidate edge was filtered out
    NoEdges,
    /// Fewer than two nodes survived component and weight pruning
    NetworkTooSmall,

    // ─── Boundary ───────────────────────────────────────────────────────
    /// Reading or writing failed
    Io,
    /// JSON or CSV (de)serialization failed
    Serialization,
}

impl ErrorCode {
    /// Returns the serialized `snake_case` name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnsupportedVersion => "unsupported_version",
            Self::InvalidValue => "invalid_value",
            Self::InvalidCombo => "invalid_combo",
            Self::UnknownField => "unknown_field",
            Self::DuplicateMergeRule => "duplicate_merge_rule",
            Self::MergeRuleLengthMismatch => "merge_rule_length_mismatch",
            Self::AnalyzerUnavailable => "analyzer_unavailable",
            Self::AnalysisFailed => "analysis_failed",
            Self::EmptyInput => "empty_input",
            Self::AnalysisYieldedNothing => "analysis_yielded_nothing",
            Self::InsufficientFrequency => "insufficient_frequency",
            Self::NoCooccurrencePairs => "no_cooccurrence_pairs",
            Self::NoEdges => "no_edges",
            Self::NetworkTooSmall => "network_too_small",
            Self::Io => "io",
            Self::Serialization => "serialization",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_name_matches_as_str() {
        for code in [
            ErrorCode::UnknownField,
            ErrorCode::DuplicateMergeRule,
            ErrorCode::NetworkTooSmall,
            ErrorCode::AnalysisYieldedNothing,
            ErrorCode::AnalysisFailed,
        ] {
            let json = serde_json::to_value(code).unwrap();
            assert_eq!(json, code.as_str());
        }
    }
}
