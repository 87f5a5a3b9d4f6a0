//! Validation engine for analysis settings documents.
//!
//! The engine runs all registered [`ValidationRule`]s against an
//! [`AnalysisSpec`](super::spec::AnalysisSpec) and collects every diagnostic
//! into a [`ValidationReport`]. It never short-circuits on the first error,
//! so users see all problems at once.
//!
//! # Quick start
//!
//! ```rust
//! use kyoki::pipeline::spec::AnalysisSpec;
//! use kyoki::pipeline::validation::ValidationEngine;
//!
//! let spec = AnalysisSpec::from_json(r#"{ "v": 1, "window": { "size": 1 } }"#).unwrap();
//! let report = ValidationEngine::with_defaults().validate(&spec);
//! assert!(report.has_errors());
//! for err in report.errors() {
//!     eprintln!("{err}");
//! }
//! ```

use std::collections::HashMap;

use rustc_hash::FxHashSet;
use serde::Serialize;

use super::error_code::ErrorCode;
use super::errors::PipelineSpecError;
use super::spec::AnalysisSpec;
use crate::error::KyokiError;
use crate::nlp::merge::{MAX_RULE_LEN, MIN_RULE_LEN};
use crate::types::WindowMode;

/// Smallest sliding window accepted.
pub const MIN_WINDOW_SIZE: usize = 2;
/// Largest sliding window accepted.
pub const MAX_WINDOW_SIZE: usize = 20;
/// Upper bound on the number of network edges.
pub const MAX_EDGE_LIMIT: usize = 500;

// ─── Severity ───────────────────────────────────────────────────────────────

/// Whether a diagnostic is a hard error or a soft warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

// ─── Diagnostic ─────────────────────────────────────────────────────────────

/// A single validation finding: an error or warning attached to a
/// [`PipelineSpecError`] that carries the code, path, message, and hint.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationDiagnostic {
    pub severity: Severity,
    #[serde(flatten)]
    pub error: PipelineSpecError,
}

impl ValidationDiagnostic {
    pub fn error(err: PipelineSpecError) -> Self {
        Self {
            severity: Severity::Error,
            error: err,
        }
    }

    pub fn warning(err: PipelineSpecError) -> Self {
        Self {
            severity: Severity::Warning,
            error: err,
        }
    }
}

// ─── Report ─────────────────────────────────────────────────────────────────

/// Collected diagnostics from running all validation rules.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub diagnostics: Vec<ValidationDiagnostic>,
}

impl ValidationReport {
    /// Iterate over error-severity diagnostics.
    pub fn errors(&self) -> impl Iterator<Item = &PipelineSpecError> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .map(|d| &d.error)
    }

    /// Iterate over warning-severity diagnostics.
    pub fn warnings(&self) -> impl Iterator<Item = &PipelineSpecError> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .map(|d| &d.error)
    }

    /// Returns `true` if any diagnostic is an error.
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Returns `true` if there are no errors (warnings are acceptable).
    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

// ─── Rule trait ─────────────────────────────────────────────────────────────

/// A single validation rule that inspects an [`AnalysisSpec`] and returns
/// zero or more diagnostics.
///
/// Rules are stateless and must be `Send + Sync` so one engine can be shared
/// across threads.
pub trait ValidationRule: Send + Sync {
    /// Short identifier, used in logs.
    fn name(&self) -> &str;

    /// Inspect `spec` and return any findings.
    fn validate(&self, spec: &AnalysisSpec) -> Vec<ValidationDiagnostic>;
}

// ─── Engine ─────────────────────────────────────────────────────────────────

/// Runs a set of [`ValidationRule`]s against an [`AnalysisSpec`] and collects
/// all diagnostics into a [`ValidationReport`].
pub struct ValidationEngine {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl ValidationEngine {
    /// Create an empty engine with no rules.
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Create an engine pre-loaded with the default rule set.
    pub fn with_defaults() -> Self {
        let mut engine = Self::new();
        engine.add_rule(Box::new(VersionRule));
        engine.add_rule(Box::new(WindowRule));
        engine.add_rule(Box::new(ThresholdsRule));
        engine.add_rule(Box::new(MergeRulesRule));
        engine.add_rule(Box::new(StopwordsRule));
        engine.add_rule(Box::new(UnknownFieldsRule));
        engine
    }

    /// Register an additional rule.
    pub fn add_rule(&mut self, rule: Box<dyn ValidationRule>) {
        self.rules.push(rule);
    }

    /// Run all rules against `spec` and return the collected report.
    pub fn validate(&self, spec: &AnalysisSpec) -> ValidationReport {
        let mut report = ValidationReport::default();
        for rule in &self.rules {
            let found = rule.validate(spec);
            if !found.is_empty() {
                trace_event!(rule = rule.name(), diagnostics = found.len(), "validation findings");
            }
            report.diagnostics.extend(found);
        }
        report
    }
}

impl Default for ValidationEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  Concrete rules
// ═══════════════════════════════════════════════════════════════════════════

// ─── 1. Version ─────────────────────────────────────────────────────────────

struct VersionRule;

impl ValidationRule for VersionRule {
    fn name(&self) -> &str {
        "version"
    }

    fn validate(&self, spec: &AnalysisSpec) -> Vec<ValidationDiagnostic> {
        if spec.v == 1 {
            return Vec::new();
        }
        vec![ValidationDiagnostic::error(
            PipelineSpecError::new(
                ErrorCode::UnsupportedVersion,
                "/v",
                format!("unsupported spec version {}", spec.v),
            )
            .with_hint("Set \"v\": 1"),
        )]
    }
}

// ─── 2. Window size and mode combinations ───────────────────────────────────

struct WindowRule;

impl ValidationRule for WindowRule {
    fn name(&self) -> &str {
        "window"
    }

    fn validate(&self, spec: &AnalysisSpec) -> Vec<ValidationDiagnostic> {
        let mut out = Vec::new();
        let mode = spec.window_mode();

        if let Some(size) = spec.window.size {
            if !(MIN_WINDOW_SIZE..=MAX_WINDOW_SIZE).contains(&size) {
                out.push(ValidationDiagnostic::error(
                    PipelineSpecError::new(
                        ErrorCode::InvalidValue,
                        "/window/size",
                        format!("window size {size} is out of range"),
                    )
                    .with_hint(format!(
                        "Use a value between {MIN_WINDOW_SIZE} and {MAX_WINDOW_SIZE}"
                    )),
                ));
            } else if mode == WindowMode::Line {
                out.push(ValidationDiagnostic::warning(
                    PipelineSpecError::new(
                        ErrorCode::InvalidCombo,
                        "/window/size",
                        "window size is ignored in line mode",
                    )
                    .with_hint("Remove the size or switch to \"sliding\""),
                ));
            }
        }

        if spec.dedup_per_line == Some(true) && mode == WindowMode::Sliding {
            out.push(ValidationDiagnostic::warning(
                PipelineSpecError::new(
                    ErrorCode::InvalidCombo,
                    "/dedup_per_line",
                    "dedup_per_line only affects line mode",
                )
                .with_hint("Set window.mode to \"line\" or drop this flag"),
            ));
        }

        out
    }
}

// ─── 3. Numeric thresholds ──────────────────────────────────────────────────

struct ThresholdsRule;

impl ThresholdsRule {
    fn at_least_one(path: &str, field: &str, value: Option<usize>) -> Option<ValidationDiagnostic> {
        match value {
            Some(0) => Some(ValidationDiagnostic::error(
                PipelineSpecError::new(ErrorCode::InvalidValue, path, format!("{field} must be at least 1"))
                    .with_hint(format!("Set {field} to 1 or more")),
            )),
            _ => None,
        }
    }
}

impl ValidationRule for ThresholdsRule {
    fn name(&self) -> &str {
        "thresholds"
    }

    fn validate(&self, spec: &AnalysisSpec) -> Vec<ValidationDiagnostic> {
        let mut out: Vec<ValidationDiagnostic> = [
            Self::at_least_one("/min_frequency", "min_frequency", spec.min_frequency),
            Self::at_least_one("/min_cooccurrence", "min_cooccurrence", spec.min_cooccurrence),
            Self::at_least_one("/top_k", "top_k", spec.top_k),
        ]
        .into_iter()
        .flatten()
        .collect();

        if let Some(max_edges) = spec.max_edges {
            if !(1..=MAX_EDGE_LIMIT).contains(&max_edges) {
                out.push(ValidationDiagnostic::error(
                    PipelineSpecError::new(
                        ErrorCode::InvalidValue,
                        "/max_edges",
                        format!("max_edges {max_edges} is out of range"),
                    )
                    .with_hint(format!("Use a value between 1 and {MAX_EDGE_LIMIT}")),
                ));
            }
        }

        out
    }
}

// ─── 4. Merge rules ─────────────────────────────────────────────────────────

struct MergeRulesRule;

impl ValidationRule for MergeRulesRule {
    fn name(&self) -> &str {
        "merge_rules"
    }

    fn validate(&self, spec: &AnalysisSpec) -> Vec<ValidationDiagnostic> {
        let mut out = Vec::new();
        let mut seen: FxHashSet<&[String]> = FxHashSet::default();

        for (i, rule) in spec.merge_rules.iter().enumerate() {
            if let Err(KyokiError::MergeRuleLengthMismatch { declared, actual }) = rule.validate() {
                out.push(ValidationDiagnostic::error(
                    PipelineSpecError::new(
                        ErrorCode::MergeRuleLengthMismatch,
                        format!("/merge_rules/{i}/seq"),
                        format!("rule declares {declared} tokens but lists {actual}"),
                    )
                    .with_hint(format!(
                        "A rule joins {MIN_RULE_LEN} to {MAX_RULE_LEN} tokens and \"len\" must match \"seq\""
                    )),
                ));
            }

            if rule.replacement().trim().is_empty() {
                out.push(ValidationDiagnostic::error(
                    PipelineSpecError::new(
                        ErrorCode::InvalidValue,
                        format!("/merge_rules/{i}/merged"),
                        "merged token is empty",
                    )
                    .with_hint("Give the merged token a surface form"),
                ));
            }

            if !seen.insert(rule.sequence()) {
                out.push(ValidationDiagnostic::error(
                    PipelineSpecError::new(
                        ErrorCode::DuplicateMergeRule,
                        format!("/merge_rules/{i}"),
                        format!("a rule for [{}] already exists", rule.sequence().join(", ")),
                    )
                    .with_hint("Remove one of the duplicate rules"),
                ));
            }
        }

        out
    }
}

// ─── 5. Stopword list selection ─────────────────────────────────────────────

struct StopwordsRule;

impl ValidationRule for StopwordsRule {
    fn name(&self) -> &str {
        "stopwords"
    }

    fn validate(&self, spec: &AnalysisSpec) -> Vec<ValidationDiagnostic> {
        let sw = &spec.stopwords;
        if sw.words.is_some() && sw.language.is_some() {
            vec![ValidationDiagnostic::error(
                PipelineSpecError::new(
                    ErrorCode::InvalidCombo,
                    "/stopwords",
                    "\"words\" replaces the language list; both were given",
                )
                .with_hint("Keep either \"language\" or \"words\""),
            )]
        } else {
            Vec::new()
        }
    }
}

// ─── 6. Unknown fields (strict → error, non-strict → warning) ──────────────

struct UnknownFieldsRule;

impl UnknownFieldsRule {
    /// Collect unknown-field diagnostics at the given JSON pointer `path`
    /// from a `HashMap` of extra fields captured by `#[serde(flatten)]`.
    fn check_unknowns(
        path: &str,
        unknowns: &HashMap<String, serde_json::Value>,
        strict: bool,
    ) -> Vec<ValidationDiagnostic> {
        let mut keys: Vec<&String> = unknowns.keys().collect();
        keys.sort();
        keys.into_iter()
            .map(|key| {
                let diag_fn = if strict {
                    ValidationDiagnostic::error
                } else {
                    ValidationDiagnostic::warning
                };
                diag_fn(
                    PipelineSpecError::new(
                        ErrorCode::UnknownField,
                        format!("{path}/{key}"),
                        format!("unrecognized field \"{key}\""),
                    )
                    .with_hint("Check spelling or remove this field"),
                )
            })
            .collect()
    }
}

impl ValidationRule for UnknownFieldsRule {
    fn name(&self) -> &str {
        "unknown_fields"
    }

    fn validate(&self, spec: &AnalysisSpec) -> Vec<ValidationDiagnostic> {
        let mut out = Vec::new();
        out.extend(Self::check_unknowns("", &spec.unknown_fields, spec.strict));
        out.extend(Self::check_unknowns(
            "/window",
            &spec.window.unknown_fields,
            spec.strict,
        ));
        out.extend(Self::check_unknowns(
            "/stopwords",
            &spec.stopwords.unknown_fields,
            spec.strict,
        ));
        out
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(json: &str) -> AnalysisSpec {
        serde_json::from_str(json).unwrap()
    }

    fn engine() -> ValidationEngine {
        ValidationEngine::with_defaults()
    }

    // ─── Valid specs ────────────────────────────────────────────────────

    #[test]
    fn test_minimal_spec_is_valid() {
        let report = engine().validate(&spec(r#"{ "v": 1 }"#));
        assert!(report.is_valid());
        assert!(report.is_empty());
    }

    #[test]
    fn test_window_bounds_are_inclusive() {
        for size in [2, 20] {
            let report = engine().validate(&spec(&format!(
                r#"{{ "v": 1, "window": {{ "size": {size} }} }}"#
            )));
            assert!(report.is_empty(), "size {size} should be accepted");
        }
    }

    #[test]
    fn test_valid_merge_rules() {
        let report = engine().validate(&spec(
            r#"{
                "v": 1,
                "merge_rules": [
                    { "len": 2, "seq": ["人工", "知能"], "merged": "人工知能" },
                    { "len": 3, "seq": ["機械", "学習", "モデル"], "merged": "機械学習モデル" }
                ]
            }"#,
        ));
        assert!(report.is_empty());
    }

    // ─── Version ────────────────────────────────────────────────────────

    #[test]
    fn test_unsupported_version() {
        let report = engine().validate(&spec(r#"{ "v": 2 }"#));
        let errs: Vec<_> = report.errors().collect();
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].code, ErrorCode::UnsupportedVersion);
        assert_eq!(errs[0].path, "/v");
    }

    // ─── Window ─────────────────────────────────────────────────────────

    #[test]
    fn test_window_size_out_of_range() {
        for size in [0, 1, 21] {
            let report = engine().validate(&spec(&format!(
                r#"{{ "v": 1, "window": {{ "size": {size} }} }}"#
            )));
            let errs: Vec<_> = report.errors().collect();
            assert_eq!(errs.len(), 1);
            assert_eq!(errs[0].code, ErrorCode::InvalidValue);
            assert_eq!(errs[0].path, "/window/size");
        }
    }

    #[test]
    fn test_window_size_in_line_mode_warns() {
        let report = engine().validate(&spec(
            r#"{ "v": 1, "window": { "mode": "line", "size": 5 } }"#,
        ));
        assert!(report.is_valid());
        let warns: Vec<_> = report.warnings().collect();
        assert_eq!(warns.len(), 1);
        assert_eq!(warns[0].code, ErrorCode::InvalidCombo);
    }

    #[test]
    fn test_dedup_in_sliding_mode_warns() {
        let report = engine().validate(&spec(r#"{ "v": 1, "dedup_per_line": true }"#));
        assert!(report.is_valid());
        assert_eq!(report.warnings().next().unwrap().path, "/dedup_per_line");

        let report = engine().validate(&spec(
            r#"{ "v": 1, "dedup_per_line": true, "window": { "mode": "line" } }"#,
        ));
        assert!(report.is_empty());
    }

    // ─── Thresholds ─────────────────────────────────────────────────────

    #[test]
    fn test_zero_thresholds_are_errors() {
        let report = engine().validate(&spec(
            r#"{ "v": 1, "min_frequency": 0, "min_cooccurrence": 0, "top_k": 0 }"#,
        ));
        let paths: Vec<_> = report.errors().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["/min_frequency", "/min_cooccurrence", "/top_k"]);
    }

    #[test]
    fn test_max_edges_bounds() {
        let report = engine().validate(&spec(r#"{ "v": 1, "max_edges": 500 }"#));
        assert!(report.is_valid());

        for bad in [0, 501] {
            let report = engine().validate(&spec(&format!(r#"{{ "v": 1, "max_edges": {bad} }}"#)));
            let errs: Vec<_> = report.errors().collect();
            assert_eq!(errs.len(), 1);
            assert_eq!(errs[0].path, "/max_edges");
        }
    }

    // ─── Merge rules ────────────────────────────────────────────────────

    #[test]
    fn test_merge_rule_length_mismatch() {
        let report = engine().validate(&spec(
            r#"{ "v": 1, "merge_rules": [ { "len": 3, "seq": ["a", "b"], "merged": "ab" } ] }"#,
        ));
        let errs: Vec<_> = report.errors().collect();
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].code, ErrorCode::MergeRuleLengthMismatch);
        assert_eq!(errs[0].path, "/merge_rules/0/seq");
    }

    #[test]
    fn test_merge_rule_too_long() {
        let report = engine().validate(&spec(
            r#"{ "v": 1, "merge_rules": [ { "len": 5, "seq": ["a", "b", "c", "d", "e"], "merged": "x" } ] }"#,
        ));
        assert_eq!(
            report.errors().next().unwrap().code,
            ErrorCode::MergeRuleLengthMismatch
        );
    }

    #[test]
    fn test_merge_rule_empty_replacement() {
        let report = engine().validate(&spec(
            r#"{ "v": 1, "merge_rules": [ { "len": 2, "seq": ["a", "b"], "merged": " " } ] }"#,
        ));
        let errs: Vec<_> = report.errors().collect();
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].path, "/merge_rules/0/merged");
    }

    #[test]
    fn test_duplicate_merge_rule_points_at_second() {
        let report = engine().validate(&spec(
            r#"{
                "v": 1,
                "merge_rules": [
                    { "len": 2, "seq": ["a", "b"], "merged": "ab" },
                    { "len": 2, "seq": ["b", "c"], "merged": "bc" },
                    { "len": 2, "seq": ["a", "b"], "merged": "AB" }
                ]
            }"#,
        ));
        let errs: Vec<_> = report.errors().collect();
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].code, ErrorCode::DuplicateMergeRule);
        assert_eq!(errs[0].path, "/merge_rules/2");
    }

    // ─── Stopwords ──────────────────────────────────────────────────────

    #[test]
    fn test_words_with_language_is_error() {
        let report = engine().validate(&spec(
            r#"{ "v": 1, "stopwords": { "language": "en", "words": ["the"] } }"#,
        ));
        let errs: Vec<_> = report.errors().collect();
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].path, "/stopwords");
    }

    // ─── Unknown fields ─────────────────────────────────────────────────

    #[test]
    fn test_unknown_fields_warn_when_not_strict() {
        let report = engine().validate(&spec(
            r#"{ "v": 1, "colour": "red", "stopwords": { "langauge": "ja" } }"#,
        ));
        assert!(report.is_valid());
        let paths: Vec<_> = report.warnings().map(|w| w.path.as_str()).collect();
        assert_eq!(paths, vec!["/colour", "/stopwords/langauge"]);
    }

    #[test]
    fn test_unknown_fields_error_when_strict() {
        let report = engine().validate(&spec(
            r#"{ "v": 1, "strict": true, "window": { "width": 3 } }"#,
        ));
        let errs: Vec<_> = report.errors().collect();
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].code, ErrorCode::UnknownField);
        assert_eq!(errs[0].path, "/window/width");
    }

    // ─── Engine ─────────────────────────────────────────────────────────

    #[test]
    fn test_multiple_rules_fire_independently() {
        let report = engine().validate(&spec(
            r#"{
                "v": 3,
                "strict": true,
                "bogus": true,
                "window": { "size": 99 },
                "max_edges": 0
            }"#,
        ));
        assert_eq!(report.errors().count(), 4);
    }

    #[test]
    fn test_custom_rule() {
        struct AlwaysWarnRule;
        impl ValidationRule for AlwaysWarnRule {
            fn name(&self) -> &str {
                "always_warn"
            }
            fn validate(&self, _spec: &AnalysisSpec) -> Vec<ValidationDiagnostic> {
                vec![ValidationDiagnostic::warning(PipelineSpecError::new(
                    ErrorCode::InvalidValue,
                    "",
                    "custom warning",
                ))]
            }
        }

        let mut eng = ValidationEngine::new();
        eng.add_rule(Box::new(AlwaysWarnRule));
        let report = eng.validate(&spec(r#"{ "v": 1 }"#));
        assert!(report.is_valid()); // warnings only
        assert_eq!(report.warnings().count(), 1);
    }

    #[test]
    fn test_report_serializes_to_json() {
        let report = engine().validate(&spec(r#"{ "v": 1, "window": { "size": 1 } }"#));
        let json = serde_json::to_value(&report).unwrap();
        let diags = json["diagnostics"].as_array().unwrap();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0]["severity"], "error");
        assert_eq!(diags[0]["code"], "invalid_value");
        assert_eq!(diags[0]["path"], "/window/size");
    }
}
