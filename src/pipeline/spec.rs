//! Analysis settings document types.
//!
//! An [`AnalysisSpec`] is the JSON form of everything the UI layer hands to
//! the core: stopword edits, merge rules and the numeric settings. It is
//! checked by the [`super::validation::ValidationEngine`] and then resolved
//! into the runtime types with [`AnalysisSpec::resolve`].
//!
//! # JSON shape
//!
//! ```json
//! {
//!   "v": 1,
//!   "stopwords": { "language": "ja", "add": ["研究"], "remove": ["ない"] },
//!   "merge_rules": [ { "len": 2, "seq": ["人工", "知能"], "merged": "人工知能" } ],
//!   "min_frequency": 2,
//!   "window": { "mode": "sliding", "size": 5 },
//!   "min_cooccurrence": 1,
//!   "max_edges": 50,
//!   "self_loops": "remove",
//!   "collapse_consecutive": false,
//!   "dedup_per_line": false,
//!   "strict": false
//! }
//! ```
//!
//! Every field except `v` is optional; omitted settings take the defaults of
//! [`AnalysisConfig`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::errors::PipelineSpecError;
use super::validation::ValidationEngine;
use crate::error::{KyokiError, Result};
use crate::nlp::merge::{MergeRule, MergeRuleSet};
use crate::nlp::stopwords::StopwordSet;
use crate::types::{AnalysisConfig, SelfLoopPolicy, WindowMode};

/// Top-level analysis settings document (v1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSpec {
    /// Spec version (currently `1`).
    pub v: u32,

    #[serde(default)]
    pub stopwords: StopwordSpec,

    /// Merge rules in insertion order. Checked by validation, not by
    /// deserialization, so every bad rule is reported.
    #[serde(default)]
    pub merge_rules: Vec<MergeRule>,

    #[serde(default)]
    pub min_frequency: Option<usize>,

    #[serde(default)]
    pub window: WindowSpec,

    #[serde(default)]
    pub min_cooccurrence: Option<usize>,

    #[serde(default)]
    pub max_edges: Option<usize>,

    #[serde(default)]
    pub self_loops: Option<SelfLoopPolicy>,

    #[serde(default)]
    pub collapse_consecutive: Option<bool>,

    #[serde(default)]
    pub dedup_per_line: Option<bool>,

    /// Number of entries in the frequency chart.
    #[serde(default)]
    pub top_k: Option<usize>,

    /// If `true`, unrecognized fields are errors; if `false`, warnings.
    #[serde(default)]
    pub strict: bool,

    /// Captures any fields not recognized by the schema.
    #[serde(flatten)]
    pub unknown_fields: HashMap<String, serde_json::Value>,
}

/// Stopword list selection and edits.
///
/// The base list is `words` when given, otherwise the list for `language`
/// (Japanese when omitted). `add` and `remove` are applied on top.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StopwordSpec {
    #[serde(default)]
    pub language: Option<String>,

    /// Replaces the language list entirely.
    #[serde(default)]
    pub words: Option<Vec<String>>,

    #[serde(default)]
    pub add: Vec<String>,

    #[serde(default)]
    pub remove: Vec<String>,

    #[serde(flatten)]
    pub unknown_fields: HashMap<String, serde_json::Value>,
}

/// Co-occurrence window settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WindowSpec {
    #[serde(default)]
    pub mode: Option<WindowMode>,

    /// Sliding window size (2..=20).
    #[serde(default)]
    pub size: Option<usize>,

    #[serde(flatten)]
    pub unknown_fields: HashMap<String, serde_json::Value>,
}

/// A validated spec turned into runtime types.
#[derive(Debug, Clone)]
pub struct ResolvedSpec {
    pub config: AnalysisConfig,
    pub stopwords: StopwordSet,
    pub merge_rules: MergeRuleSet,
    /// Warning-level diagnostics from validation.
    pub warnings: Vec<PipelineSpecError>,
}

impl AnalysisSpec {
    /// A v1 spec with every setting at its default.
    pub fn new() -> Self {
        Self {
            v: 1,
            stopwords: StopwordSpec::default(),
            merge_rules: Vec::new(),
            min_frequency: None,
            window: WindowSpec::default(),
            min_cooccurrence: None,
            max_edges: None,
            self_loops: None,
            collapse_consecutive: None,
            dedup_per_line: None,
            top_k: None,
            strict: false,
            unknown_fields: HashMap::new(),
        }
    }

    /// Parse a spec from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Effective window mode (explicit or default).
    pub fn window_mode(&self) -> WindowMode {
        self.window.mode.unwrap_or_default()
    }

    /// Validate with the default rules and build the runtime types.
    ///
    /// Fails with [`KyokiError::InvalidConfig`] listing every error-level
    /// diagnostic; warnings are returned alongside a successful result.
    pub fn resolve(&self) -> Result<ResolvedSpec> {
        let report = ValidationEngine::with_defaults().validate(self);
        if report.has_errors() {
            return Err(KyokiError::InvalidConfig {
                errors: report.errors().cloned().collect(),
            });
        }

        let defaults = AnalysisConfig::default();
        let config = AnalysisConfig {
            min_frequency: self.min_frequency.unwrap_or(defaults.min_frequency),
            window_mode: self.window_mode(),
            window_size: self.window.size.unwrap_or(defaults.window_size),
            min_cooccurrence: self.min_cooccurrence.unwrap_or(defaults.min_cooccurrence),
            max_edges: self.max_edges.unwrap_or(defaults.max_edges),
            self_loops: self.self_loops.unwrap_or(defaults.self_loops),
            collapse_consecutive: self
                .collapse_consecutive
                .unwrap_or(defaults.collapse_consecutive),
            dedup_per_line: self.dedup_per_line.unwrap_or(defaults.dedup_per_line),
            top_k: self.top_k.unwrap_or(defaults.top_k),
        };

        let mut merge_rules = MergeRuleSet::new();
        for rule in &self.merge_rules {
            merge_rules.insert(rule.clone())?;
        }

        Ok(ResolvedSpec {
            config,
            stopwords: self.stopwords.build(),
            merge_rules,
            warnings: report.warnings().cloned().collect(),
        })
    }
}

impl Default for AnalysisSpec {
    fn default() -> Self {
        Self::new()
    }
}

impl StopwordSpec {
    /// Build the stopword set this spec describes.
    pub fn build(&self) -> StopwordSet {
        let mut set = match (&self.words, &self.language) {
            (Some(words), _) => words.iter().cloned().collect(),
            (None, Some(language)) => StopwordSet::for_language(language),
            (None, None) => StopwordSet::new(),
        };
        set.extend(self.add.iter().cloned());
        for word in &self.remove {
            set.remove(word);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_minimal_spec() {
        let spec = AnalysisSpec::from_json(r#"{ "v": 1 }"#).unwrap();
        assert_eq!(spec.v, 1);
        assert!(spec.merge_rules.is_empty());
        assert!(!spec.strict);

        let resolved = spec.resolve().unwrap();
        assert_eq!(resolved.config, AnalysisConfig::default());
        assert!(resolved.stopwords.is_stopword("の"));
        assert!(resolved.merge_rules.is_empty());
    }

    #[test]
    fn test_deserialize_full_spec() {
        let json = r#"{
            "v": 1,
            "stopwords": { "add": ["研究"], "remove": ["ない"] },
            "merge_rules": [ { "len": 2, "seq": ["人工", "知能"], "merged": "人工知能" } ],
            "min_frequency": 1,
            "window": { "mode": "line", "size": 8 },
            "min_cooccurrence": 2,
            "max_edges": 120,
            "self_loops": "keep",
            "collapse_consecutive": true,
            "dedup_per_line": true,
            "top_k": 10
        }"#;
        let resolved = AnalysisSpec::from_json(json).unwrap().resolve().unwrap();

        let cfg = &resolved.config;
        assert_eq!(cfg.min_frequency, 1);
        assert_eq!(cfg.window_mode, WindowMode::Line);
        assert_eq!(cfg.window_size, 8);
        assert_eq!(cfg.min_cooccurrence, 2);
        assert_eq!(cfg.max_edges, 120);
        assert_eq!(cfg.self_loops, SelfLoopPolicy::Keep);
        assert!(cfg.collapse_consecutive);
        assert!(cfg.dedup_per_line);
        assert_eq!(cfg.top_k, 10);

        assert!(resolved.stopwords.is_stopword("研究"));
        assert!(!resolved.stopwords.is_stopword("ない"));
        assert_eq!(resolved.merge_rules.len(), 1);
    }

    #[test]
    fn test_stopword_words_replace_language_list() {
        let spec = AnalysisSpec::from_json(r#"{ "v": 1, "stopwords": { "words": ["AI"] } }"#).unwrap();
        let set = spec.resolve().unwrap().stopwords;
        assert_eq!(set.len(), 1);
        assert!(set.is_stopword("AI"));
        assert!(!set.is_stopword("の"));
    }

    #[test]
    fn test_unknown_fields_captured() {
        let json = r#"{
            "v": 1,
            "bogus_top_level": 42,
            "window": { "size": 4, "shape": "round" }
        }"#;
        let spec = AnalysisSpec::from_json(json).unwrap();
        assert!(spec.unknown_fields.contains_key("bogus_top_level"));
        assert!(spec.window.unknown_fields.contains_key("shape"));

        let resolved = spec.resolve().unwrap();
        assert_eq!(resolved.warnings.len(), 2);
    }

    #[test]
    fn test_invalid_spec_lists_every_error() {
        let json = r#"{ "v": 1, "window": { "size": 40 }, "max_edges": 0 }"#;
        let err = AnalysisSpec::from_json(json).unwrap().resolve().unwrap_err();
        match err {
            KyokiError::InvalidConfig { errors } => assert_eq!(errors.len(), 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_malformed_json_is_serialization_error() {
        let err = AnalysisSpec::from_json("{ not json").unwrap_err();
        assert_eq!(err.code(), crate::error::ErrorCode::Serialization);
    }

    #[test]
    fn test_serde_roundtrip_keeps_rule_field_names() {
        let json = r#"{"v":1,"merge_rules":[{"len":2,"seq":["a","b"],"merged":"ab"}]}"#;
        let spec = AnalysisSpec::from_json(json).unwrap();
        let back = serde_json::to_value(&spec).unwrap();
        assert_eq!(back["merge_rules"][0]["merged"], "ab");
        assert_eq!(back["merge_rules"][0]["len"], 2);
    }
}
