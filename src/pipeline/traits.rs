//! Stage trait definitions for the pipeline.
//!
//! Stages are statically dispatched; trait objects work too for callers that
//! compose pipelines at runtime.

use crate::nlp::merge::MergeRuleSet;
use crate::nlp::stopwords::StopwordSet;
use crate::nlp::tokenizer::TokenizedText;

// ============================================================================
// Preprocessor: token rewriting between tokenization and counting
// ============================================================================

/// Optional rewriting stage run on the tokenized text before anything is
/// counted.
///
/// # Contract
///
/// - **Input**: a mutable [`TokenizedText`] and the stopword set it was
///   filtered with. Rewrite in place.
/// - Every view must stay consistent: if the pre-token lines change, the
///   flat stream and the joined lines must be rebuilt from them.
/// - Tokens introduced by the rewrite may be left untagged; the pipeline
///   retags them afterwards.
/// - Not required to be idempotent: merge rules whose output feeds another
///   rule rewrite further on a second pass. The pipeline calls it once.
pub trait Preprocessor {
    fn preprocess(&self, text: &mut TokenizedText, stopwords: &StopwordSet);
}

impl<P: Preprocessor + ?Sized> Preprocessor for Box<P> {
    fn preprocess(&self, text: &mut TokenizedText, stopwords: &StopwordSet) {
        (**self).preprocess(text, stopwords);
    }
}

/// No-op preprocessor, the default when no merge rules are configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPreprocessor;

impl Preprocessor for NoopPreprocessor {
    #[inline]
    fn preprocess(&self, _text: &mut TokenizedText, _stopwords: &StopwordSet) {
        // Intentionally empty.
    }
}

/// Joins multi-word expressions with a [`MergeRuleSet`].
///
/// Rules are applied to each pre-token line, so a rule never matches across
/// a line break. The flat stream is rebuilt from the merged lines.
#[derive(Debug, Clone, Default)]
pub struct MergeRulePreprocessor {
    rules: MergeRuleSet,
}

impl MergeRulePreprocessor {
    pub fn new(rules: MergeRuleSet) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &MergeRuleSet {
        &self.rules
    }

    pub fn rules_mut(&mut self) -> &mut MergeRuleSet {
        &mut self.rules
    }
}

impl Preprocessor for MergeRulePreprocessor {
    fn preprocess(&self, text: &mut TokenizedText, stopwords: &StopwordSet) {
        if self.rules.is_empty() {
            return;
        }
        *text = text.with_merge_rules(&self.rules, stopwords);
    }
}
