//! Line-aware tokenization
//!
//! Input text is analyzed twice:
//!
//! 1. line by line, keeping the unfiltered tokens of every input line
//!    ("pre-tokens"), which feed merge rules and per-line co-occurrence;
//! 2. as a whole, producing the flat token stream used for frequencies and
//!    sliding-window co-occurrence.
//!
//! Both views are filtered with the same [`StopwordSet`]. Tokens and their
//! part-of-speech tags travel together as [`TaggedToken`]s, so the flat
//! stream and its tags can never fall out of step.

use serde::Serialize;

use super::analyzer::MorphAnalyzer;
use super::merge::MergeRuleSet;
use super::pos_cache::PosCache;
use super::stopwords::StopwordSet;
use crate::error::{KyokiError, Result};
use crate::frequency::FrequencyTable;
use crate::types::TaggedToken;

/// Output of [`LineTokenizer::tokenize`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TokenizedText {
    /// Filtered flat token stream
    pub tokens: Vec<TaggedToken>,
    /// Unfiltered tokens of each input line (one entry per line, blank lines
    /// included as empty sequences)
    pub pre_tokens_lines: Vec<Vec<TaggedToken>>,
    /// Space-joined filtered tokens of each line that kept at least one token
    pub original_lines: Vec<String>,
    /// Unfiltered flat token stream
    pub raw_tokens: Vec<TaggedToken>,
}

impl TokenizedText {
    /// Surface forms of the filtered stream
    pub fn surfaces(&self) -> Vec<&str> {
        self.tokens.iter().map(|t| t.surface.as_str()).collect()
    }

    /// Part-of-speech tags of the filtered stream, index-aligned with
    /// [`surfaces`](Self::surfaces)
    pub fn pos_tags(&self) -> Vec<&str> {
        self.tokens.iter().map(|t| t.pos.as_str()).collect()
    }

    /// Unfiltered surface forms per line
    pub fn pre_token_surfaces(&self) -> Vec<Vec<&str>> {
        self.pre_tokens_lines
            .iter()
            .map(|line| line.iter().map(|t| t.surface.as_str()).collect())
            .collect()
    }

    /// Filtered surface forms per line (blank lines kept as empty entries)
    pub fn filtered_lines(&self, stopwords: &StopwordSet) -> Vec<Vec<String>> {
        self.pre_tokens_lines
            .iter()
            .map(|line| {
                line.iter()
                    .filter(|t| stopwords.is_significant(&t.surface))
                    .map(|t| t.surface.clone())
                    .collect()
            })
            .collect()
    }

    /// Count the filtered stream
    pub fn frequencies(&self) -> FrequencyTable {
        FrequencyTable::from_tokens(self.tokens.iter().map(|t| t.surface.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Re-apply a (possibly changed) stopword set to the unfiltered views.
    pub fn refilter(&self, stopwords: &StopwordSet) -> TokenizedText {
        TokenizedText {
            tokens: stopwords.filter(&self.raw_tokens),
            pre_tokens_lines: self.pre_tokens_lines.clone(),
            original_lines: join_filtered_lines(&self.pre_tokens_lines, stopwords),
            raw_tokens: self.raw_tokens.clone(),
        }
    }

    /// Apply merge rules to every pre-token line, then filter.
    ///
    /// The flat stream is rebuilt from the merged lines. Merged tokens come
    /// out untagged; see [`LineTokenizer::retag`].
    pub fn with_merge_rules(&self, rules: &MergeRuleSet, stopwords: &StopwordSet) -> TokenizedText {
        let merged = merge_lines(&self.pre_tokens_lines, rules, stopwords);
        let raw_tokens = merged.lines.iter().flatten().cloned().collect();
        TokenizedText {
            original_lines: join_filtered_lines(&merged.lines, stopwords),
            tokens: merged.tokens,
            pre_tokens_lines: merged.lines,
            raw_tokens,
        }
    }
}

/// Result of [`merge_lines`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergedLines {
    /// Merged (unfiltered) tokens per line
    pub lines: Vec<Vec<TaggedToken>>,
    /// Filtered tokens of all lines, in order
    pub tokens: Vec<TaggedToken>,
}

/// Apply merge rules line by line and collect the filtered tokens.
///
/// With an empty rule set the lines are copied unchanged.
pub fn merge_lines(
    pre_tokens_lines: &[Vec<TaggedToken>],
    rules: &MergeRuleSet,
    stopwords: &StopwordSet,
) -> MergedLines {
    let mut merged = MergedLines::default();
    for line in pre_tokens_lines {
        let new_line = rules.apply_tagged(line);
        merged.tokens.extend(stopwords.filter(&new_line));
        merged.lines.push(new_line);
    }
    merged
}

fn join_filtered_lines(lines: &[Vec<TaggedToken>], stopwords: &StopwordSet) -> Vec<String> {
    lines
        .iter()
        .filter_map(|line| {
            let kept: Vec<&str> = line
                .iter()
                .filter(|t| stopwords.is_significant(&t.surface))
                .map(|t| t.surface.as_str())
                .collect();
            (!kept.is_empty()).then(|| kept.join(" "))
        })
        .collect()
}

/// Tokenizer that preserves input line structure
#[derive(Debug, Clone)]
pub struct LineTokenizer<A> {
    analyzer: A,
}

impl<A: MorphAnalyzer> LineTokenizer<A> {
    pub fn new(analyzer: A) -> Self {
        Self { analyzer }
    }

    pub fn analyzer(&self) -> &A {
        &self.analyzer
    }

    /// Tokenize `text`, filtering with `stopwords`.
    ///
    /// Fails with [`KyokiError::EmptyInput`] for blank text and with
    /// [`KyokiError::AnalysisYieldedNothing`] when the analyzer returns no
    /// tokens at all for non-blank text.
    pub fn tokenize(&self, text: &str, stopwords: &StopwordSet) -> Result<TokenizedText> {
        if text.trim().is_empty() {
            return Err(KyokiError::EmptyInput);
        }

        let mut pre_tokens_lines = Vec::new();
        for line in text.split('\n') {
            let line = line.strip_suffix('\r').unwrap_or(line);
            if line.trim().is_empty() {
                pre_tokens_lines.push(Vec::new());
            } else {
                pre_tokens_lines.push(self.analyzer.analyze(line)?);
            }
        }

        let raw_tokens = self.analyzer.analyze(text)?;
        if raw_tokens.is_empty() {
            return Err(KyokiError::AnalysisYieldedNothing {
                chars: text.chars().count(),
            });
        }

        let tokens = stopwords.filter(&raw_tokens);
        let original_lines = join_filtered_lines(&pre_tokens_lines, stopwords);

        trace_event!(
            analyzer = self.analyzer.name(),
            lines = pre_tokens_lines.len(),
            raw = raw_tokens.len(),
            kept = tokens.len(),
            "tokenized text"
        );

        Ok(TokenizedText {
            tokens,
            pre_tokens_lines,
            original_lines,
            raw_tokens,
        })
    }

    /// Tag a single word in isolation, memoized through `cache`.
    pub fn tag_word(&self, cache: &mut PosCache, word: &str) -> Result<String> {
        cache.lookup(&self.analyzer, word).map(str::to_string)
    }

    /// Fill in tags for untagged tokens (merge replacements) in every view.
    pub fn retag(&self, text: &mut TokenizedText, cache: &mut PosCache) -> Result<()> {
        for token in &text.raw_tokens {
            cache.remember(token);
        }
        cache.retag_unknown(&self.analyzer, &mut text.tokens)?;
        cache.retag_unknown(&self.analyzer, &mut text.raw_tokens)?;
        for line in &mut text.pre_tokens_lines {
            cache.retag_unknown(&self.analyzer, line)?;
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::nlp::merge::MergeRule;
    use crate::types::UNKNOWN_POS;

    /// Deterministic analyzer: splits on spaces; particles listed below are
    /// tagged 助詞, everything else 名詞.
    pub(crate) struct SpaceAnalyzer;

    impl MorphAnalyzer for SpaceAnalyzer {
        fn analyze(&self, text: &str) -> Result<Vec<TaggedToken>> {
            Ok(text
                .split_whitespace()
                .map(|w| {
                    let pos = if matches!(w, "の" | "は" | "が" | "を") {
                        "助詞"
                    } else {
                        "名詞"
                    };
                    TaggedToken::new(w, pos)
                })
                .collect())
        }

        fn name(&self) -> &'static str {
            "space"
        }
    }

    struct SilentAnalyzer;

    impl MorphAnalyzer for SilentAnalyzer {
        fn analyze(&self, _text: &str) -> Result<Vec<TaggedToken>> {
            Ok(Vec::new())
        }

        fn name(&self) -> &'static str {
            "silent"
        }
    }

    fn surfaces(line: &[TaggedToken]) -> Vec<&str> {
        line.iter().map(|t| t.surface.as_str()).collect()
    }

    #[test]
    fn test_tokenize_two_lines() {
        let tokenizer = LineTokenizer::new(SpaceAnalyzer);
        let stopwords = StopwordSet::from_list(&["の"]);
        let out = tokenizer
            .tokenize("人工 知能 の 進化\n機械 学習 の 進化", &stopwords)
            .unwrap();

        assert_eq!(
            out.filtered_lines(&stopwords),
            vec![vec!["人工", "知能", "進化"], vec!["機械", "学習", "進化"]]
        );
        assert_eq!(out.original_lines, vec!["人工 知能 進化", "機械 学習 進化"]);
        assert_eq!(out.surfaces(), vec!["人工", "知能", "進化", "機械", "学習", "進化"]);

        let freq = out.frequencies();
        assert_eq!(freq.get("進化"), 2);
        assert_eq!(freq.get("人工"), 1);
        assert_eq!(freq.get("知能"), 1);
        assert_eq!(freq.get("機械"), 1);
        assert_eq!(freq.get("学習"), 1);
        assert_eq!(freq.len(), 5);
    }

    #[test]
    fn test_pos_tags_stay_aligned_after_filtering() {
        let tokenizer = LineTokenizer::new(SpaceAnalyzer);
        let stopwords = StopwordSet::from_list(&["進化"]);
        let out = tokenizer.tokenize("人工 の 進化 は 未来", &stopwords).unwrap();

        // "の"/"は" drop out by length, "進化" by the stopword set.
        assert_eq!(out.surfaces(), vec!["人工", "未来"]);
        assert_eq!(out.pos_tags(), vec!["名詞", "名詞"]);
        assert_eq!(out.raw_tokens.len(), 5);
    }

    #[test]
    fn test_pre_tokens_are_unfiltered_and_keep_blank_lines() {
        let tokenizer = LineTokenizer::new(SpaceAnalyzer);
        let out = tokenizer
            .tokenize("人工 の 知能\n\n進化", &StopwordSet::new())
            .unwrap();

        assert_eq!(out.pre_tokens_lines.len(), 3);
        assert_eq!(surfaces(&out.pre_tokens_lines[0]), vec!["人工", "の", "知能"]);
        assert!(out.pre_tokens_lines[1].is_empty());
        assert_eq!(out.original_lines, vec!["人工 知能", "進化"]);
    }

    #[test]
    fn test_lines_without_tokens_are_omitted_from_original_lines() {
        let tokenizer = LineTokenizer::new(SpaceAnalyzer);
        let out = tokenizer.tokenize("の は\n進化 未来", &StopwordSet::new()).unwrap();
        assert_eq!(out.original_lines, vec!["進化 未来"]);
    }

    #[test]
    fn test_crlf_line_endings() {
        let tokenizer = LineTokenizer::new(SpaceAnalyzer);
        let out = tokenizer.tokenize("人工 知能\r\n進化", &StopwordSet::new()).unwrap();
        assert_eq!(out.original_lines, vec!["人工 知能", "進化"]);
    }

    #[test]
    fn test_empty_input() {
        let tokenizer = LineTokenizer::new(SpaceAnalyzer);
        let err = tokenizer.tokenize("  \n\t", &StopwordSet::new()).unwrap_err();
        assert!(matches!(err, KyokiError::EmptyInput));
    }

    #[test]
    fn test_analysis_yielding_nothing_is_an_error() {
        let tokenizer = LineTokenizer::new(SilentAnalyzer);
        let err = tokenizer.tokenize("人工知能", &StopwordSet::new()).unwrap_err();
        assert!(matches!(err, KyokiError::AnalysisYieldedNothing { chars: 4 }));
    }

    #[test]
    fn test_merge_lines_applies_rules_and_filters() {
        let pre = vec![
            vec![
                TaggedToken::new("人工", "名詞"),
                TaggedToken::new("知能", "名詞"),
                TaggedToken::new("AI", "名詞"),
            ],
            vec![TaggedToken::new("進化", "名詞"), TaggedToken::new("未来", "名詞")],
        ];
        let rules = MergeRuleSet::try_from(vec![
            MergeRule::from_tokens(["人工", "知能"], "人工知能").unwrap()
        ])
        .unwrap();
        let merged = merge_lines(&pre, &rules, &StopwordSet::from_list(&["AI"]));

        assert_eq!(surfaces(&merged.lines[0]), vec!["人工知能", "AI"]);
        assert_eq!(surfaces(&merged.tokens), vec!["人工知能", "進化", "未来"]);
    }

    #[test]
    fn test_with_merge_rules_then_retag() {
        let tokenizer = LineTokenizer::new(SpaceAnalyzer);
        let stopwords = StopwordSet::new();
        let text = tokenizer.tokenize("人工 知能 の 進化", &stopwords).unwrap();
        let rules = MergeRuleSet::try_from(vec![
            MergeRule::from_tokens(["人工", "知能"], "人工知能").unwrap()
        ])
        .unwrap();

        let mut merged = text.with_merge_rules(&rules, &stopwords);
        assert_eq!(merged.surfaces(), vec!["人工知能", "進化"]);
        assert_eq!(merged.tokens[0].pos, UNKNOWN_POS);
        assert_eq!(merged.original_lines, vec!["人工知能 進化"]);

        let mut cache = PosCache::new();
        tokenizer.retag(&mut merged, &mut cache).unwrap();
        assert_eq!(merged.pos_tags(), vec!["名詞", "名詞"]);
        assert_eq!(merged.pre_tokens_lines[0][0].pos, "名詞");
    }

    #[test]
    fn test_refilter_with_new_stopwords() {
        let tokenizer = LineTokenizer::new(SpaceAnalyzer);
        let text = tokenizer.tokenize("人工 知能 進化", &StopwordSet::new()).unwrap();
        let refiltered = text.refilter(&StopwordSet::from_list(&["知能"]));

        assert_eq!(refiltered.surfaces(), vec!["人工", "進化"]);
        assert_eq!(refiltered.original_lines, vec!["人工 進化"]);
    }

    #[test]
    fn test_tag_word_through_tokenizer() {
        let tokenizer = LineTokenizer::new(SpaceAnalyzer);
        let mut cache = PosCache::new();
        assert_eq!(tokenizer.tag_word(&mut cache, "の").unwrap(), "助詞");
        assert_eq!(tokenizer.tag_word(&mut cache, "の").unwrap(), "助詞");
        assert_eq!(cache.stats(), (1, 1));
    }
}
