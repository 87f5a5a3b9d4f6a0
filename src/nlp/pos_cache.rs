//! Memoized single-word part-of-speech lookup
//!
//! Tokens whose provenance is unknown (merge replacements, words typed into
//! the edit view) are re-tagged by analyzing them in isolation. Lists are
//! refreshed often, so each distinct word is analyzed at most once.

use rustc_hash::FxHashMap;

use super::analyzer::MorphAnalyzer;
use crate::error::Result;
use crate::types::{TaggedToken, UNKNOWN_POS};

/// Word → part-of-speech memo table
#[derive(Debug, Clone, Default)]
pub struct PosCache {
    tags: FxHashMap<String, String>,
    hits: usize,
    misses: usize,
}

impl PosCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the tag for `word`, analyzing it on first use.
    pub fn lookup<A: MorphAnalyzer + ?Sized>(&mut self, analyzer: &A, word: &str) -> Result<&str> {
        if word.is_empty() {
            return Ok(UNKNOWN_POS);
        }
        if self.tags.contains_key(word) {
            self.hits += 1;
        } else {
            let tag = analyzer.tag_word(word)?;
            self.misses += 1;
            self.tags.insert(word.to_string(), tag);
        }
        Ok(self.tags.get(word).map(String::as_str).unwrap_or(UNKNOWN_POS))
    }

    /// Fill in the tag of every untagged token in place.
    pub fn retag_unknown<A: MorphAnalyzer + ?Sized>(
        &mut self,
        analyzer: &A,
        tokens: &mut [TaggedToken],
    ) -> Result<()> {
        for token in tokens.iter_mut().filter(|t| t.pos == UNKNOWN_POS) {
            token.pos = self.lookup(analyzer, &token.surface)?.to_string();
        }
        Ok(())
    }

    /// Tag a whole list of bare surface forms.
    pub fn tag_all<A: MorphAnalyzer + ?Sized, S: AsRef<str>>(
        &mut self,
        analyzer: &A,
        surfaces: &[S],
    ) -> Result<Vec<TaggedToken>> {
        surfaces
            .iter()
            .map(|s| {
                let surface = s.as_ref();
                let pos = self.lookup(analyzer, surface)?.to_string();
                Ok(TaggedToken::new(surface, pos))
            })
            .collect()
    }

    /// Remember a tag that is already known (e.g. from a full analysis).
    pub fn remember(&mut self, token: &TaggedToken) {
        if token.pos != UNKNOWN_POS {
            self.tags
                .entry(token.surface.clone())
                .or_insert_with(|| token.pos.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// (hits, misses) since creation
    pub fn stats(&self) -> (usize, usize) {
        (self.hits, self.misses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct CountingAnalyzer {
        calls: Cell<usize>,
    }

    impl MorphAnalyzer for CountingAnalyzer {
        fn analyze(&self, text: &str) -> Result<Vec<TaggedToken>> {
            self.calls.set(self.calls.get() + 1);
            let pos = if text.ends_with('る') { "動詞" } else { "名詞" };
            Ok(vec![TaggedToken::new(text, pos)])
        }

        fn name(&self) -> &'static str {
            "counting"
        }
    }

    #[test]
    fn test_lookup_is_memoized() {
        let analyzer = CountingAnalyzer { calls: Cell::new(0) };
        let mut cache = PosCache::new();

        assert_eq!(cache.lookup(&analyzer, "走る").unwrap(), "動詞");
        assert_eq!(cache.lookup(&analyzer, "走る").unwrap(), "動詞");
        assert_eq!(cache.lookup(&analyzer, "進化").unwrap(), "名詞");

        assert_eq!(analyzer.calls.get(), 2);
        assert_eq!(cache.stats(), (1, 2));
    }

    #[test]
    fn test_empty_word_is_not_analyzed() {
        let analyzer = CountingAnalyzer { calls: Cell::new(0) };
        let mut cache = PosCache::new();

        assert_eq!(cache.lookup(&analyzer, "").unwrap(), UNKNOWN_POS);
        assert_eq!(analyzer.calls.get(), 0);
    }

    #[test]
    fn test_retag_unknown_only_touches_untagged() {
        let analyzer = CountingAnalyzer { calls: Cell::new(0) };
        let mut cache = PosCache::new();
        let mut tokens = vec![
            TaggedToken::new("進化", "名詞"),
            TaggedToken::untagged("人工知能"),
        ];

        cache.retag_unknown(&analyzer, &mut tokens).unwrap();

        assert_eq!(tokens[1].pos, "名詞");
        assert_eq!(analyzer.calls.get(), 1);
    }

    #[test]
    fn test_remembered_tags_skip_analysis() {
        let analyzer = CountingAnalyzer { calls: Cell::new(0) };
        let mut cache = PosCache::new();
        cache.remember(&TaggedToken::new("走る", "名詞"));

        let tagged = cache.tag_all(&analyzer, &["走る", "学ぶる"]).unwrap();
        assert_eq!(tagged[0].pos, "名詞");
        assert_eq!(tagged[1].pos, "動詞");
        assert_eq!(analyzer.calls.get(), 1);
    }
}
