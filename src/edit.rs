//! The curated token list
//!
//! Between tokenization and visualization the user edits the token list:
//! deleting words, replacing them, dropping a whole part of speech, or
//! re-applying stopwords. [`TokenDocument`] holds that list as lines of
//! [`TaggedToken`]s, so every edit moves a token together with its tag.
//! Tokens introduced by an edit start untagged and get their tag from
//! [`TokenDocument::retag`].

use serde::Serialize;

use crate::error::Result;
use crate::frequency::{FrequencyEntry, FrequencyTable};
use crate::nlp::analyzer::MorphAnalyzer;
use crate::nlp::pos_cache::PosCache;
use crate::nlp::stopwords::StopwordSet;
use crate::nlp::tokenizer::TokenizedText;
use crate::types::{TaggedToken, UNKNOWN_POS};

/// Editable token lines
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TokenDocument {
    lines: Vec<Vec<TaggedToken>>,
}

impl TokenDocument {
    /// Parse whitespace-separated text, one token line per non-blank text
    /// line. Tokens come out untagged.
    pub fn parse(text: &str) -> Self {
        let lines = text
            .lines()
            .map(|line| {
                line.split_whitespace()
                    .map(TaggedToken::untagged)
                    .collect::<Vec<_>>()
            })
            .filter(|line| !line.is_empty())
            .collect();
        Self { lines }
    }

    /// Start from the filtered lines of a tokenization, keeping its tags.
    pub fn from_tokenized(text: &TokenizedText, stopwords: &StopwordSet) -> Self {
        let lines = text
            .pre_tokens_lines
            .iter()
            .map(|line| stopwords.filter(line))
            .filter(|line| !line.is_empty())
            .collect();
        Self { lines }
    }

    /// Re-read edited text and tag every token through `cache`.
    ///
    /// Tags already known to this document are reused before the analyzer
    /// is consulted.
    pub fn refresh<A: MorphAnalyzer + ?Sized>(
        &self,
        text: &str,
        analyzer: &A,
        cache: &mut PosCache,
    ) -> Result<TokenDocument> {
        for token in self.tokens() {
            cache.remember(token);
        }
        let mut doc = Self::parse(text);
        doc.retag(analyzer, cache)?;
        Ok(doc)
    }

    /// Fill in tags for untagged tokens.
    pub fn retag<A: MorphAnalyzer + ?Sized>(&mut self, analyzer: &A, cache: &mut PosCache) -> Result<()> {
        for line in &mut self.lines {
            cache.retag_unknown(analyzer, line)?;
        }
        Ok(())
    }

    pub fn lines(&self) -> &[Vec<TaggedToken>] {
        &self.lines
    }

    /// Every token, line after line
    pub fn tokens(&self) -> impl Iterator<Item = &TaggedToken> + '_ {
        self.lines.iter().flatten()
    }

    pub fn surfaces(&self) -> Vec<&str> {
        self.tokens().map(|t| t.surface.as_str()).collect()
    }

    /// Surface forms per line
    pub fn line_surfaces(&self) -> Vec<Vec<&str>> {
        self.lines
            .iter()
            .map(|line| line.iter().map(|t| t.surface.as_str()).collect())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lines.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Render back to editable text: tokens space-joined, one line each.
    pub fn to_text(&self) -> String {
        self.lines
            .iter()
            .map(|line| {
                line.iter()
                    .map(|t| t.surface.as_str())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn frequencies(&self) -> FrequencyTable {
        FrequencyTable::from_tokens(self.tokens().map(|t| t.surface.as_str()))
    }

    /// Tokens per part of speech
    pub fn pos_breakdown(&self) -> FrequencyTable {
        FrequencyTable::from_tokens(self.tokens().map(|t| t.pos.as_str()))
    }

    /// Frequency entries whose word contains `term`, case-insensitively,
    /// most frequent first.
    pub fn search(&self, term: &str) -> Vec<FrequencyEntry> {
        self.frequencies().search(term)
    }

    /// Drop tokens matching `predicate`, then drop lines left empty.
    /// Returns the number of tokens removed.
    fn remove_where<F: Fn(&TaggedToken) -> bool>(&mut self, predicate: F) -> usize {
        let before = self.len();
        for line in &mut self.lines {
            line.retain(|t| !predicate(t));
        }
        self.lines.retain(|line| !line.is_empty());
        before - self.len()
    }

    /// Delete every occurrence of `word`.
    pub fn remove_word(&mut self, word: &str) -> usize {
        self.remove_where(|t| t.surface == word)
    }

    /// Replace every exact occurrence of `from` with `to`.
    ///
    /// An empty `from` does nothing; an empty `to` deletes. A `to` holding
    /// several whitespace-separated words inserts all of them. Inserted
    /// tokens are untagged. Returns the number of occurrences replaced.
    pub fn replace_word(&mut self, from: &str, to: &str) -> usize {
        if from.is_empty() {
            return 0;
        }
        let replacement: Vec<TaggedToken> = to.split_whitespace().map(TaggedToken::untagged).collect();
        if replacement.is_empty() {
            return self.remove_word(from);
        }
        if replacement.len() == 1 && replacement[0].surface == from {
            return 0;
        }

        let mut replaced = 0;
        for line in &mut self.lines {
            if !line.iter().any(|t| t.surface == from) {
                continue;
            }
            let mut rewritten = Vec::with_capacity(line.len());
            for token in line.drain(..) {
                if token.surface == from {
                    rewritten.extend(replacement.iter().cloned());
                    replaced += 1;
                } else {
                    rewritten.push(token);
                }
            }
            *line = rewritten;
        }
        replaced
    }

    /// Delete every token tagged `pos`.
    pub fn remove_pos(&mut self, pos: &str) -> usize {
        self.remove_where(|t| t.pos == pos)
    }

    /// Delete every token in `stopwords`.
    pub fn apply_stopwords(&mut self, stopwords: &StopwordSet) -> usize {
        self.remove_where(|t| stopwords.is_stopword(&t.surface))
    }

    /// Number of tokens still waiting for a tag
    pub fn untagged_count(&self) -> usize {
        self.tokens().filter(|t| t.pos == UNKNOWN_POS).count()
    }
}
