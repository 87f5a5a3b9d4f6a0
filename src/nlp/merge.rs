//! Multi-word merge rules
//!
//! A merge rule rewrites a fixed sequence of 2 to 4 adjacent tokens into a
//! single token (e.g. `人工` `知能` → `人工知能`). Rules are applied before
//! stopword filtering, scanning left to right and preferring longer rules.
//!
//! Matching is greedy: at each position the longest matching rule wins and
//! the cursor skips past it. Rules of equal length are tried in insertion
//! order, so the output depends only on the token sequence and the rule set.

use serde::{Deserialize, Serialize};

use crate::error::{KyokiError, Result};
use crate::types::TaggedToken;

/// Shortest sequence a rule may join
pub const MIN_RULE_LEN: usize = 2;
/// Longest sequence a rule may join
pub const MAX_RULE_LEN: usize = 4;

/// A rewrite of `len` adjacent tokens into one replacement token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeRule {
    /// Declared number of tokens in `sequence`
    #[serde(rename = "len")]
    length: usize,
    /// Tokens to match, in order
    #[serde(rename = "seq")]
    sequence: Vec<String>,
    /// Token emitted in place of the sequence
    #[serde(rename = "merged")]
    replacement: String,
}

impl MergeRule {
    /// Create a rule, checking that `length` matches the sequence and lies
    /// within 2..=4.
    pub fn new<S: Into<String>>(
        length: usize,
        sequence: impl IntoIterator<Item = S>,
        replacement: impl Into<String>,
    ) -> Result<Self> {
        let sequence: Vec<String> = sequence.into_iter().map(Into::into).collect();
        let rule = Self {
            length,
            sequence,
            replacement: replacement.into(),
        };
        rule.validate()?;
        Ok(rule)
    }

    /// Create a rule whose length is taken from the sequence itself.
    pub fn from_tokens<S: Into<String>>(
        sequence: impl IntoIterator<Item = S>,
        replacement: impl Into<String>,
    ) -> Result<Self> {
        let sequence: Vec<String> = sequence.into_iter().map(Into::into).collect();
        Self::new(sequence.len(), sequence, replacement)
    }

    /// Check the declared length against the sequence.
    pub fn validate(&self) -> Result<()> {
        if self.length != self.sequence.len()
            || !(MIN_RULE_LEN..=MAX_RULE_LEN).contains(&self.length)
        {
            return Err(KyokiError::MergeRuleLengthMismatch {
                declared: self.length,
                actual: self.sequence.len(),
            });
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn sequence(&self) -> &[String] {
        &self.sequence
    }

    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    fn matches_at<S: AsRef<str>>(&self, tokens: &[S], start: usize) -> bool {
        let end = start + self.length;
        end <= tokens.len()
            && tokens[start..end]
                .iter()
                .zip(&self.sequence)
                .all(|(token, expected)| token.as_ref() == expected)
    }
}

/// One step of a merge plan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStep {
    /// Emit the token at this input index unchanged
    Keep(usize),
    /// Emit the replacement of rule `rule` for the tokens starting at `start`
    Merge { rule: usize, start: usize },
}

/// An ordered collection of merge rules with unique sequences
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<MergeRule>", into = "Vec<MergeRule>")]
pub struct MergeRuleSet {
    /// Rules in insertion order
    rules: Vec<MergeRule>,
    /// Indices into `rules`, longest first, ties in insertion order
    by_length: Vec<usize>,
}

impl MergeRuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule. Rejects rules with a bad length and rules whose sequence
    /// is already present; the set is unchanged on error.
    pub fn insert(&mut self, rule: MergeRule) -> Result<()> {
        rule.validate()?;
        if self.rules.iter().any(|r| r.sequence == rule.sequence) {
            trace_event!(sequence = ?rule.sequence, "rejected duplicate merge rule");
            return Err(KyokiError::DuplicateMergeRule {
                sequence: rule.sequence,
            });
        }
        self.rules.push(rule);
        self.reindex();
        Ok(())
    }

    /// Remove the rule for `sequence`, returning it if it existed.
    pub fn remove<S: AsRef<str>>(&mut self, sequence: &[S]) -> Option<MergeRule> {
        let pos = self.rules.iter().position(|r| {
            r.sequence.len() == sequence.len()
                && r.sequence.iter().zip(sequence).all(|(a, b)| a == b.as_ref())
        })?;
        let removed = self.rules.remove(pos);
        self.reindex();
        Some(removed)
    }

    /// Remove every rule.
    pub fn clear(&mut self) {
        self.rules.clear();
        self.by_length.clear();
    }

    fn reindex(&mut self) {
        let mut order: Vec<usize> = (0..self.rules.len()).collect();
        // Stable sort keeps insertion order among equal lengths.
        order.sort_by(|&a, &b| self.rules[b].length.cmp(&self.rules[a].length));
        self.by_length = order;
    }

    /// Rules in insertion order
    pub fn rules(&self) -> &[MergeRule] {
        &self.rules
    }

    /// Rules in evaluation order (longest first)
    pub fn evaluation_order(&self) -> impl Iterator<Item = &MergeRule> + '_ {
        self.by_length.iter().map(move |&i| &self.rules[i])
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Compute the merge plan for a token sequence.
    ///
    /// The cursor advances by at least one on every step, so the plan has at
    /// most `tokens.len()` steps.
    pub fn plan<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<MergeStep> {
        let mut steps = Vec::with_capacity(tokens.len());
        let mut cursor = 0;

        while cursor < tokens.len() {
            let matched = self
                .by_length
                .iter()
                .copied()
                .find(|&idx| self.rules[idx].matches_at(tokens, cursor));

            match matched {
                Some(rule) => {
                    steps.push(MergeStep::Merge {
                        rule,
                        start: cursor,
                    });
                    cursor += self.rules[rule].length;
                }
                None => {
                    steps.push(MergeStep::Keep(cursor));
                    cursor += 1;
                }
            }
        }

        steps
    }

    /// Rewrite a sequence of surface forms.
    pub fn apply<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<String> {
        if self.is_empty() {
            return tokens.iter().map(|t| t.as_ref().to_string()).collect();
        }
        self.plan(tokens)
            .into_iter()
            .map(|step| match step {
                MergeStep::Keep(i) => tokens[i].as_ref().to_string(),
                MergeStep::Merge { rule, .. } => self.rules[rule].replacement.clone(),
            })
            .collect()
    }

    /// Rewrite a sequence of tagged tokens.
    ///
    /// Unmerged tokens keep their tags; merged tokens come out untagged and
    /// need re-tagging (see [`PosCache`](super::pos_cache::PosCache)).
    pub fn apply_tagged(&self, tokens: &[TaggedToken]) -> Vec<TaggedToken> {
        if self.is_empty() {
            return tokens.to_vec();
        }
        let surfaces: Vec<&str> = tokens.iter().map(|t| t.surface.as_str()).collect();
        self.plan(&surfaces)
            .into_iter()
            .map(|step| match step {
                MergeStep::Keep(i) => tokens[i].clone(),
                MergeStep::Merge { rule, .. } => {
                    TaggedToken::untagged(self.rules[rule].replacement.clone())
                }
            })
            .collect()
    }
}

impl TryFrom<Vec<MergeRule>> for MergeRuleSet {
    type Error = KyokiError;

    fn try_from(rules: Vec<MergeRule>) -> Result<Self> {
        let mut set = Self::new();
        for rule in rules {
            set.insert(rule)?;
        }
        Ok(set)
    }
}

impl From<MergeRuleSet> for Vec<MergeRule> {
    fn from(set: MergeRuleSet) -> Self {
        set.rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UNKNOWN_POS;

    fn rule(seq: &[&str], merged: &str) -> MergeRule {
        MergeRule::from_tokens(seq.iter().copied(), merged).unwrap()
    }

    fn set(rules: Vec<MergeRule>) -> MergeRuleSet {
        MergeRuleSet::try_from(rules).unwrap()
    }

    #[test]
    fn test_simple_merge() {
        let rules = set(vec![rule(&["人工", "知能"], "人工知能")]);
        assert_eq!(
            rules.apply(&["人工", "知能", "進化"]),
            vec!["人工知能", "進化"]
        );
    }

    #[test]
    fn test_longest_match_wins() {
        let rules = set(vec![rule(&["A", "B"], "X"), rule(&["A", "B", "C"], "Y")]);
        assert_eq!(rules.apply(&["A", "B", "C"]), vec!["Y"]);
        assert_eq!(rules.apply(&["A", "B", "D"]), vec!["X", "D"]);
    }

    #[test]
    fn test_overlapping_rules_resolve_left_to_right() {
        let rules = set(vec![rule(&["B", "C"], "bc"), rule(&["A", "B"], "ab")]);
        assert_eq!(rules.apply(&["A", "B", "C"]), vec!["ab", "C"]);
        assert_eq!(rules.apply(&["B", "C", "A", "B"]), vec!["bc", "ab"]);
    }

    #[test]
    fn test_longer_rule_needs_enough_tokens() {
        let rules = set(vec![rule(&["B", "C"], "bc"), rule(&["B", "C", "D"], "bcd")]);
        assert_eq!(rules.apply(&["A", "B", "C"]), vec!["A", "bc"]);
    }

    #[test]
    fn test_greedy_not_global() {
        // Greedy takes (A,B) at 0 and can no longer use (B,C,D).
        let rules = set(vec![rule(&["A", "B"], "X"), rule(&["B", "C", "D"], "Y")]);
        assert_eq!(rules.apply(&["A", "B", "C", "D"]), vec!["X", "C", "D"]);
    }

    #[test]
    fn test_empty_rule_set_is_identity() {
        let rules = MergeRuleSet::new();
        let input = vec!["人工", "知能", "の", "進化"];
        assert_eq!(rules.apply(&input), input);
    }

    #[test]
    fn test_apply_is_deterministic() {
        let rules = set(vec![
            rule(&["機械", "学習"], "機械学習"),
            rule(&["深層", "学習", "モデル"], "深層学習モデル"),
            rule(&["人工", "知能"], "人工知能"),
        ]);
        let input = ["深層", "学習", "モデル", "と", "機械", "学習", "と", "人工", "知能"];
        let first = rules.apply(&input);
        for _ in 0..5 {
            assert_eq!(rules.apply(&input), first);
        }
        assert_eq!(first, vec!["深層学習モデル", "と", "機械学習", "と", "人工知能"]);
    }

    #[test]
    fn test_duplicate_sequence_rejected() {
        let mut rules = set(vec![rule(&["人工", "知能"], "人工知能")]);
        let err = rules.insert(rule(&["人工", "知能"], "AI")).unwrap_err();

        assert!(matches!(err, KyokiError::DuplicateMergeRule { .. }));
        assert_eq!(rules.len(), 1);
        assert_eq!(rules.rules()[0].replacement(), "人工知能");
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let err = MergeRule::new(3, ["人工", "知能"], "人工知能").unwrap_err();
        assert!(matches!(
            err,
            KyokiError::MergeRuleLengthMismatch {
                declared: 3,
                actual: 2
            }
        ));

        assert!(MergeRule::from_tokens(["a"], "a").is_err());
        assert!(MergeRule::from_tokens(["a", "b", "c", "d", "e"], "x").is_err());
    }

    #[test]
    fn test_remove_rule() {
        let mut rules = set(vec![rule(&["A", "B"], "X"), rule(&["A", "B", "C"], "Y")]);
        let removed = rules.remove(&["A", "B", "C"]).unwrap();

        assert_eq!(removed.replacement(), "Y");
        assert_eq!(rules.apply(&["A", "B", "C"]), vec!["X", "C"]);
        assert!(rules.remove(&["Z", "Z"]).is_none());
    }

    #[test]
    fn test_evaluation_order() {
        let rules = set(vec![
            rule(&["a", "b"], "ab"),
            rule(&["a", "b", "c", "d"], "abcd"),
            rule(&["c", "d"], "cd"),
            rule(&["b", "c", "d"], "bcd"),
        ]);
        let order: Vec<_> = rules.evaluation_order().map(|r| r.replacement()).collect();
        assert_eq!(order, vec!["abcd", "bcd", "ab", "cd"]);
    }

    #[test]
    fn test_apply_tagged_untags_merged_tokens() {
        let rules = set(vec![rule(&["人工", "知能"], "人工知能")]);
        let out = rules.apply_tagged(&[
            TaggedToken::new("人工", "名詞"),
            TaggedToken::new("知能", "名詞"),
            TaggedToken::new("の", "助詞"),
        ]);
        assert_eq!(
            out,
            vec![TaggedToken::untagged("人工知能"), TaggedToken::new("の", "助詞")]
        );
        assert_eq!(out[0].pos, UNKNOWN_POS);
    }

    #[test]
    fn test_serde_uses_rule_field_names() {
        let json = r#"[{"len": 2, "seq": ["人工", "知能"], "merged": "人工知能"}]"#;
        let rules: MergeRuleSet = serde_json::from_str(json).unwrap();
        assert_eq!(rules.len(), 1);

        let back = serde_json::to_value(&rules).unwrap();
        assert_eq!(back[0]["merged"], "人工知能");
    }

    #[test]
    fn test_serde_rejects_duplicates() {
        let json = r#"[
            {"len": 2, "seq": ["a", "b"], "merged": "ab"},
            {"len": 2, "seq": ["a", "b"], "merged": "AB"}
        ]"#;
        assert!(serde_json::from_str::<MergeRuleSet>(json).is_err());
    }
}
