//! Stopword filtering
//!
//! A [`StopwordSet`] decides whether a token is significant: its surface must
//! not be in the set, and it must be at least [`MIN_TOKEN_CHARS`] characters
//! long. The length rule holds for every set, including an empty one.
//!
//! Lists for European languages come from the `stop-words` crate; the default
//! set is a list of Japanese function words.

use rustc_hash::FxHashSet;
use stop_words::{get, LANGUAGE};

use crate::types::TaggedToken;

/// Tokens shorter than this many characters never survive filtering.
pub const MIN_TOKEN_CHARS: usize = 2;

/// A mutable set of stopwords plus the minimum-length rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopwordSet {
    stopwords: FxHashSet<String>,
    /// Whether membership tests are case-sensitive
    case_sensitive: bool,
}

impl Default for StopwordSet {
    fn default() -> Self {
        Self::new()
    }
}

impl StopwordSet {
    /// Create the default set (Japanese function words)
    pub fn new() -> Self {
        Self {
            stopwords: Self::japanese_stopwords(),
            case_sensitive: true,
        }
    }

    /// Create an empty set (only the length rule applies)
    pub fn empty() -> Self {
        Self {
            stopwords: FxHashSet::default(),
            case_sensitive: true,
        }
    }

    /// Create a set from a custom list
    pub fn from_list(words: &[&str]) -> Self {
        let mut set = Self::empty();
        set.add_stopwords(words);
        set
    }

    /// Create a set for the given language
    ///
    /// Supported languages: ja and everything the `stop-words` crate
    /// ships (en, de, fr, es, it, pt, nl, ru, ...). Lists loaded from the
    /// crate are lowercase, so membership becomes case-insensitive. Unlisted
    /// languages get the English list.
    pub fn for_language(language: &str) -> Self {
        let lang = match language.to_lowercase().as_str() {
            "ja" | "japanese" => return Self::new(),
            "en" | "english" => LANGUAGE::English,
            "de" | "german" => LANGUAGE::German,
            "fr" | "french" => LANGUAGE::French,
            "es" | "spanish" => LANGUAGE::Spanish,
            "it" | "italian" => LANGUAGE::Italian,
            "pt" | "portuguese" => LANGUAGE::Portuguese,
            "nl" | "dutch" => LANGUAGE::Dutch,
            "ru" | "russian" => LANGUAGE::Russian,
            "sv" | "swedish" => LANGUAGE::Swedish,
            "no" | "norwegian" => LANGUAGE::Norwegian,
            "da" | "danish" => LANGUAGE::Danish,
            "fi" | "finnish" => LANGUAGE::Finnish,
            _ => LANGUAGE::English,
        };

        Self {
            stopwords: get(lang).iter().map(|s| s.to_string()).collect(),
            case_sensitive: false,
        }
    }

    /// Set case sensitivity
    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        if !case_sensitive {
            self.stopwords = self.stopwords.drain().map(|w| w.to_lowercase()).collect();
        }
        self
    }

    fn key<'a>(&self, word: &'a str) -> std::borrow::Cow<'a, str> {
        if self.case_sensitive {
            std::borrow::Cow::Borrowed(word)
        } else {
            std::borrow::Cow::Owned(word.to_lowercase())
        }
    }

    /// Add one stopword, returning `false` if it was already present
    pub fn insert(&mut self, word: &str) -> bool {
        let word = word.trim();
        if word.is_empty() {
            return false;
        }
        let key = self.key(word).into_owned();
        self.stopwords.insert(key)
    }

    /// Remove one stopword, returning `true` if it was present
    pub fn remove(&mut self, word: &str) -> bool {
        let key = self.key(word);
        self.stopwords.remove(&*key)
    }

    /// Add additional stopwords
    pub fn add_stopwords(&mut self, words: &[&str]) {
        for word in words {
            self.insert(word);
        }
    }

    /// Remove stopwords
    pub fn remove_stopwords(&mut self, words: &[&str]) {
        for word in words {
            self.remove(word);
        }
    }

    /// Check if a word is in the set
    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(&*self.key(word))
    }

    /// Whether a surface form survives filtering
    pub fn is_significant(&self, surface: &str) -> bool {
        surface.chars().nth(MIN_TOKEN_CHARS - 1).is_some() && !self.is_stopword(surface)
    }

    /// Keep the significant tokens, preserving order
    pub fn filter(&self, tokens: &[TaggedToken]) -> Vec<TaggedToken> {
        tokens
            .iter()
            .filter(|t| self.is_significant(&t.surface))
            .cloned()
            .collect()
    }

    /// Keep the significant surface forms, preserving order
    pub fn filter_surfaces<S: AsRef<str>>(&self, surfaces: &[S]) -> Vec<String> {
        surfaces
            .iter()
            .map(|s| s.as_ref())
            .filter(|s| self.is_significant(s))
            .map(str::to_string)
            .collect()
    }

    /// Stopwords in sorted order (for display)
    pub fn sorted(&self) -> Vec<&str> {
        let mut words: Vec<&str> = self.stopwords.iter().map(String::as_str).collect();
        words.sort_unstable();
        words
    }

    /// Get the number of stopwords in the set
    pub fn len(&self) -> usize {
        self.stopwords.len()
    }

    /// Check if the set is empty
    pub fn is_empty(&self) -> bool {
        self.stopwords.is_empty()
    }

    /// Japanese particles, auxiliaries and formal nouns
    fn japanese_stopwords() -> FxHashSet<String> {
        [
            "の", "に", "は", "を", "た", "が", "で", "て", "と", "し", "れ", "さ",
            "ある", "いる", "も", "する", "から", "な", "こと", "として", "い",
            "や", "れる", "など", "なっ", "ない", "この", "ため", "その", "あっ",
            "よう", "また", "もの", "という", "あり", "まで", "られ", "なる",
            "へ", "か", "だ", "これ", "によって", "により", "おり", "より", "による",
            "ず", "なり", "られる", "において", "ば", "なかっ", "なく", "しかし",
            "について", "せ", "だっ", "その後", "できる", "それ", "う", "ので",
            "なお", "のみ", "でき", "き", "つ", "における", "および", "いう",
            "さらに", "でも", "ら", "たり", "その他", "に関する", "たち", "ます",
            "ん", "なら", "に対して", "特に", "せる", "あるいは", "まし",
            "ながら", "ただし", "かつて", "ください", "なし", "これら", "それら",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }
}

impl Extend<String> for StopwordSet {
    fn extend<I: IntoIterator<Item = String>>(&mut self, iter: I) {
        for word in iter {
            self.insert(&word);
        }
    }
}

impl FromIterator<String> for StopwordSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut set = Self::empty();
        set.extend(iter);
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(surfaces: &[&str]) -> Vec<TaggedToken> {
        surfaces.iter().map(|s| TaggedToken::new(*s, "名詞")).collect()
    }

    #[test]
    fn test_japanese_defaults() {
        let set = StopwordSet::new();

        assert!(set.is_stopword("の"));
        assert!(set.is_stopword("によって"));
        assert!(!set.is_stopword("機械"));
    }

    #[test]
    fn test_length_rule_applies_to_empty_set() {
        let set = StopwordSet::empty();

        assert!(set.is_empty());
        assert!(!set.is_significant("a"));
        assert!(!set.is_significant("の"));
        assert!(!set.is_significant(""));
        assert!(set.is_significant("ab"));
        assert!(set.is_significant("進化"));
    }

    #[test]
    fn test_filter_keeps_order_and_tags() {
        let set = StopwordSet::from_list(&["の"]);
        let filtered = set.filter(&[
            TaggedToken::new("人工", "名詞"),
            TaggedToken::new("の", "助詞"),
            TaggedToken::new("進化", "名詞"),
            TaggedToken::new("x", "記号"),
        ]);
        assert_eq!(
            filtered,
            vec![TaggedToken::new("人工", "名詞"), TaggedToken::new("進化", "名詞")]
        );
    }

    #[test]
    fn test_filter_is_idempotent() {
        let set = StopwordSet::from_list(&["進化", "AI"]);
        let input = tokens(&["人工", "知能", "の", "進化", "AI", "未来", "x", "人工"]);

        let once = set.filter(&input);
        let twice = set.filter(&once);
        assert_eq!(once, twice);
        assert!(once.iter().all(|t| t.char_len() >= MIN_TOKEN_CHARS));
    }

    #[test]
    fn test_custom_stopwords() {
        let mut set = StopwordSet::from_list(&["custom", "words"]);

        assert!(set.is_stopword("custom"));
        assert!(set.is_stopword("words"));
        assert!(!set.is_stopword("the"));

        assert!(set.insert("extra"));
        assert!(!set.insert("extra"));
        assert!(set.is_stopword("extra"));

        set.remove_stopwords(&["custom"]);
        assert!(!set.is_stopword("custom"));
        assert!(!set.insert("   "));
    }

    #[test]
    fn test_exact_match_by_default() {
        let set = StopwordSet::from_list(&["Rust"]);
        assert!(set.is_stopword("Rust"));
        assert!(!set.is_stopword("rust"));

        let folded = set.with_case_sensitive(false);
        assert!(folded.is_stopword("rust"));
        assert!(folded.is_stopword("RUST"));
    }

    #[test]
    fn test_english_stopwords() {
        let set = StopwordSet::for_language("en");

        assert!(set.is_stopword("the"));
        assert!(set.is_stopword("The"));
        assert!(!set.is_stopword("machine"));
    }

    #[test]
    fn test_unlisted_language_uses_english_list() {
        let set = StopwordSet::for_language("zh");

        assert_eq!(set.len(), StopwordSet::for_language("en").len());
        assert!(set.is_stopword("the"));
        assert!(!set.is_stopword("的"));
    }

    #[test]
    fn test_sorted_listing() {
        let set = StopwordSet::from_list(&["c", "a", "b"]);
        assert_eq!(set.sorted(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_filter_surfaces() {
        let set = StopwordSet::from_list(&["AI"]);
        let kept = set.filter_surfaces(&["人工知能", "AI", "x", "未来"]);
        assert_eq!(kept, vec!["人工知能", "未来"]);
    }
}
