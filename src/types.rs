//! Core data types shared across the crate.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Part-of-speech tag assigned to tokens the analyzer never saw
/// (e.g. words typed in by hand before they are re-tagged).
pub const UNKNOWN_POS: &str = "";

/// A surface form carried together with its coarse part-of-speech tag.
///
/// Filtering and editing always operate on whole records, so a token and
/// its tag can never drift apart.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaggedToken {
    /// Literal text of the token as produced by the analyzer
    pub surface: String,
    /// Coarse part-of-speech category (e.g. `名詞`, `動詞`)
    pub pos: String,
}

impl TaggedToken {
    /// Create a new tagged token
    pub fn new(surface: impl Into<String>, pos: impl Into<String>) -> Self {
        Self {
            surface: surface.into(),
            pos: pos.into(),
        }
    }

    /// Create a token whose part of speech is not known yet
    pub fn untagged(surface: impl Into<String>) -> Self {
        Self::new(surface, UNKNOWN_POS)
    }

    /// Number of characters (not bytes) in the surface form
    pub fn char_len(&self) -> usize {
        self.surface.chars().count()
    }
}

impl fmt::Display for TaggedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.surface, self.pos)
    }
}

/// An unordered pair of co-occurring tokens.
///
/// The two surface forms are stored sorted, so `(a, b)` and `(b, a)` produce
/// the same key. Both sides may be equal (a self-pair).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CooccurrencePair {
    first: String,
    second: String,
}

impl CooccurrencePair {
    /// Build the canonical pair for two surface forms
    pub fn new(a: &str, b: &str) -> Self {
        if a <= b {
            Self {
                first: a.to_string(),
                second: b.to_string(),
            }
        } else {
            Self {
                first: b.to_string(),
                second: a.to_string(),
            }
        }
    }

    /// Lexicographically smaller side
    pub fn first(&self) -> &str {
        &self.first
    }

    /// Lexicographically larger side
    pub fn second(&self) -> &str {
        &self.second
    }

    /// Whether both sides are the same token
    pub fn is_self_pair(&self) -> bool {
        self.first == self.second
    }
}

impl fmt::Display for CooccurrencePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.first, self.second)
    }
}

/// How co-occurrence windows are formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowMode {
    /// Fixed-size window sliding over the flat token stream
    #[default]
    Sliding,
    /// Every pair of tokens on the same input line
    Line,
}

impl WindowMode {
    /// Returns the user-facing name used in JSON and error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sliding => "sliding",
            Self::Line => "line",
        }
    }
}

impl FromStr for WindowMode {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "sliding" | "window" => Ok(Self::Sliding),
            "line" | "per_line" => Ok(Self::Line),
            other => Err(format!("unknown window mode \"{other}\"")),
        }
    }
}

/// What to do with edges joining a token to itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelfLoopPolicy {
    /// Keep self-loops as ordinary edges
    Keep,
    /// Drop self-loops before the network is built
    #[default]
    Remove,
}

impl SelfLoopPolicy {
    /// Returns the user-facing name used in JSON and error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Keep => "keep",
            Self::Remove => "remove",
        }
    }
}

/// Runtime knobs for one analysis run.
///
/// Stopwords and merge rules are passed separately; this struct only holds
/// the numeric and mode settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Words occurring fewer times are left out of the charts and the network
    pub min_frequency: usize,
    /// Window mode for co-occurrence extraction
    pub window_mode: WindowMode,
    /// Sliding window size (ignored in line mode)
    pub window_size: usize,
    /// Pairs observed fewer times never become edges
    pub min_cooccurrence: usize,
    /// Maximum number of edges taken into the network
    pub max_edges: usize,
    /// Self-loop handling
    pub self_loops: SelfLoopPolicy,
    /// Collapse runs of identical adjacent tokens before pairing
    pub collapse_consecutive: bool,
    /// Count each pair at most once per line (line mode only)
    pub dedup_per_line: bool,
    /// Number of entries returned for the frequency chart
    pub top_k: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_frequency: 2,
            window_mode: WindowMode::Sliding,
            window_size: 5,
            min_cooccurrence: 1,
            max_edges: 50,
            self_loops: SelfLoopPolicy::Remove,
            collapse_consecutive: false,
            dedup_per_line: false,
            top_k: 30,
        }
    }
}

impl AnalysisConfig {
    /// Set the minimum word frequency
    pub fn with_min_frequency(mut self, min_frequency: usize) -> Self {
        self.min_frequency = min_frequency;
        self
    }

    /// Set the window mode
    pub fn with_window_mode(mut self, mode: WindowMode) -> Self {
        self.window_mode = mode;
        self
    }

    /// Set the sliding window size
    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    /// Set the minimum co-occurrence count
    pub fn with_min_cooccurrence(mut self, min_cooccurrence: usize) -> Self {
        self.min_cooccurrence = min_cooccurrence;
        self
    }

    /// Set the maximum number of edges
    pub fn with_max_edges(mut self, max_edges: usize) -> Self {
        self.max_edges = max_edges;
        self
    }

    /// Set the self-loop policy
    pub fn with_self_loops(mut self, policy: SelfLoopPolicy) -> Self {
        self.self_loops = policy;
        self
    }

    /// Enable or disable consecutive-duplicate collapsing
    pub fn with_collapse_consecutive(mut self, collapse: bool) -> Self {
        self.collapse_consecutive = collapse;
        self
    }

    /// Enable or disable per-line pair deduplication
    pub fn with_dedup_per_line(mut self, dedup: bool) -> Self {
        self.dedup_per_line = dedup;
        self
    }

    /// Set the number of frequency chart entries
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }
}
