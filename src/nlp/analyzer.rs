//! Morphological analyzer boundary
//!
//! The core never depends on a specific tagger. Anything that can turn a
//! piece of text into ordered `(surface, part-of-speech)` records implements
//! [`MorphAnalyzer`]. Two adapters ship with the crate:
//!
//! - [`ChasenAnalyzer`] parses ChaSen-format output (`mecab -Ochasen`) from
//!   any [`Tagger`], e.g. [`CommandTagger`] which pipes text through an
//!   external process.
//! - [`UnicodeWordAnalyzer`] splits on Unicode word boundaries and assigns a
//!   coarse script-class tag, for languages that separate words with spaces.

use std::io::Write;
use std::process::{Command, Stdio};

use unicode_segmentation::UnicodeSegmentation;

use crate::error::{KyokiError, Result};
use crate::types::TaggedToken;

/// A morphological analyzer: text in, tagged tokens out.
pub trait MorphAnalyzer {
    /// Analyze `text` into ordered tagged tokens.
    fn analyze(&self, text: &str) -> Result<Vec<TaggedToken>>;

    /// Short name used in logs and error messages.
    fn name(&self) -> &'static str;

    /// Tag a single word in isolation.
    ///
    /// Returns the part of speech of the first token the analyzer produces,
    /// or an empty string when it produces none.
    fn tag_word(&self, word: &str) -> Result<String> {
        if word.is_empty() {
            return Ok(String::new());
        }
        Ok(self
            .analyze(word)?
            .into_iter()
            .next()
            .map(|token| token.pos)
            .unwrap_or_default())
    }
}

impl<A: MorphAnalyzer + ?Sized> MorphAnalyzer for &A {
    fn analyze(&self, text: &str) -> Result<Vec<TaggedToken>> {
        (**self).analyze(text)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn tag_word(&self, word: &str) -> Result<String> {
        (**self).tag_word(word)
    }
}

impl<A: MorphAnalyzer + ?Sized> MorphAnalyzer for Box<A> {
    fn analyze(&self, text: &str) -> Result<Vec<TaggedToken>> {
        (**self).analyze(text)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn tag_word(&self, word: &str) -> Result<String> {
        (**self).tag_word(word)
    }
}

// ============================================================================
// ChaSen-format adapter
// ============================================================================

/// Something that produces ChaSen-format analysis output for a text.
///
/// Each output line is `surface\treading\tlemma\tPOS-SUB1-SUB2[\t...]`, and
/// every analyzed input line ends with an `EOS` line.
pub trait Tagger {
    fn parse(&self, text: &str) -> Result<String>;
}

/// Parse ChaSen-format output into tagged tokens.
///
/// Lines with fewer than four tab-separated fields are skipped, as are empty
/// lines and `EOS` markers. The part of speech is the top-level category of
/// the fourth field (`名詞-一般` becomes `名詞`).
pub fn parse_chasen(output: &str) -> Vec<TaggedToken> {
    output
        .lines()
        .filter(|line| !line.is_empty() && *line != "EOS")
        .filter_map(|line| {
            let mut fields = line.split('\t');
            let surface = fields.next()?;
            let pos_field = fields.nth(2)?;
            let pos = pos_field.split('-').next().unwrap_or_default();
            Some(TaggedToken::new(surface, pos))
        })
        .collect()
}

/// Analyzer adapter over any ChaSen-format [`Tagger`].
#[derive(Debug, Clone)]
pub struct ChasenAnalyzer<T> {
    tagger: T,
}

impl<T: Tagger> ChasenAnalyzer<T> {
    pub fn new(tagger: T) -> Self {
        Self { tagger }
    }

    pub fn tagger(&self) -> &T {
        &self.tagger
    }
}

impl<T: Tagger> MorphAnalyzer for ChasenAnalyzer<T> {
    fn analyze(&self, text: &str) -> Result<Vec<TaggedToken>> {
        let output = self.tagger.parse(text)?;
        Ok(parse_chasen(&output))
    }

    fn name(&self) -> &'static str {
        "chasen"
    }
}

/// Runs an external tagger process (by default `mecab -Ochasen`) per call.
///
/// Text goes to the process on stdin; ChaSen-format output is read back from
/// stdout.
#[derive(Debug, Clone)]
pub struct CommandTagger {
    program: String,
    args: Vec<String>,
}

impl CommandTagger {
    /// Connect to `mecab -Ochasen` on the `PATH`.
    pub fn mecab() -> Result<Self> {
        Self::connect("mecab", ["-Ochasen"])
    }

    /// Connect to an arbitrary tagger command.
    ///
    /// The command is run once on an empty line to make sure it exists and
    /// works; failure is reported as [`KyokiError::AnalyzerUnavailable`].
    pub fn connect<I, S>(program: impl Into<String>, args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tagger = Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        };
        match tagger.run("\n") {
            Ok(_) => Ok(tagger),
            Err(err @ KyokiError::AnalyzerUnavailable { .. }) => Err(err),
            Err(err) => Err(KyokiError::analyzer_unavailable(
                tagger.program.clone(),
                err.to_string(),
            )),
        }
    }

    /// The program being run.
    pub fn program(&self) -> &str {
        &self.program
    }

    fn run(&self, text: &str) -> Result<String> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| KyokiError::analyzer_unavailable(&self.program, e.to_string()))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| KyokiError::analysis("tagger stdin was not captured"))?;
        let mut input = text.to_owned();
        if !input.ends_with('\n') {
            input.push('\n');
        }
        // Feed stdin from another thread so a full stdout pipe cannot deadlock us.
        let writer = std::thread::spawn(move || stdin.write_all(input.as_bytes()));

        let output = child.wait_with_output()?;
        writer
            .join()
            .map_err(|_| KyokiError::analysis("tagger input writer panicked"))??;

        if !output.status.success() {
            return Err(KyokiError::analysis(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        String::from_utf8(output.stdout)
            .map_err(|e| KyokiError::analysis(format!("tagger output is not UTF-8: {e}")))
    }
}

impl Tagger for CommandTagger {
    fn parse(&self, text: &str) -> Result<String> {
        self.run(text)
    }
}

// ============================================================================
// Unicode word adapter
// ============================================================================

/// Coarse tag for alphabetic words.
pub const POS_WORD: &str = "word";
/// Coarse tag for numerals.
pub const POS_NUMERAL: &str = "numeral";
/// Coarse tag for punctuation and symbols.
pub const POS_SYMBOL: &str = "symbol";

/// Analyzer splitting on Unicode word boundaries (UAX #29).
///
/// Whitespace segments are dropped; every other segment becomes a token
/// tagged [`POS_NUMERAL`], [`POS_SYMBOL`] or [`POS_WORD`].
#[derive(Debug, Clone, Copy, Default)]
pub struct UnicodeWordAnalyzer {
    lowercase: bool,
}

impl UnicodeWordAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lowercase every surface form.
    pub fn with_lowercase(mut self, lowercase: bool) -> Self {
        self.lowercase = lowercase;
        self
    }

    fn classify(segment: &str) -> &'static str {
        if segment.chars().all(char::is_numeric) {
            POS_NUMERAL
        } else if segment.chars().any(char::is_alphanumeric) {
            POS_WORD
        } else {
            POS_SYMBOL
        }
    }
}

impl MorphAnalyzer for UnicodeWordAnalyzer {
    fn analyze(&self, text: &str) -> Result<Vec<TaggedToken>> {
        Ok(text
            .split_word_bounds()
            .filter(|segment| !segment.trim().is_empty())
            .map(|segment| {
                let surface = if self.lowercase {
                    segment.to_lowercase()
                } else {
                    segment.to_string()
                };
                TaggedToken::new(surface, Self::classify(segment))
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        "unicode_word"
    }
}
