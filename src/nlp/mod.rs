//! Natural Language Processing components
//!
//! This module provides the analyzer boundary, line-aware tokenization,
//! merge rules, part-of-speech re-tagging, and stopword filtering.

pub mod analyzer;
pub mod merge;
pub mod pos_cache;
pub mod stopwords;
pub mod tokenizer;
