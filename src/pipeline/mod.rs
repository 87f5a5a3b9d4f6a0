//! Staged analysis pipeline
//!
//! - [`spec`] / [`validation`]: the JSON settings document and its checks
//! - [`traits`]: stage traits ([`traits::Preprocessor`])
//! - [`runner`]: [`runner::AnalysisPipeline`], which runs the stages
//! - [`observer`]: stage timing and artifact hooks
//! - [`artifacts`]: what a run produces

pub mod artifacts;
pub mod error_code;
pub mod errors;
pub mod observer;
pub mod runner;
pub mod spec;
pub mod traits;
pub mod validation;
