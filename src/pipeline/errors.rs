//! Structured diagnostics for analysis spec validation.

use std::fmt;

use serde::Serialize;

use super::error_code::ErrorCode;

/// A single problem found in an [`AnalysisSpec`](super::spec::AnalysisSpec).
///
/// Carries a stable [`ErrorCode`], a JSON pointer to the offending field, a
/// human-readable message, and an optional hint on how to fix it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineSpecError {
    pub code: ErrorCode,
    pub path: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl PipelineSpecError {
    pub fn new(code: ErrorCode, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            path: path.into(),
            message: message.into(),
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl fmt::Display for PipelineSpecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code, self.path, self.message)?;
        if let Some(hint) = &self.hint {
            write!(f, " (hint: {hint})")?;
        }
        Ok(())
    }
}

impl std::error::Error for PipelineSpecError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_hint() {
        let err = PipelineSpecError::new(ErrorCode::InvalidValue, "/window/size", "too small")
            .with_hint("Use a value between 2 and 20");
        let text = err.to_string();
        assert!(text.starts_with("[invalid_value] /window/size: too small"));
        assert!(text.contains("hint: Use a value between 2 and 20"));
    }

    #[test]
    fn test_serialize_skips_missing_hint() {
        let err = PipelineSpecError::new(ErrorCode::UnknownField, "/bogus", "unrecognized");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "unknown_field");
        assert!(json.get("hint").is_none());
    }
}
