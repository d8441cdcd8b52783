//! Core error types.

use thiserror::Error;

/// Errors raised while validating or compiling a transition table.
///
/// Dispatch itself never fails: unmatched input, terminal states and
/// undeclared states are all no-ops.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid transition table: {reason}")]
    InvalidTable { reason: String },

    #[error("invalid pattern matcher '{matcher}': {source}")]
    InvalidPattern {
        matcher: String,
        #[source]
        source: regex::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl CoreError {
    pub(crate) fn invalid_table(reason: impl Into<String>) -> Self {
        CoreError::InvalidTable {
            reason: reason.into(),
        }
    }

    /// Returns true for errors caused by a malformed table shape.
    pub fn is_config_error(&self) -> bool {
        !matches!(self, CoreError::InvalidPattern { .. })
    }

    /// Returns a short error code suitable for tooling output.
    pub fn error_code(&self) -> &'static str {
        match self {
            CoreError::InvalidTable { .. } => "BAD_TABLE",
            CoreError::InvalidPattern { .. } => "BAD_PATTERN",
            CoreError::Json(_) => "BAD_TABLE",
            CoreError::Yaml(_) => "BAD_TABLE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = CoreError::invalid_table("empty");
        assert_eq!(err.error_code(), "BAD_TABLE");
        assert!(err.is_config_error());
        assert_eq!(err.to_string(), "invalid transition table: empty");

        let source = regex::Regex::new("(").unwrap_err();
        let err = CoreError::InvalidPattern {
            matcher: "/(/".to_string(),
            source,
        };
        assert_eq!(err.error_code(), "BAD_PATTERN");
        assert!(!err.is_config_error());
    }
}
