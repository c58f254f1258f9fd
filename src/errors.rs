//! Error types for the seams of the grading core.
//!
//! The numeric core (ranges, grading, aggregation, psychometrics) is total and
//! never fails: malformed input degrades to empty or zero results. Errors are
//! only produced where data enters or leaves the core: configuration loading,
//! raw answer table ingestion, and blueprint edits that must be rejected.

use thiserror::Error;

/// Main error type for graderight operations
#[derive(Debug, Error)]
pub enum Error {
    /// Input constraint violations
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Raw answer table does not satisfy the tabular contract
    #[error("Answer table error: {0}")]
    Table(String),

    /// Removing a selection would delete assignments and the caller did not confirm
    #[error("Removing '{id}' would unassign questions {questions:?}; confirmation required")]
    CascadeNotConfirmed { id: String, questions: Vec<u32> },

    /// Block edit referenced an id that is not in the blueprint
    #[error("Unknown question block: {0}")]
    UnknownBlock(String),

    /// Generic errors with context
    #[error("{context}: {message}")]
    WithContext { context: String, message: String },

    /// IO errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// TOML errors
    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    /// JSON errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create an answer table error
    pub fn table(message: impl Into<String>) -> Self {
        Self::Table(message.into())
    }

    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            message: self.to_string(),
        }
    }

    /// Whether the person entering the data can fix this error themselves.
    pub fn is_user_fixable(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::Configuration(_)
                | Self::Table(_)
                | Self::CascadeNotConfirmed { .. }
                | Self::Toml(_)
        )
    }
}

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_context_wraps_message() {
        let err = Error::table("missing column 'RUT'").with_context("reading roster");
        assert_eq!(
            err.to_string(),
            "reading roster: Answer table error: missing column 'RUT'"
        );
    }

    #[test]
    fn test_result_ext_context() {
        let result: Result<()> = Err(Error::validation("bad threshold"));
        let err = result.context("loading config").unwrap_err();
        assert!(matches!(err, Error::WithContext { .. }));
    }

    #[test]
    fn test_cascade_message_lists_questions() {
        let err = Error::CascadeNotConfirmed {
            id: "oa-6".into(),
            questions: vec![2, 5],
        };
        assert!(err.to_string().contains("[2, 5]"));
        assert!(err.is_user_fixable());
    }

    #[test]
    fn test_io_error_not_user_fixable() {
        let err: Error = std::io::Error::other("disk").into();
        assert!(!err.is_user_fixable());
    }
}
