//! Error types and handling for the CLI
//!
//! This module provides error types and utilities for handling
//! various failure modes in the CLI application.

use std::io;
use std::path::PathBuf;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for CLI operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error (file operations, etc.)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The schema is incompatible with at least one selected rule set
    #[error("Schema is incompatible with {rule_sets} rule set(s) ({errors} error(s))")]
    ValidationFailed { rule_sets: usize, errors: usize },

    /// The fixer could not make the schema compatible
    #[error("Fix incomplete: {unresolved} unresolved error(s), {residual} error(s) after fixing")]
    FixIncomplete { unresolved: usize, residual: usize },

    /// Verification results disagreed with document expectations
    #[error("{count} expectation mismatch(es) during verification")]
    ExpectationMismatch { count: usize },

    /// File not found
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// Invalid file format
    #[error("Invalid file format for {}: expected {}", path.display(), expected)]
    InvalidFormat { path: PathBuf, expected: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid argument combination
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    /// Rule-set store error
    #[error(transparent)]
    Registry(#[from] ssv_schemas::RegistryError),

    /// Error from ssv-core library
    #[error("Core error: {0}")]
    Core(#[from] ssv_core::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A background task panicked or was cancelled
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// Opaque failure with its context chain
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl Error {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an invalid arguments error
    pub fn invalid_args(message: impl Into<String>) -> Self {
        Self::InvalidArgs(message.into())
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Io(_) => 1,
            Self::ValidationFailed { .. } => 2,
            Self::FixIncomplete { .. } => 3,
            Self::ExpectationMismatch { .. } => 4,
            Self::FileNotFound { .. } => 5,
            Self::InvalidFormat { .. } => 6,
            Self::Config(_) => 7,
            Self::InvalidArgs(_) => 8,
            Self::Registry(e) if e.is_lookup_error() => 8,
            Self::Registry(_) => 9,
            Self::Core(_) => 10,
            Self::Json(_) => 12,
            Self::Yaml(_) => 13,
            Self::Task(_) => 14,
            Self::Internal(_) => 99,
        }
    }

    /// Check if this error should display usage help
    pub fn should_show_help(&self) -> bool {
        matches!(self, Self::InvalidArgs(_))
            || matches!(self, Self::Registry(e) if e.is_lookup_error())
    }

    /// Whether the error reports a schema outcome rather than a tool failure
    pub fn is_outcome(&self) -> bool {
        matches!(
            self,
            Self::ValidationFailed { .. }
                | Self::FixIncomplete { .. }
                | Self::ExpectationMismatch { .. }
        )
    }
}

/// Extension trait for adding context to errors
pub trait ErrorContext<T> {
    /// Add context with a closure (only evaluated on error)
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: Into<Error>,
{
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let inner = e.into();
            Error::Internal(anyhow::anyhow!("{}: {}", f(), inner))
        })
    }
}

/// Format an error for display to the user
pub fn format_error(error: &Error, use_color: bool) -> String {
    if use_color {
        use colored::Colorize;
        let label = if error.is_outcome() {
            "Failed:".yellow().bold()
        } else {
            "Error:".red().bold()
        };
        format!("{} {}", label, error)
    } else if error.is_outcome() {
        format!("Failed: {}", error)
    } else {
        format!("Error: {}", error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_distinguish_outcomes_from_failures() {
        let failed = Error::ValidationFailed { rule_sets: 1, errors: 3 };
        assert_eq!(failed.exit_code(), 2);
        assert!(failed.is_outcome());

        let missing = Error::FileNotFound {
            path: PathBuf::from("schema.json"),
        };
        assert_eq!(missing.exit_code(), 5);
        assert!(!missing.is_outcome());
    }

    #[test]
    fn test_unknown_rule_set_shows_help() {
        let err = Error::from(ssv_schemas::RegistryError::UnknownRuleSet {
            id: "mistral".to_string(),
            available: "gpt-4-o1".to_string(),
        });
        assert!(err.should_show_help());
        assert_eq!(err.exit_code(), 8);
    }

    #[test]
    fn test_format_error_plain() {
        let err = Error::config("bad value");
        assert_eq!(format_error(&err, false), "Error: Configuration error: bad value");

        let err = Error::ExpectationMismatch { count: 2 };
        assert_eq!(
            format_error(&err, false),
            "Failed: 2 expectation mismatch(es) during verification"
        );
    }

    #[test]
    fn test_with_context_wraps_message() {
        let result: std::result::Result<(), io::Error> =
            Err(io::Error::new(io::ErrorKind::NotFound, "gone"));
        let err = result.with_context(|| "Reading report".to_string()).unwrap_err();
        assert_eq!(err.to_string(), "Reading report: IO error: gone");
    }
}
