//! Error types for rule-set loading and lookup
//!
//! Copyright (c) 2025 SSV Team
//! Licensed under the Apache-2.0 license

use std::path::PathBuf;
use thiserror::Error;

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Errors raised while loading or querying a rule-set document
///
/// `origin` names where the document came from: a file path, or
/// `<bundled>` for the embedded default document.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// File I/O errors
    #[error("Failed to read rule-set file '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// JSON parsing errors
    #[error("Failed to parse rule-set JSON from '{origin}': {source}")]
    Json {
        origin: String,
        source: serde_json::Error,
    },

    /// YAML parsing errors
    #[error("Failed to parse rule-set YAML from '{origin}': {source}")]
    Yaml {
        origin: String,
        source: serde_yaml::Error,
    },

    /// Unsupported file extension
    #[error("Unsupported rule-set file format for '{path}'. Expected .yaml, .yml, or .json")]
    UnsupportedFormat { path: PathBuf },

    /// Two rule sets share an id
    #[error("Duplicate rule set id '{id}' in '{origin}'")]
    DuplicateRuleSet { id: String, origin: String },

    /// A rule set failed its consistency check
    #[error("Invalid rule set '{id}': {source}")]
    InvalidRuleSet {
        id: String,
        source: ssv_core::Error,
    },

    /// Lookup by an id or provider that is not in the store
    #[error("Unknown rule set or provider '{id}'. Available: {available}")]
    UnknownRuleSet { id: String, available: String },

    /// The document declares no rule sets
    #[error("Rule-set document '{origin}' contains no rule sets")]
    Empty { origin: String },
}

impl RegistryError {
    /// Create an I/O error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn unsupported_format(path: impl Into<PathBuf>) -> Self {
        Self::UnsupportedFormat { path: path.into() }
    }

    /// Whether this error came from caller input rather than document content
    pub fn is_lookup_error(&self) -> bool {
        matches!(self, Self::UnknownRuleSet { .. })
    }
}
