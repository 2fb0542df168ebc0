//! Error types for the SSV core library
//!
//! Capability violations found while validating or fixing a schema are never
//! errors: they come back as data (`Marker`, `Diagnostic`, `AppliedFix`,
//! `UnresolvedError`). The variants below cover caller mistakes such as asking
//! for a rule set that does not exist, or handing the engine text that is not
//! a JSON object where one is required.
//!
//! Copyright (c) 2025 SSV Team
//! Licensed under the Apache-2.0 license

use thiserror::Error;

/// Main error type for SSV core operations
#[derive(Error, Debug)]
pub enum Error {
    /// A rule set id or provider id that the store does not know about
    #[error("Unknown rule set: {id}")]
    UnknownRuleSet { id: String },

    /// JSON parsing and serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// Input was valid JSON but not shaped like a schema document
    #[error("Invalid schema document: {message}")]
    InvalidSchema { message: String },

    /// Rule set data that cannot be used as configuration
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an unknown rule set error
    pub fn unknown_rule_set(id: impl Into<String>) -> Self {
        Self::UnknownRuleSet { id: id.into() }
    }

    /// Create a configuration error without an underlying source
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(source: serde_json::Error) -> Self {
        Self::Json {
            message: source.to_string(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_rule_set_display() {
        let err = Error::unknown_rule_set("gpt-9");
        assert_eq!(err.to_string(), "Unknown rule set: gpt-9");
    }

    #[test]
    fn test_json_error_conversion() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: Error = parse_err.into();
        assert!(err.to_string().starts_with("JSON error:"));
    }
}
