//! Core data types shared by the validator and the fixer
//!
//! Copyright (c) 2025 SSV Team
//! Licensed under the Apache-2.0 license

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity levels for positioned diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational, no action required
    Info,
    /// Warning, never blocks compatibility but is always shown
    Warning,
    /// Error, the schema is not compatible with the provider
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Classification of a capability defect
///
/// The same vocabulary is used for validator diagnostics, applied fixes and
/// unresolved errors so that callers can correlate the three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    RootTypeWrong,
    RootAnyofNotAllowed,
    MultiTypeUnion,
    UnsupportedType,
    UnsupportedKeyword,
    UnsupportedComposition,
    MissingAdditionalPropertiesFalse,
    AdditionalPropertiesNotFalse,
    MissingRequiredProperties,
    UnsupportedStringFormat,
    QuantitativeLimitExceeded,
}

impl IssueKind {
    /// Wire name of this kind (snake_case)
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueKind::RootTypeWrong => "root_type_wrong",
            IssueKind::RootAnyofNotAllowed => "root_anyof_not_allowed",
            IssueKind::MultiTypeUnion => "multi_type_union",
            IssueKind::UnsupportedType => "unsupported_type",
            IssueKind::UnsupportedKeyword => "unsupported_keyword",
            IssueKind::UnsupportedComposition => "unsupported_composition",
            IssueKind::MissingAdditionalPropertiesFalse => "missing_additional_properties_false",
            IssueKind::AdditionalPropertiesNotFalse => "additional_properties_not_false",
            IssueKind::MissingRequiredProperties => "missing_required_properties",
            IssueKind::UnsupportedStringFormat => "unsupported_string_format",
            IssueKind::QuantitativeLimitExceeded => "quantitative_limit_exceeded",
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A capability defect found by the validator, anchored to a JSON Pointer
///
/// Diagnostics carry no source positions; [`Marker`]s are derived from them by
/// looking the pointer up in a [`SourceMap`](crate::source_map::SourceMap).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    /// Pointer of the key or value the message is about
    pub pointer: String,
    /// Pointer to anchor at when `pointer` has no source entry
    pub fallback_pointer: String,
    pub kind: IssueKind,
    pub message: String,
    pub severity: Severity,
}

impl Diagnostic {
    pub fn error(
        pointer: impl Into<String>,
        fallback_pointer: impl Into<String>,
        kind: IssueKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            pointer: pointer.into(),
            fallback_pointer: fallback_pointer.into(),
            kind,
            message: message.into(),
            severity: Severity::Error,
        }
    }

    pub fn warning(
        pointer: impl Into<String>,
        fallback_pointer: impl Into<String>,
        kind: IssueKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(pointer, fallback_pointer, kind, message)
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// A positioned validation message, 1-indexed, ready for an editor gutter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    pub start_line: usize,
    pub start_column: usize,
    pub end_line: usize,
    pub end_column: usize,
    pub message: String,
    pub severity: Severity,
    /// Pointer the diagnostic was raised at (before any fallback)
    pub pointer: String,
    pub kind: IssueKind,
}

impl Marker {
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_kind_wire_names_match_serde() {
        let kinds = [
            IssueKind::RootTypeWrong,
            IssueKind::RootAnyofNotAllowed,
            IssueKind::MultiTypeUnion,
            IssueKind::UnsupportedType,
            IssueKind::UnsupportedKeyword,
            IssueKind::UnsupportedComposition,
            IssueKind::MissingAdditionalPropertiesFalse,
            IssueKind::AdditionalPropertiesNotFalse,
            IssueKind::MissingRequiredProperties,
            IssueKind::UnsupportedStringFormat,
            IssueKind::QuantitativeLimitExceeded,
        ];
        for kind in kinds {
            let wire = serde_json::to_value(kind).unwrap();
            assert_eq!(wire, serde_json::Value::String(kind.as_str().to_string()));
        }
    }

    #[test]
    fn test_warning_constructor_keeps_fields() {
        let d = Diagnostic::warning("/properties", "", IssueKind::MissingAdditionalPropertiesFalse, "m");
        assert_eq!(d.severity, Severity::Warning);
        assert_eq!(d.pointer, "/properties");
        assert!(!d.is_error());
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Error > Severity::Warning);
        assert!(Severity::Warning > Severity::Info);
    }
}
