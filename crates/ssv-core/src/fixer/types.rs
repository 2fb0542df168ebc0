//! Fixer result types
//!
//! Copyright (c) 2025 SSV Team
//! Licensed under the Apache-2.0 license

use crate::types::IssueKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fix and unresolved-error categories share the diagnostic vocabulary
pub type FixKind = IssueKind;

/// A mechanical rewrite the fixer performed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedFix {
    /// Pointer of the node that was rewritten, in the tree being fixed
    pub pointer: String,
    pub kind: FixKind,
    pub description: String,
    /// What the rewrite gave up; present on every lossy fix
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info_lost: Option<String>,
}

impl AppliedFix {
    pub fn new(pointer: impl Into<String>, kind: FixKind, description: impl Into<String>) -> Self {
        Self {
            pointer: pointer.into(),
            kind,
            description: description.into(),
            info_lost: None,
        }
    }

    pub fn with_info_lost(mut self, info_lost: impl Into<String>) -> Self {
        self.info_lost = Some(info_lost.into());
        self
    }

    pub fn is_lossy(&self) -> bool {
        self.info_lost.as_deref().is_some_and(|s| !s.is_empty())
    }
}

/// A defect the fixer recognized but could not fully repair
///
/// The node may still have been rewritten: stripped `not`/`if` keywords are
/// reported here because their meaning survives only as a description hint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnresolvedError {
    pub pointer: String,
    pub kind: FixKind,
    pub message: String,
    pub reason: String,
}

impl UnresolvedError {
    pub fn new(
        pointer: impl Into<String>,
        kind: FixKind,
        message: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            pointer: pointer.into(),
            kind,
            message: message.into(),
            reason: reason.into(),
        }
    }
}

/// Output of a fix run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixResult {
    pub fixed_schema: Value,
    pub applied_fixes: Vec<AppliedFix>,
    pub unresolved_errors: Vec<UnresolvedError>,
}

impl FixResult {
    /// Result for input the fixer does not handle: schema returned as-is
    pub fn unchanged(schema: Value) -> Self {
        Self {
            fixed_schema: schema,
            applied_fixes: Vec::new(),
            unresolved_errors: Vec::new(),
        }
    }

    /// True when every recognized defect was repaired
    pub fn is_fully_resolved(&self) -> bool {
        self.unresolved_errors.is_empty()
    }

    /// Fixes the user has to review before accepting the output
    pub fn lossy_fixes(&self) -> impl Iterator<Item = &AppliedFix> {
        self.applied_fixes.iter().filter(|f| f.is_lossy())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_applied_fix_serialization_omits_missing_info_lost() {
        let fix = AppliedFix::new("", FixKind::MissingAdditionalPropertiesFalse, "Added");
        let wire = serde_json::to_value(&fix).unwrap();
        assert_eq!(
            wire,
            json!({"pointer": "", "kind": "missing_additional_properties_false", "description": "Added"})
        );
        assert!(!fix.is_lossy());
        assert!(fix.with_info_lost("x").is_lossy());
    }

    #[test]
    fn test_unchanged_result_is_resolved() {
        let result = FixResult::unchanged(json!([1]));
        assert!(result.is_fully_resolved());
        assert_eq!(result.lossy_fixes().count(), 0);
    }
}
