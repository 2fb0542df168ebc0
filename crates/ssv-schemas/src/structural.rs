//! Structural pre-check
//!
//! Before provider rules are applied, a document must be some valid JSON
//! Schema: a JSON object accepted by the draft 2020-12 meta-schema. This is
//! independent of any provider and says nothing about structured-output
//! compatibility.
//!
//! Copyright (c) 2025 SSV Team
//! Licensed under the Apache-2.0 license

use serde::Serialize;
use serde_json::Value;
use tracing::trace;

/// Outcome of the structural pre-check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructuralCheck {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl StructuralCheck {
    fn passed() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }

    fn failed(error: impl Into<String>) -> Self {
        Self {
            valid: false,
            errors: vec![error.into()],
        }
    }
}

/// Check a parsed document against the JSON Schema meta-schema
pub fn check_structure(schema: &Value) -> StructuralCheck {
    if !schema.is_object() {
        return StructuralCheck::failed("Schema must be a JSON object at the root level");
    }

    match jsonschema::draft202012::meta::validate(schema) {
        Ok(()) => StructuralCheck::passed(),
        Err(error) => {
            trace!(%error, "Meta-schema validation failed");
            StructuralCheck::failed(error.to_string())
        }
    }
}

/// Parse and check raw document text
pub fn check_structure_str(raw: &str) -> StructuralCheck {
    match serde_json::from_str::<Value>(raw) {
        Ok(schema) => check_structure(&schema),
        Err(e) => StructuralCheck::failed(format!("Invalid JSON: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_valid_schema_passes() {
        let schema = json!({
            "type": "object",
            "properties": {"a": {"type": "string", "minLength": 1}},
            "required": ["a"]
        });
        assert_eq!(check_structure(&schema), StructuralCheck::passed());
    }

    #[test]
    fn test_non_object_root_fails() {
        let result = check_structure(&json!([1, 2]));
        assert!(!result.valid);
        assert_eq!(result.errors, vec!["Schema must be a JSON object at the root level"]);
    }

    #[test]
    fn test_meta_schema_violation_fails() {
        let result = check_structure(&json!({"type": "object", "minProperties": -1}));
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);

        let result = check_structure(&json!({"type": 12}));
        assert!(!result.valid);
    }

    #[test]
    fn test_unparseable_text_fails() {
        let result = check_structure_str("{\"type\": ");
        assert!(!result.valid);
        assert!(result.errors[0].starts_with("Invalid JSON: "));
    }
}
