//! Per-node checks run by the validator walk

use super::Walker;
use crate::keywords::{canonical_composition_keyword, is_composition_keyword, is_structural_keyword};
use crate::pointer;
use crate::resolver::{resolve_type, ResolvedType};
use crate::types::{Diagnostic, IssueKind};
use serde_json::{Map, Value};

impl Walker<'_> {
    pub(super) fn check_root(&mut self, node: &Map<String, Value>) {
        let rules = self.index.rules();

        if let ResolvedType::Known(t) = resolve_type(node) {
            if !rules.root_type.allows(t) {
                self.push(Diagnostic::error(
                    "/type",
                    "",
                    IssueKind::RootTypeWrong,
                    format!("Root type must be {}, got \"{}\"", rules.root_type.describe(), t),
                ));
            }
        }

        // When anyOf is unsupported everywhere the keyword check reports it
        if !rules.root_any_of_allowed
            && node.contains_key("anyOf")
            && self.index.supports_composition("anyOf")
        {
            self.push(Diagnostic::error(
                "/anyOf",
                "",
                IssueKind::RootAnyofNotAllowed,
                "Root-level anyOf is not allowed for this provider",
            ));
        }
    }

    pub(super) fn check_multi_type(&mut self, node: &Map<String, Value>, at: &str) {
        if resolve_type(node) == ResolvedType::MultiUnion {
            self.push(Diagnostic::error(
                pointer::child(at, "type"),
                at,
                IssueKind::MultiTypeUnion,
                "Multi-type unions are not supported. Use anyOf for union types",
            ));
        }
    }

    pub(super) fn check_type_support(&mut self, node: &Map<String, Value>, at: &str) {
        if let ResolvedType::Known(t) = resolve_type(node) {
            if !self.index.supports_type(t) {
                self.push(Diagnostic::error(
                    pointer::child(at, "type"),
                    at,
                    IssueKind::UnsupportedType,
                    format!("Type \"{}\" is not supported by this provider", t),
                ));
            }
        }
    }

    /// One pass over the node's keys
    pub(super) fn check_keywords(&mut self, node: &Map<String, Value>, at: &str, is_root: bool) {
        let node_type = resolve_type(node).known();
        let any_of_supported = self.index.supports_composition("anyOf");

        for key in node.keys() {
            if is_structural_keyword(key) {
                continue;
            }

            if is_composition_keyword(key) {
                if is_root && key == "anyOf" && any_of_supported {
                    continue;
                }
                if !self.index.supports_composition(canonical_composition_keyword(key)) {
                    self.push(Diagnostic::error(
                        pointer::child(at, key),
                        at,
                        IssueKind::UnsupportedComposition,
                        format!("\"{}\" is not supported by this provider", key),
                    ));
                }
                continue;
            }

            let Some(t) = node_type else { continue };
            let unsupported = match self.index.type_keywords(t) {
                Some(supported) => !supported.contains(key.as_str()),
                None => continue,
            };
            if unsupported {
                self.push(Diagnostic::error(
                    pointer::child(at, key),
                    at,
                    IssueKind::UnsupportedKeyword,
                    format!("\"{}\" is not supported for type \"{}\" by this provider", key, t),
                ));
            }
        }
    }

    pub(super) fn check_object_policy(&mut self, node: &Map<String, Value>, at: &str) {
        let has_properties = node.contains_key("properties");
        if !resolve_type(node).is("object") && !has_properties {
            return;
        }

        let rules = self.index.rules();
        let additional = node.get("additionalProperties");
        let closed = additional == Some(&Value::Bool(false));

        if rules.additional_properties_must_be_false && !closed {
            match additional {
                None => self.push(Diagnostic::error(
                    pointer::child(at, "properties"),
                    at,
                    IssueKind::MissingAdditionalPropertiesFalse,
                    "Missing \"additionalProperties\": false (required by this provider)",
                )),
                Some(_) => self.push(Diagnostic::error(
                    pointer::child(at, "additionalProperties"),
                    at,
                    IssueKind::AdditionalPropertiesNotFalse,
                    "\"additionalProperties\" must be false for this provider",
                )),
            }
        } else if !rules.additional_properties_must_be_false
            && rules.additional_properties_false_recommended
            && !closed
            && has_properties
        {
            self.push(Diagnostic::warning(
                pointer::child(at, "properties"),
                at,
                IssueKind::MissingAdditionalPropertiesFalse,
                "\"additionalProperties\": false is recommended by this provider for reliable results",
            ));
        }

        if rules.all_fields_required {
            if let Some(Value::Object(props)) = node.get("properties") {
                let missing = missing_required(node, props);
                if !missing.is_empty() {
                    let properties_pointer = pointer::child(at, "properties");
                    self.push(Diagnostic::error(
                        pointer::child(at, "required"),
                        properties_pointer,
                        IssueKind::MissingRequiredProperties,
                        format!(
                            "All properties must be in \"required\" for this provider. Missing: {}",
                            missing.join(", ")
                        ),
                    ));
                }
            }
        }
    }

    pub(super) fn check_string_format(&mut self, node: &Map<String, Value>, at: &str) {
        if !resolve_type(node).is("string") {
            return;
        }
        let Some(Value::String(format)) = node.get("format") else {
            return;
        };

        // An empty list means `format` itself is unsupported, which the
        // keyword check already reported
        let formats = self.index.string_formats();
        if formats.is_empty() || self.index.format_supported(format) {
            return;
        }

        self.push(Diagnostic::error(
            pointer::child(at, "format"),
            at,
            IssueKind::UnsupportedStringFormat,
            format!(
                "String format \"{}\" is not supported. Supported: {}",
                format,
                formats.join(", ")
            ),
        ));
    }
}

/// Property names not listed in the node's `required` array, in declaration order
pub(crate) fn missing_required<'p>(node: &Map<String, Value>, props: &'p Map<String, Value>) -> Vec<&'p str> {
    let required: Vec<&str> = match node.get("required") {
        Some(Value::Array(names)) => names.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    };
    props
        .keys()
        .map(String::as_str)
        .filter(|k| !required.contains(k))
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::rule_set::{RootType, RuleSet};
    use crate::types::IssueKind;
    use crate::validator::diagnose;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn rules() -> RuleSet {
        RuleSet::new("checks", "test")
            .with_type("object", ["properties", "required", "additionalProperties"])
            .with_type("string", ["format"])
            .with_type("number", ["minimum"])
            .with_composition(["anyOf", "$defs"])
            .with_string_formats(["date-time"])
            .with_additional_properties_false(true)
    }

    fn kinds_at(schema: serde_json::Value, rules: &RuleSet) -> Vec<(String, IssueKind)> {
        diagnose(&schema, rules)
            .into_iter()
            .map(|d| (d.pointer, d.kind))
            .collect()
    }

    #[test]
    fn test_root_any_of_reported_once() {
        let found = kinds_at(json!({"anyOf": [{"type": "string"}]}), &rules());
        assert_eq!(found, vec![("/anyOf".to_string(), IssueKind::RootAnyofNotAllowed)]);
    }

    #[test]
    fn test_root_any_of_allowed_when_rules_say_so() {
        let rules = rules()
            .with_root_any_of_allowed(true)
            .with_root_type(RootType::Many(vec!["object".into(), "string".into()]));
        assert!(kinds_at(json!({"anyOf": [{"type": "string"}]}), &rules).is_empty());
    }

    #[test]
    fn test_any_of_unsupported_everywhere_reported_as_composition() {
        let rules = rules().with_composition(["$defs"]);
        let found = kinds_at(json!({"anyOf": [{"type": "string"}]}), &rules);
        assert_eq!(found, vec![("/anyOf".to_string(), IssueKind::UnsupportedComposition)]);
    }

    #[test]
    fn test_definitions_is_accepted_as_defs() {
        let schema = json!({
            "type": "object",
            "properties": {},
            "additionalProperties": false,
            "definitions": {"Name": {"type": "string", "format": "email"}}
        });
        let found = kinds_at(schema, &rules());
        assert_eq!(
            found,
            vec![("/definitions/Name/format".to_string(), IssueKind::UnsupportedStringFormat)]
        );
    }

    #[test]
    fn test_unsupported_type_skips_keyword_checks() {
        let schema = json!({
            "type": "object",
            "properties": {"flag": {"type": "boolean", "default": true}},
            "additionalProperties": false
        });
        let found = kinds_at(schema, &rules());
        assert_eq!(found, vec![("/properties/flag/type".to_string(), IssueKind::UnsupportedType)]);
    }

    #[test]
    fn test_multi_type_union_and_unknown_type_keywords() {
        let schema = json!({
            "type": "object",
            "properties": {"v": {"type": ["string", "number"], "minimum": 1}},
            "additionalProperties": false
        });
        let found = kinds_at(schema, &rules());
        // Keywords of an unresolved node are not checked per type
        assert_eq!(found, vec![("/properties/v/type".to_string(), IssueKind::MultiTypeUnion)]);
    }

    #[test]
    fn test_keyword_pointer_is_escaped() {
        let schema = json!({"type": "string", "x/y": 1});
        let rules = rules().with_root_type(RootType::Single("string".into()));
        let found = kinds_at(schema, &rules);
        assert_eq!(found, vec![("/x~1y".to_string(), IssueKind::UnsupportedKeyword)]);
    }

    #[test]
    fn test_schema_valued_additional_properties() {
        let schema = json!({
            "type": "object",
            "properties": {},
            "additionalProperties": {"type": "string", "format": "uri"}
        });
        let found = kinds_at(schema, &rules());
        assert_eq!(
            found,
            vec![
                ("/additionalProperties".to_string(), IssueKind::AdditionalPropertiesNotFalse),
                ("/additionalProperties/format".to_string(), IssueKind::UnsupportedStringFormat),
            ]
        );
    }
}
