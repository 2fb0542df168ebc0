//! Object policy repair: `additionalProperties` and `required`

use super::{AppliedFix, FixKind, Fixer};
use crate::validator::missing_required;
use serde_json::{Map, Value};

impl Fixer<'_> {
    pub(super) fn fix_additional_properties(&mut self, node: &mut Map<String, Value>, at: &str) {
        let previous = node.get("additionalProperties");
        if previous == Some(&Value::Bool(false)) {
            return;
        }
        let rules = self.index.rules();

        if rules.additional_properties_must_be_false {
            let fix = match previous {
                Some(Value::Object(_)) => AppliedFix::new(
                    at,
                    FixKind::AdditionalPropertiesNotFalse,
                    "Set \"additionalProperties\" to false (was a schema)",
                )
                .with_info_lost("Dynamic additional properties of specified type are no longer allowed"),
                Some(_) => AppliedFix::new(
                    at,
                    FixKind::AdditionalPropertiesNotFalse,
                    "Set \"additionalProperties\" to false",
                ),
                None => AppliedFix::new(
                    at,
                    FixKind::MissingAdditionalPropertiesFalse,
                    "Added \"additionalProperties\": false",
                ),
            };
            node.insert("additionalProperties".to_string(), Value::Bool(false));
            self.applied(fix);
        } else if rules.additional_properties_false_recommended && node.contains_key("properties") {
            let fix = match previous {
                Some(Value::Object(_)) => AppliedFix::new(
                    at,
                    FixKind::AdditionalPropertiesNotFalse,
                    "Set recommended \"additionalProperties\" to false (was a schema)",
                )
                .with_info_lost("Dynamic additional properties of specified type are no longer allowed"),
                _ => AppliedFix::new(
                    at,
                    FixKind::MissingAdditionalPropertiesFalse,
                    "Added recommended \"additionalProperties\": false",
                ),
            };
            node.insert("additionalProperties".to_string(), Value::Bool(false));
            self.applied(fix);
        }
    }

    /// List every property in `required`, making the newly required ones nullable
    pub(super) fn fix_required(&mut self, node: &mut Map<String, Value>, at: &str) {
        if !self.index.rules().all_fields_required {
            return;
        }
        let Some(Value::Object(props)) = node.get("properties") else {
            return;
        };

        let missing: Vec<String> = missing_required(node, props)
            .into_iter()
            .map(str::to_owned)
            .collect();
        if missing.is_empty() {
            return;
        }
        let all: Vec<Value> = props.keys().map(|k| Value::String(k.clone())).collect();

        node.insert("required".to_string(), Value::Array(all));
        if let Some(Value::Object(props)) = node.get_mut("properties") {
            for key in &missing {
                if let Some(Value::Object(prop)) = props.get_mut(key) {
                    make_nullable(prop);
                }
            }
        }

        self.applied(
            AppliedFix::new(
                at,
                FixKind::MissingRequiredProperties,
                format!("Added {} to \"required\" and made them nullable", missing.join(", ")),
            )
            .with_info_lost("Fields are now required but nullable; the model may output null for optional fields"),
        );
    }
}

/// Allow `null` for a property schema
///
/// A scalar `type` becomes `[type, "null"]`, a type list gains `"null"`, and
/// an untyped `anyOf` gains a `{"type": "null"}` branch.
pub(crate) fn make_nullable(node: &mut Map<String, Value>) {
    let null = Value::String("null".to_string());
    match node.get_mut("type") {
        Some(Value::String(t)) if t.as_str() != "null" => {
            let t = std::mem::take(t);
            node.insert(
                "type".to_string(),
                Value::Array(vec![Value::String(t), null]),
            );
        }
        Some(Value::Array(types)) if !types.contains(&null) => types.push(null),
        Some(_) => {}
        None => {
            if let Some(Value::Array(branches)) = node.get_mut("anyOf") {
                let has_null = branches
                    .iter()
                    .any(|b| b.get("type").and_then(Value::as_str) == Some("null"));
                if !has_null {
                    let mut branch = Map::new();
                    branch.insert("type".to_string(), null);
                    branches.push(Value::Object(branch));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::make_nullable;
    use crate::fixer::{fix, FixKind};
    use crate::rule_set::RuleSet;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    fn rules() -> RuleSet {
        RuleSet::new("object", "test")
            .with_type("object", ["properties", "required", "additionalProperties"])
            .with_type("string", Vec::<String>::new())
            .with_type("number", Vec::<String>::new())
            .with_type("null", Vec::<String>::new())
            .with_composition(["anyOf"])
            .with_additional_properties_false(true)
            .with_all_fields_required(true)
    }

    fn nullable(v: Value) -> Value {
        let mut node = v.as_object().cloned().unwrap();
        make_nullable(&mut node);
        Value::Object(node)
    }

    #[test]
    fn test_make_nullable_variants() {
        assert_eq!(nullable(json!({"type": "string"})), json!({"type": ["string", "null"]}));
        assert_eq!(nullable(json!({"type": ["string"]})), json!({"type": ["string", "null"]}));
        assert_eq!(nullable(json!({"type": ["string", "null"]})), json!({"type": ["string", "null"]}));
        assert_eq!(nullable(json!({"type": "null"})), json!({"type": "null"}));
        assert_eq!(
            nullable(json!({"anyOf": [{"type": "string"}]})),
            json!({"anyOf": [{"type": "string"}, {"type": "null"}]})
        );
        assert_eq!(nullable(json!({"$ref": "#/$defs/A"})), json!({"$ref": "#/$defs/A"}));
    }

    #[test]
    fn test_required_completion_and_nullability() {
        let schema = json!({
            "type": "object",
            "properties": {"a": {"type": "string"}, "b": {"type": "number"}},
            "required": ["a"]
        });
        let result = fix(&schema, &rules());
        assert_eq!(
            result.fixed_schema,
            json!({
                "type": "object",
                "properties": {"a": {"type": "string"}, "b": {"type": ["number", "null"]}},
                "required": ["a", "b"],
                "additionalProperties": false
            })
        );
        let kinds: Vec<_> = result.applied_fixes.iter().map(|f| f.kind).collect();
        assert_eq!(
            kinds,
            vec![FixKind::MissingAdditionalPropertiesFalse, FixKind::MissingRequiredProperties]
        );
        assert_eq!(
            result.applied_fixes[1].description,
            "Added b to \"required\" and made them nullable"
        );
    }

    #[test]
    fn test_schema_valued_additional_properties_is_disclosed() {
        let schema = json!({
            "type": "object",
            "properties": {},
            "additionalProperties": {"type": "string"}
        });
        let result = fix(&schema, &rules());
        assert_eq!(result.fixed_schema["additionalProperties"], json!(false));
        assert_eq!(result.applied_fixes.len(), 1);
        assert_eq!(result.applied_fixes[0].kind, FixKind::AdditionalPropertiesNotFalse);
        assert!(result.applied_fixes[0].is_lossy());
    }

    #[test]
    fn test_true_additional_properties_is_replaced() {
        let schema = json!({"type": "object", "properties": {}, "additionalProperties": true});
        let result = fix(&schema, &rules());
        assert_eq!(result.applied_fixes[0].description, "Set \"additionalProperties\" to false");
        assert!(!result.applied_fixes[0].is_lossy());
    }
}
