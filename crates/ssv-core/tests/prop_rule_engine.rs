//! Property-based tests for the validator and fixer
//!
//! These tests check invariants that must hold for any schema: the fixer
//! never mutates its input, both components are deterministic,
//! re-validating fixed output does not report the defects the fixer claims
//! to have repaired, and whatever it still reports was listed as unresolved.


use proptest::prelude::*;
use serde_json::{json, Map, Value};
use ssv_core::{diagnose, fix, validate, Diagnostic, FixKind, IssueKind};
use test_support::{lenient_rules, strict_rules};

// Strategy functions for property testing

/// Strategy for scalar property schemas, some with unsupported keywords
fn leaf_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(json!({"type": "string"})),
        "[a-z]{1,5}".prop_map(|p| json!({"type": "string", "pattern": p})),
        prop::sample::select(vec!["date-time", "email", "uri", "hostname"])
            .prop_map(|f| json!({"type": "string", "format": f})),
        (0i64..100).prop_map(|n| json!({"type": "integer", "minimum": n})),
        (0i64..100).prop_map(|n| json!({"type": "number", "maximum": n, "multipleOf": 2})),
        Just(json!({"type": ["boolean", "null"], "default": true})),
        prop::collection::vec("[a-z]{1,4}", 1..4).prop_map(|values| json!({"type": "string", "enum": values})),
    ]
}

/// Strategy for an `additionalProperties` setting
fn additional_strategy() -> impl Strategy<Value = Option<Value>> {
    prop_oneof![
        Just(None),
        Just(Some(json!(false))),
        Just(Some(json!(true))),
        Just(Some(json!({"type": "string"}))),
    ]
}

/// Strategy for an object node over generated property schemas
fn object_strategy(inner: BoxedStrategy<Value>) -> impl Strategy<Value = Value> {
    (
        prop::collection::btree_map("[a-z]{1,6}", inner, 0..4),
        any::<bool>(),
        additional_strategy(),
    )
        .prop_map(|(props, require_all, additional)| {
            let required: Vec<Value> = props
                .keys()
                .take(if require_all { props.len() } else { 1 })
                .map(|k| Value::String(k.clone()))
                .collect();
            let mut node = Map::new();
            node.insert("type".into(), json!("object"));
            node.insert("properties".into(), Value::Object(props.into_iter().collect()));
            node.insert("required".into(), Value::Array(required));
            if let Some(additional) = additional {
                node.insert("additionalProperties".into(), additional);
            }
            Value::Object(node)
        })
}

fn array_strategy(inner: BoxedStrategy<Value>) -> impl Strategy<Value = Value> {
    inner.prop_map(|items| json!({"type": "array", "items": items, "uniqueItems": true}))
}

/// Strategy for nested schemas built from objects and arrays
fn schema_strategy() -> impl Strategy<Value = Value> {
    leaf_strategy().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![object_strategy(inner.clone()), array_strategy(inner)]
    })
}

/// Scalar schemas the fixer can only repair through composition rewrites
fn composition_leaf_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        prop::sample::select(vec![
            json!(["string", "integer"]),
            json!(["string", "number", "null"]),
            json!(["boolean", "integer"]),
        ])
        .prop_map(|types| json!({"type": types, "minimum": 1, "description": "union"})),
        Just(json!({"type": "string", "not": {"enum": ["x"]}})),
        (0i64..10).prop_map(|n| json!({"type": "integer", "if": {"minimum": n}, "then": {"maximum": n + 10}})),
        Just(json!({"type": "string", "dependentRequired": {"a": ["b"]}})),
    ]
}

/// `allOf` over object branches; short property names make collisions
/// between branches and with the node's own properties likely
fn all_of_strategy(inner: BoxedStrategy<Value>) -> impl Strategy<Value = Value> {
    (
        prop::collection::btree_map("[a-d]", inner.clone(), 0..2),
        prop::collection::btree_map("[a-d]", inner.clone(), 1..3),
        prop::collection::btree_map("[a-d]", inner, 1..3),
    )
        .prop_map(|(own, first, second)| {
            let required: Vec<Value> = second.keys().map(|k| Value::String(k.clone())).collect();
            json!({
                "type": "object",
                "properties": own.into_iter().collect::<Map<_, _>>(),
                "allOf": [
                    {"properties": first.into_iter().collect::<Map<_, _>>()},
                    {"type": "object", "properties": second.into_iter().collect::<Map<_, _>>(), "required": required}
                ]
            })
        })
}

/// Object carrying definitions under either spelling
fn definitions_strategy(inner: BoxedStrategy<Value>) -> impl Strategy<Value = Value> {
    (
        prop::collection::btree_map("[A-Z][a-z]{0,4}", inner, 1..3),
        prop::sample::select(vec!["$defs", "definitions"]),
    )
        .prop_map(|(defs, keyword)| {
            let mut node = Map::new();
            node.insert("type".into(), json!("object"));
            node.insert("properties".into(), json!({}));
            node.insert("additionalProperties".into(), json!(false));
            node.insert(keyword.into(), Value::Object(defs.into_iter().collect()));
            Value::Object(node)
        })
}

/// Nested schemas that also use `oneOf`, `allOf`, type unions, `not`, `if`
/// and definitions
fn composed_schema_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![leaf_strategy(), composition_leaf_strategy()].prop_recursive(3, 32, 4, |inner| {
        prop_oneof![
            object_strategy(inner.clone()),
            array_strategy(inner.clone()),
            prop::collection::vec(inner.clone(), 2..4).prop_map(|variants| json!({"oneOf": variants})),
            all_of_strategy(inner.clone()),
            definitions_strategy(inner),
        ]
    })
}

/// Pointer of the node a diagnostic is about
fn node_of(diagnostic: &Diagnostic) -> String {
    match diagnostic.kind {
        IssueKind::MissingRequiredProperties => diagnostic
            .pointer
            .strip_suffix("/required")
            .unwrap_or(&diagnostic.pointer)
            .to_string(),
        _ => diagnostic.fallback_pointer.clone(),
    }
}

proptest! {
    #[test]
    fn fix_never_mutates_input(schema in composed_schema_strategy()) {
        let snapshot = schema.clone();
        let _ = fix(&schema, &strict_rules());
        prop_assert_eq!(schema, snapshot);
    }

    #[test]
    fn fix_is_deterministic(schema in schema_strategy()) {
        let rules = strict_rules();
        let first = serde_json::to_string(&fix(&schema, &rules)).unwrap();
        let second = serde_json::to_string(&fix(&schema, &rules)).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn validate_is_deterministic(schema in schema_strategy()) {
        let raw = serde_json::to_string_pretty(&schema).unwrap();
        let rules = lenient_rules();
        prop_assert_eq!(validate(&raw, &rules), validate(&raw, &rules));
    }

    #[test]
    fn markers_match_diagnostics(schema in schema_strategy()) {
        let raw = serde_json::to_string_pretty(&schema).unwrap();
        let rules = strict_rules();
        let markers = validate(&raw, &rules);
        let diagnostics = diagnose(&schema, &rules);
        prop_assert_eq!(markers.len(), diagnostics.len());
        for (marker, diagnostic) in markers.iter().zip(&diagnostics) {
            prop_assert_eq!(&marker.pointer, &diagnostic.pointer);
            prop_assert!(marker.start_line >= 1 && marker.start_column >= 1);
        }
    }

    #[test]
    fn fixed_defects_do_not_reappear(schema in schema_strategy()) {
        let rules = strict_rules();
        let result = fix(&schema, &rules);
        let remaining = diagnose(&result.fixed_schema, &rules);

        for applied in &result.applied_fixes {
            let repeat = remaining
                .iter()
                .find(|d| d.kind == applied.kind && node_of(d) == applied.pointer);
            prop_assert!(
                repeat.is_none(),
                "{} fixed at {:?} but reported again: {:?}",
                applied.kind,
                applied.pointer,
                repeat
            );
        }
    }

    #[test]
    fn composed_defects_are_fixed_or_disclosed(schema in composed_schema_strategy()) {
        let rules = strict_rules();
        let result = fix(&schema, &rules);
        let remaining = diagnose(&result.fixed_schema, &rules);

        for applied in &result.applied_fixes {
            let repeat = remaining
                .iter()
                .find(|d| d.kind == applied.kind && node_of(d) == applied.pointer);
            prop_assert!(repeat.is_none(), "{} fixed at {:?} but reported again", applied.kind, applied.pointer);
        }

        for residual in remaining.iter().filter(|d| d.is_error()) {
            let disclosed = result
                .unresolved_errors
                .iter()
                .any(|u| u.kind == residual.kind && u.pointer == node_of(residual));
            prop_assert!(
                disclosed,
                "residual {:?} has no unresolved entry in {:?}",
                residual,
                result.unresolved_errors
            );
        }
    }

    #[test]
    fn generated_schemas_are_fully_repaired(schema in schema_strategy()) {
        let rules = strict_rules();
        let result = fix(&schema, &rules);
        prop_assert!(result.is_fully_resolved());
        let errors: Vec<_> = diagnose(&result.fixed_schema, &rules)
            .into_iter()
            .filter(|d| d.is_error())
            .collect();
        prop_assert!(errors.is_empty(), "residual errors: {:?}", errors);
        prop_assert!(result.applied_fixes.iter().all(|f| f.kind != FixKind::QuantitativeLimitExceeded));
    }
}
