//! Rule-set validator
//!
//! Walks a schema document and reports every capability violation for one
//! provider as a positioned [`Marker`]. The walk has two layers:
//!
//! - [`diagnose`] works on a parsed value tree and returns pointer-anchored
//!   [`Diagnostic`]s in walk order
//! - [`validate`] parses raw text, runs [`diagnose`] and resolves each
//!   diagnostic's pointer through a [`SourceMap`]
//!
//! Unparseable text and non-object roots yield no markers; the structural
//! pre-check is responsible for those.
//!
//! Copyright (c) 2025 SSV Team
//! Licensed under the Apache-2.0 license

mod checks;

pub(crate) use checks::missing_required;

use crate::rule_set::{RuleIndex, RuleSet};
use crate::source_map::SourceMap;
use crate::stats::{children, SchemaStats};
use crate::types::{Diagnostic, IssueKind, Marker};
use serde_json::{Map, Value};
use tracing::{debug, trace};

/// Validate raw schema text against a rule set
///
/// Markers come back in walk order: per-node checks pre-order, then size
/// limit violations anchored at the root.
pub fn validate(raw: &str, rules: &RuleSet) -> Vec<Marker> {
    let schema: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            debug!(rule_set = %rules.rule_set_id, error = %e, "Schema text is not valid JSON, no markers");
            return Vec::new();
        }
    };
    if !schema.is_object() {
        debug!(rule_set = %rules.rule_set_id, "Schema root is not an object, no markers");
        return Vec::new();
    }

    let source_map = SourceMap::parse(raw).unwrap_or_else(|e| {
        debug!(error = %e, "Source positions unavailable, anchoring markers at document start");
        SourceMap::default()
    });

    diagnose(&schema, rules)
        .into_iter()
        .map(|d| to_marker(&source_map, d))
        .collect()
}

/// Collect pointer-anchored diagnostics for a parsed schema
pub fn diagnose(schema: &Value, rules: &RuleSet) -> Vec<Diagnostic> {
    let Value::Object(root) = schema else {
        return Vec::new();
    };

    let mut walker = Walker::new(rules.index());
    walker.walk(root, "", 0, true);
    walker.check_limits();

    debug!(
        rule_set = %rules.rule_set_id,
        diagnostics = walker.diagnostics.len(),
        "Validation walk complete"
    );
    walker.diagnostics
}

/// True when no marker has error severity
pub fn is_compatible(markers: &[Marker]) -> bool {
    !markers.iter().any(Marker::is_error)
}

/// Resolve a diagnostic's position
pub fn to_marker(source_map: &SourceMap, diagnostic: Diagnostic) -> Marker {
    let span = source_map.span(&diagnostic.pointer, &diagnostic.fallback_pointer);
    Marker {
        start_line: span.start_line,
        start_column: span.start_column,
        end_line: span.end_line,
        end_column: span.end_column,
        message: diagnostic.message,
        severity: diagnostic.severity,
        pointer: diagnostic.pointer,
        kind: diagnostic.kind,
    }
}

pub(crate) struct Walker<'a> {
    index: RuleIndex<'a>,
    diagnostics: Vec<Diagnostic>,
    stats: SchemaStats,
}

impl<'a> Walker<'a> {
    fn new(index: RuleIndex<'a>) -> Self {
        Self {
            index,
            diagnostics: Vec::new(),
            stats: SchemaStats::default(),
        }
    }

    fn walk(&mut self, node: &Map<String, Value>, pointer: &str, depth: usize, is_root: bool) {
        trace!(pointer, depth, "Visiting node");

        if is_root {
            self.check_root(node);
        }
        self.check_multi_type(node, pointer);
        self.check_type_support(node, pointer);
        self.check_keywords(node, pointer, is_root);
        self.check_object_policy(node, pointer);
        self.check_string_format(node, pointer);

        self.stats.observe(node, depth);
        for child in children(node, pointer, depth) {
            self.walk(child.node, &child.pointer, child.depth, false);
        }
    }

    fn check_limits(&mut self) {
        for violation in self.stats.violations(&self.index.rules().size_limits) {
            self.diagnostics.push(Diagnostic::error(
                "",
                "",
                IssueKind::QuantitativeLimitExceeded,
                violation.message,
            ));
        }
    }

    fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule_set::SizeLimits;
    use crate::types::Severity;
    use pretty_assertions::assert_eq;

    fn strict_rules() -> RuleSet {
        RuleSet::new("strict", "openai")
            .with_type("object", ["description", "properties", "required", "additionalProperties"])
            .with_type("string", ["description", "enum", "format"])
            .with_type("integer", ["description", "minimum", "maximum"])
            .with_type("array", ["description", "items"])
            .with_type("null", ["description"])
            .with_composition(["anyOf", "$ref", "$defs"])
            .with_string_formats(["date-time", "email"])
            .with_all_fields_required(true)
            .with_additional_properties_false(true)
    }

    #[test]
    fn test_compatible_schema_has_no_markers() {
        let raw = r#"{
  "type": "object",
  "properties": {"name": {"type": "string"}},
  "required": ["name"],
  "additionalProperties": false
}"#;
        assert!(validate(raw, &strict_rules()).is_empty());
    }

    #[test]
    fn test_unparseable_and_non_object_yield_nothing() {
        let rules = strict_rules();
        assert!(validate("{not json", &rules).is_empty());
        assert!(validate("[1, 2]", &rules).is_empty());
        assert!(validate("\"text\"", &rules).is_empty());
        assert!(diagnose(&Value::Null, &rules).is_empty());
    }

    #[test]
    fn test_root_type_marker_spans_type_key() {
        let raw = "{\n  \"type\": \"array\",\n  \"items\": {\"type\": \"string\"}\n}";
        let markers = validate(raw, &strict_rules());
        assert_eq!(markers[0].message, "Root type must be object, got \"array\"");
        assert_eq!(markers[0].kind, IssueKind::RootTypeWrong);
        assert_eq!((markers[0].start_line, markers[0].start_column), (2, 3));
        assert_eq!((markers[0].end_line, markers[0].end_column), (2, 9));
    }

    #[test]
    fn test_missing_required_lists_names() {
        let raw = r#"{"type":"object","properties":{"a":{"type":"string"},"b":{"type":"string"}},"required":["a"],"additionalProperties":false}"#;
        let markers = validate(raw, &strict_rules());
        assert_eq!(markers.len(), 1);
        assert_eq!(
            markers[0].message,
            "All properties must be in \"required\" for this provider. Missing: b"
        );
        assert_eq!(markers[0].pointer, "/required");
    }

    #[test]
    fn test_missing_required_array_falls_back_to_properties() {
        let raw = r#"{"type":"object","properties":{"a":{"type":"string"}},"additionalProperties":false}"#;
        let markers = validate(raw, &strict_rules());
        assert_eq!(markers.len(), 1);
        // Anchored at the "properties" key
        assert_eq!(markers[0].start_column, 18);
    }

    #[test]
    fn test_recommended_additional_properties_is_warning() {
        let rules = RuleSet::new("soft", "gemini")
            .with_type("object", ["properties", "required"])
            .with_type("string", Vec::<String>::new())
            .with_additional_properties_false_recommended(true);
        let raw = r#"{"type":"object","properties":{"a":{"type":"string"}}}"#;
        let markers = validate(raw, &rules);
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].severity, Severity::Warning);
        assert!(is_compatible(&markers));
    }

    #[test]
    fn test_limits_anchor_at_root() {
        let rules = strict_rules().with_size_limits(SizeLimits {
            max_properties: Some(1),
            ..SizeLimits::default()
        });
        let raw = r#"{"type":"object","properties":{"a":{"type":"string"},"b":{"type":"string"}},"required":["a","b"],"additionalProperties":false}"#;
        let markers = validate(raw, &rules);
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].kind, IssueKind::QuantitativeLimitExceeded);
        assert_eq!(markers[0].pointer, "");
        assert_eq!((markers[0].start_line, markers[0].start_column), (1, 1));
    }
}
