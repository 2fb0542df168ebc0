//! Schema size statistics and limit checks
//!
//! Copyright (c) 2025 SSV Team
//! Licensed under the Apache-2.0 license

use crate::keywords::DEFINITION_KEYWORDS;
use crate::pointer;
use crate::rule_set::SizeLimits;
use serde::Serialize;
use serde_json::{Map, Value};

/// A sub-schema reached from a node during a walk
#[derive(Debug)]
pub struct Child<'a> {
    pub pointer: String,
    pub depth: usize,
    pub node: &'a Map<String, Value>,
}

/// Sub-schemas of `node` in walk order
///
/// `properties`, `items`, `prefixItems` and object-valued
/// `additionalProperties` nest one level deeper. `anyOf` branches stay at the
/// same depth. Definition containers restart at depth zero.
pub fn children<'a>(node: &'a Map<String, Value>, at: &str, depth: usize) -> Vec<Child<'a>> {
    let mut out = Vec::new();

    if let Some(Value::Object(props)) = node.get("properties") {
        let base = pointer::child(at, "properties");
        for (key, value) in props {
            if let Value::Object(child) = value {
                out.push(Child {
                    pointer: pointer::child(&base, key),
                    depth: depth + 1,
                    node: child,
                });
            }
        }
    }

    if let Some(Value::Object(items)) = node.get("items") {
        out.push(Child {
            pointer: pointer::child(at, "items"),
            depth: depth + 1,
            node: items,
        });
    }

    for (keyword, child_depth) in [("prefixItems", depth + 1), ("anyOf", depth)] {
        if let Some(Value::Array(entries)) = node.get(keyword) {
            let base = pointer::child(at, keyword);
            for (i, entry) in entries.iter().enumerate() {
                if let Value::Object(child) = entry {
                    out.push(Child {
                        pointer: pointer::index(&base, i),
                        depth: child_depth,
                        node: child,
                    });
                }
            }
        }
    }

    for keyword in DEFINITION_KEYWORDS {
        if let Some(Value::Object(defs)) = node.get(*keyword) {
            let base = pointer::child(at, keyword);
            for (key, value) in defs {
                if let Value::Object(child) = value {
                    out.push(Child {
                        pointer: pointer::child(&base, key),
                        depth: 0,
                        node: child,
                    });
                }
            }
        }
    }

    if let Some(Value::Object(extra)) = node.get("additionalProperties") {
        out.push(Child {
            pointer: pointer::child(at, "additionalProperties"),
            depth: depth + 1,
            node: extra,
        });
    }

    out
}

/// Which size limit a violation refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitKind {
    Properties,
    NestingDepth,
    EnumValues,
    StringLength,
}

/// A size limit the schema exceeds
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LimitViolation {
    pub limit_kind: LimitKind,
    pub actual: u64,
    pub limit: u64,
    pub message: String,
}

/// Running totals collected over every visited node
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaStats {
    pub total_properties: u64,
    pub max_depth: u64,
    pub total_enum_values: u64,
    /// Characters in property names plus string enum values
    pub total_string_length: u64,
}

impl SchemaStats {
    /// Collect statistics for a whole document
    pub fn collect(root: &Value) -> Self {
        let mut stats = Self::default();
        if let Value::Object(node) = root {
            stats.visit(node, "", 0);
        }
        stats
    }

    fn visit(&mut self, node: &Map<String, Value>, at: &str, depth: usize) {
        self.observe(node, depth);
        for child in children(node, at, depth) {
            self.visit(child.node, &child.pointer, child.depth);
        }
    }

    /// Add one node's contribution
    pub fn observe(&mut self, node: &Map<String, Value>, depth: usize) {
        self.max_depth = self.max_depth.max(depth as u64);

        if let Some(Value::Object(props)) = node.get("properties") {
            self.total_properties += props.len() as u64;
            self.total_string_length += props.keys().map(|k| k.chars().count() as u64).sum::<u64>();
        }

        if let Some(Value::Array(values)) = node.get("enum") {
            self.total_enum_values += values.len() as u64;
            self.total_string_length += values
                .iter()
                .filter_map(Value::as_str)
                .map(|s| s.chars().count() as u64)
                .sum::<u64>();
        }
    }

    /// Compare against the limits; absent limits never fire
    pub fn violations(&self, limits: &SizeLimits) -> Vec<LimitViolation> {
        let checks = [
            (
                LimitKind::Properties,
                self.total_properties,
                limits.max_properties,
            ),
            (
                LimitKind::NestingDepth,
                self.max_depth,
                limits.max_nesting_depth,
            ),
            (
                LimitKind::EnumValues,
                self.total_enum_values,
                limits.max_enum_values,
            ),
            (
                LimitKind::StringLength,
                self.total_string_length,
                limits.max_string_length_names_enums,
            ),
        ];

        checks
            .into_iter()
            .filter_map(|(limit_kind, actual, limit)| {
                let limit = limit?;
                (actual > limit).then(|| LimitViolation {
                    limit_kind,
                    actual,
                    limit,
                    message: limit_message(limit_kind, actual, limit),
                })
            })
            .collect()
    }
}

fn limit_message(kind: LimitKind, actual: u64, limit: u64) -> String {
    match kind {
        LimitKind::Properties => format!(
            "Schema has {} total properties, exceeding the limit of {}",
            actual, limit
        ),
        LimitKind::NestingDepth => format!(
            "Schema nesting depth is {}, exceeding the limit of {}",
            actual, limit
        ),
        LimitKind::EnumValues => format!(
            "Schema has {} total enum values, exceeding the limit of {}",
            actual, limit
        ),
        LimitKind::StringLength => format!(
            "Total string length of property names and enum values is {}, exceeding the limit of {}",
            actual, limit
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_collect_counts_names_and_enums() {
        let schema = json!({
            "type": "object",
            "properties": {
                "ab": {"type": "string", "enum": ["xyz", 1, "q"]},
                "list": {"type": "array", "items": {"type": "object", "properties": {"c": {"type": "string"}}}}
            }
        });
        let stats = SchemaStats::collect(&schema);
        assert_eq!(
            stats,
            SchemaStats {
                total_properties: 3,
                max_depth: 3,
                total_enum_values: 3,
                total_string_length: 2 + 4 + 1 + 3 + 1,
            }
        );
    }

    #[test]
    fn test_any_of_keeps_depth_and_defs_reset_it() {
        let schema = json!({
            "anyOf": [{"type": "string"}],
            "$defs": {"deep": {"type": "object", "properties": {"x": {"type": "string"}}}},
            "definitions": {"old": {"type": "string"}}
        });
        let stats = SchemaStats::collect(&schema);
        assert_eq!(stats.max_depth, 1);

        let kids = children(schema.as_object().unwrap(), "", 0);
        let pointers: Vec<_> = kids.iter().map(|c| c.pointer.as_str()).collect();
        assert_eq!(pointers, vec!["/anyOf/0", "/$defs/deep", "/definitions/old"]);
        assert!(kids.iter().all(|c| c.depth == 0));
    }

    #[test]
    fn test_violations_respect_absent_limits() {
        let stats = SchemaStats {
            total_properties: 12,
            max_depth: 4,
            total_enum_values: 0,
            total_string_length: 100,
        };
        let limits = SizeLimits {
            max_properties: Some(10),
            max_nesting_depth: Some(4),
            max_string_length_names_enums: None,
            max_enum_values: Some(0),
        };
        let found = stats.violations(&limits);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].limit_kind, LimitKind::Properties);
        assert_eq!(
            found[0].message,
            "Schema has 12 total properties, exceeding the limit of 10"
        );
    }
}
