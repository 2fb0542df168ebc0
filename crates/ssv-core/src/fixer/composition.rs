//! Multi-type union and composition keyword repair

use super::{append_description, AppliedFix, FixKind, Fixer, UnresolvedError};
use crate::keywords::{
    canonical_composition_keyword, is_composition_keyword, is_structural_keyword,
    REMOVABLE_COMPOSITION_KEYWORDS,
};
use crate::resolver::union_members;
use serde_json::{Map, Value};

impl Fixer<'_> {
    /// Rewrite `type: [A, B, ...]` as one `anyOf` branch per entry
    pub(super) fn fix_multi_type_union(&mut self, node: &mut Map<String, Value>, at: &str) {
        let Some(entries) = union_members(node).cloned() else {
            return;
        };

        if !self.index.supports_composition("anyOf") {
            self.unresolved(UnresolvedError::new(
                at,
                FixKind::MultiTypeUnion,
                "Multi-type union requires anyOf conversion, but anyOf is not supported",
                "Provider does not support anyOf",
            ));
            return;
        }
        if node.contains_key("anyOf") {
            self.unresolved(UnresolvedError::new(
                at,
                FixKind::MultiTypeUnion,
                "Multi-type union cannot be converted to anyOf, the node already has \"anyOf\"",
                "Combining the union with existing anyOf branches needs manual review",
            ));
            return;
        }

        let mut branches: Vec<Map<String, Value>> = entries
            .iter()
            .map(|t| {
                let mut branch = Map::new();
                branch.insert("type".to_string(), t.clone());
                branch
            })
            .collect();

        let movable: Vec<String> = node
            .keys()
            .filter(|k| {
                k.as_str() != "description" && !is_structural_keyword(k) && !is_composition_keyword(k)
            })
            .cloned()
            .collect();

        for key in movable {
            let Some(value) = node.shift_remove(&key) else {
                continue;
            };
            for branch in branches.iter_mut() {
                let supported = branch
                    .get("type")
                    .and_then(Value::as_str)
                    .is_some_and(|t| self.index.type_supports_keyword(t, &key));
                if supported {
                    branch.insert(key.clone(), value.clone());
                }
            }
        }

        node.shift_remove("type");
        node.insert(
            "anyOf".to_string(),
            Value::Array(branches.into_iter().map(Value::Object).collect()),
        );

        let names: Vec<String> = entries
            .iter()
            .map(|t| t.as_str().map_or_else(|| t.to_string(), str::to_owned))
            .collect();
        self.applied(
            AppliedFix::new(
                at,
                FixKind::MultiTypeUnion,
                format!("Converted type union [{}] to anyOf", names.join(", ")),
            )
            .with_info_lost("Keywords are kept only on branches whose type supports them"),
        );
    }

    pub(super) fn fix_composition(&mut self, node: &mut Map<String, Value>, at: &str) {
        self.fix_one_of(node, at);
        self.fix_all_of(node, at);

        for &keyword in REMOVABLE_COMPOSITION_KEYWORDS {
            if !node.contains_key(keyword) || self.index.supports_composition(keyword) {
                continue;
            }
            let Some(value) = node.shift_remove(keyword) else {
                continue;
            };
            if keyword == "if" {
                node.shift_remove("then");
                node.shift_remove("else");
            }
            self.unresolved(UnresolvedError::new(
                at,
                FixKind::UnsupportedComposition,
                format!("\"{}\" is not supported by this provider", keyword),
                format!(
                    "\"{}\" requires semantic understanding to replace; removed, constraint lost",
                    keyword
                ),
            ));
            append_description(node, &format!("Removed unsupported \"{}\": {}", keyword, value));
        }

        // Whatever is left has no mechanical rewrite
        let leftovers: Vec<String> = node
            .keys()
            .filter(|k| {
                is_composition_keyword(k)
                    && !matches!(k.as_str(), "oneOf" | "allOf")
                    && !self.index.supports_composition(canonical_composition_keyword(k))
            })
            .cloned()
            .collect();
        for keyword in leftovers {
            self.unresolved(UnresolvedError::new(
                at,
                FixKind::UnsupportedComposition,
                format!("\"{}\" is not supported by this provider", keyword),
                format!("No mechanical rewrite exists for \"{}\"; left in place", keyword),
            ));
        }
    }

    fn fix_one_of(&mut self, node: &mut Map<String, Value>, at: &str) {
        if !node.contains_key("oneOf") || self.index.supports_composition("oneOf") {
            return;
        }

        let message = "\"oneOf\" is not supported by this provider";
        if !self.index.supports_composition("anyOf") {
            self.unresolved(UnresolvedError::new(
                at,
                FixKind::UnsupportedComposition,
                message,
                "Neither oneOf nor anyOf is supported; cannot convert",
            ));
            return;
        }
        if node.contains_key("anyOf") {
            self.unresolved(UnresolvedError::new(
                at,
                FixKind::UnsupportedComposition,
                message,
                "The node already has \"anyOf\"; converting \"oneOf\" would overwrite it",
            ));
            return;
        }

        if let Some(variants) = node.shift_remove("oneOf") {
            node.insert("anyOf".to_string(), variants);
        }
        append_description(node, "Note: exactly one variant should match (converted from oneOf)");
        self.applied(
            AppliedFix::new(at, FixKind::UnsupportedComposition, "Converted \"oneOf\" to \"anyOf\"")
                .with_info_lost("Exclusivity constraint (exactly-one-match) is now a hint, not enforced"),
        );
    }

    fn fix_all_of(&mut self, node: &mut Map<String, Value>, at: &str) {
        if !node.contains_key("allOf") || self.index.supports_composition("allOf") {
            return;
        }

        match merge_all_of(node) {
            Ok(count) => self.applied(
                AppliedFix::new(
                    at,
                    FixKind::UnsupportedComposition,
                    format!("Merged allOf branches into flat object ({} properties)", count),
                )
                .with_info_lost("Compositional structure lost; branches are now flat properties"),
            ),
            Err(reason) => self.unresolved(UnresolvedError::new(
                at,
                FixKind::UnsupportedComposition,
                "\"allOf\" is not supported by this provider",
                reason,
            )),
        }
    }
}

/// Flatten object-typed `allOf` branches into the node
///
/// Returns the number of merged properties. The node is left untouched when
/// a branch is not an object schema or a property name is declared twice,
/// whether by two branches or by a branch and the node itself.
fn merge_all_of(node: &mut Map<String, Value>) -> Result<usize, String> {
    let Some(Value::Array(branches)) = node.get("allOf") else {
        return Err("\"allOf\" is not an array of schemas".to_string());
    };

    let all_objects = branches.iter().all(|b| {
        b.get("type").and_then(Value::as_str) == Some("object") || b.get("properties").is_some()
    });
    if !all_objects {
        return Err("Branches include non-object schemas that cannot be merged mechanically".to_string());
    }

    let own = match node.get("properties") {
        Some(Value::Object(own)) => Some(own),
        _ => None,
    };
    let mut merged_props = Map::new();
    let mut merged_required: Vec<Value> = Vec::new();
    for branch in branches {
        if let Some(Value::Object(props)) = branch.get("properties") {
            for (key, value) in props {
                if merged_props.contains_key(key) {
                    return Err(format!("Branches declare property \"{}\" more than once", key));
                }
                if own.is_some_and(|own| own.contains_key(key)) {
                    return Err(format!(
                        "Branch property \"{}\" collides with a property the node already declares",
                        key
                    ));
                }
                merged_props.insert(key.clone(), value.clone());
            }
        }
        if let Some(Value::Array(required)) = branch.get("required") {
            for name in required.iter().filter(|r| r.is_string()) {
                if !merged_required.contains(name) {
                    merged_required.push(name.clone());
                }
            }
        }
    }

    let count = merged_props.len();
    node.shift_remove("allOf");
    if !node.contains_key("type") {
        node.insert("type".to_string(), Value::String("object".to_string()));
    }

    match node.get_mut("properties") {
        Some(Value::Object(existing)) => existing.extend(merged_props),
        _ => {
            node.insert("properties".to_string(), Value::Object(merged_props));
        }
    }

    let mut required: Vec<Value> = match node.get("required") {
        Some(Value::Array(existing)) => existing.clone(),
        _ => Vec::new(),
    };
    for name in merged_required {
        if !required.contains(&name) {
            required.push(name);
        }
    }
    if !required.is_empty() {
        node.insert("required".to_string(), Value::Array(required));
    }

    Ok(count)
}
