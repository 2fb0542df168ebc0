//! Unsupported keyword and string format repair

use super::{append_description, AppliedFix, FixKind, Fixer};
use crate::keywords::{constraint_hint, is_composition_keyword, is_structural_keyword};
use serde_json::{Map, Value};

impl Fixer<'_> {
    /// Move keywords the node's type does not support into its description
    pub(super) fn fix_unsupported_keywords(&mut self, node: &mut Map<String, Value>, node_type: &str, at: &str) {
        let unsupported: Vec<String> = node
            .keys()
            .filter(|k| {
                !is_structural_keyword(k)
                    && !is_composition_keyword(k)
                    && !self.index.type_supports_keyword(node_type, k)
            })
            .cloned()
            .collect();

        let mut hints = Vec::with_capacity(unsupported.len());
        for key in unsupported {
            if let Some(value) = node.shift_remove(&key) {
                hints.push(constraint_hint(&key, &value));
            }
        }
        if hints.is_empty() {
            return;
        }

        let joined = hints.join(", ");
        if self.index.type_supports_keyword(node_type, "description") {
            append_description(node, &format!("Constraints: {}", joined));
            self.applied(
                AppliedFix::new(
                    at,
                    FixKind::UnsupportedKeyword,
                    format!("Moved unsupported keywords to description: {}", joined),
                )
                .with_info_lost("Constraints are now hints in the description, not enforced by the schema"),
            );
        } else {
            self.applied(
                AppliedFix::new(
                    at,
                    FixKind::UnsupportedKeyword,
                    format!("Removed unsupported keywords: {}", joined),
                )
                .with_info_lost(format!(
                    "Constraints were dropped; type \"{}\" cannot carry a description",
                    node_type
                )),
            );
        }
    }

    /// Replace a `format` outside the provider's list with a description hint
    pub(super) fn fix_string_format(&mut self, node: &mut Map<String, Value>, at: &str) {
        let format = match node.get("format") {
            Some(Value::String(f)) => f.clone(),
            _ => return,
        };
        if self.index.string_formats().is_empty() || self.index.format_supported(&format) {
            return;
        }

        node.shift_remove("format");
        append_description(node, &format!("format: {}", format));
        self.applied(
            AppliedFix::new(
                at,
                FixKind::UnsupportedStringFormat,
                format!("Removed unsupported format \"{}\", moved to description", format),
            )
            .with_info_lost("Format validation is now a hint, not enforced"),
        );
    }
}
