//! Rule-set fixer
//!
//! Rewrites a schema so that a provider accepts it, recording every change.
//! The input tree is never touched: the fixer clones it and mutates the copy.
//!
//! Fixing runs in two phases. Root reshaping comes first because it changes
//! the shape of the whole tree:
//!
//! 1. a root whose type the provider does not accept is wrapped under an
//!    `items` property of a new object root
//! 2. a root-level `anyOf` the provider forbids is wrapped under `result`,
//!    as is a root `oneOf` or type union that the walk would turn into one
//!
//! Then every node is repaired pre-order: multi-type unions, composition
//! keywords, unsupported keywords, string formats, object policy.
//!
//! Anything the fixer recognizes but cannot repair safely is returned as an
//! [`UnresolvedError`] instead of being dropped. Lossy rewrites carry an
//! `info_lost` note.
//!
//! Copyright (c) 2025 SSV Team
//! Licensed under the Apache-2.0 license

mod composition;
mod keywords;
mod object;
mod root;
pub mod types;

pub use types::{AppliedFix, FixKind, FixResult, UnresolvedError};

use crate::error::{Error, Result};
use crate::keywords::DEFINITION_KEYWORDS;
use crate::pointer;
use crate::resolver::resolve_type;
use crate::rule_set::{RuleIndex, RuleSet};
use crate::stats::SchemaStats;
use serde_json::{Map, Value};
use tracing::{debug, trace};

/// Fix a parsed schema for a rule set
///
/// Non-object input is returned unchanged with no fixes.
pub fn fix(schema: &Value, rules: &RuleSet) -> FixResult {
    if !schema.is_object() {
        debug!(rule_set = %rules.rule_set_id, "Schema root is not an object, nothing to fix");
        return FixResult::unchanged(schema.clone());
    }

    let mut fixed = schema.clone();
    let mut fixer = Fixer::new(rules.index());
    if let Value::Object(root) = &mut fixed {
        fixer.fix_root_type(root);
        fixer.fix_root_any_of(root);
        fixer.walk(root, "");
    }
    fixer.check_limits(&fixed);

    debug!(
        rule_set = %rules.rule_set_id,
        applied = fixer.fixes.len(),
        unresolved = fixer.unresolved.len(),
        "Fix run complete"
    );

    FixResult {
        fixed_schema: fixed,
        applied_fixes: fixer.fixes,
        unresolved_errors: fixer.unresolved,
    }
}

/// Parse schema text and fix it
///
/// Unlike [`fix`], malformed input is reported: text that is not JSON is an
/// [`Error::Json`], a non-object root is an [`Error::InvalidSchema`].
pub fn fix_str(raw: &str, rules: &RuleSet) -> Result<FixResult> {
    let schema: Value = serde_json::from_str(raw)?;
    if !schema.is_object() {
        return Err(Error::InvalidSchema {
            message: "schema root must be a JSON object".to_string(),
        });
    }
    Ok(fix(&schema, rules))
}

/// Append a note to a node's description, in parentheses when one exists
pub(crate) fn append_description(node: &mut Map<String, Value>, text: &str) {
    let updated = match node.get("description") {
        Some(Value::String(existing)) if !existing.is_empty() => format!("{} ({})", existing, text),
        _ => text.to_string(),
    };
    node.insert("description".to_string(), Value::String(updated));
}

pub(crate) struct Fixer<'a> {
    index: RuleIndex<'a>,
    fixes: Vec<AppliedFix>,
    unresolved: Vec<UnresolvedError>,
}

impl<'a> Fixer<'a> {
    fn new(index: RuleIndex<'a>) -> Self {
        Self {
            index,
            fixes: Vec::new(),
            unresolved: Vec::new(),
        }
    }

    fn applied(&mut self, fix: AppliedFix) {
        trace!(pointer = %fix.pointer, kind = %fix.kind, "Applied fix");
        self.fixes.push(fix);
    }

    fn unresolved(&mut self, error: UnresolvedError) {
        trace!(pointer = %error.pointer, kind = %error.kind, "Unresolved");
        self.unresolved.push(error);
    }

    fn walk(&mut self, node: &mut Map<String, Value>, at: &str) {
        self.fix_multi_type_union(node, at);
        self.fix_composition(node, at);

        let node_type = resolve_type(node).known().map(str::to_owned);
        if let Some(t) = node_type.as_deref() {
            if self.index.supports_type(t) {
                self.fix_unsupported_keywords(node, t, at);
            } else {
                self.unresolved(UnresolvedError::new(
                    at,
                    FixKind::UnsupportedType,
                    format!("Type \"{}\" is not supported by this provider", t),
                    "No safe mechanical mapping to a supported type",
                ));
            }
            if t == "string" {
                self.fix_string_format(node, at);
            }
        }

        if node_type.as_deref() == Some("object") || node.contains_key("properties") {
            self.fix_additional_properties(node, at);
            self.fix_required(node, at);
        }

        self.recurse(node, at);
    }

    /// Children in the same order the validator visits them
    fn recurse(&mut self, node: &mut Map<String, Value>, at: &str) {
        if let Some(Value::Object(props)) = node.get_mut("properties") {
            let base = pointer::child(at, "properties");
            for (key, value) in props.iter_mut() {
                if let Value::Object(child) = value {
                    self.walk(child, &pointer::child(&base, key));
                }
            }
        }

        if let Some(Value::Object(items)) = node.get_mut("items") {
            self.walk(items, &pointer::child(at, "items"));
        }

        for keyword in ["prefixItems", "anyOf"] {
            if let Some(Value::Array(entries)) = node.get_mut(keyword) {
                let base = pointer::child(at, keyword);
                for (i, entry) in entries.iter_mut().enumerate() {
                    if let Value::Object(child) = entry {
                        self.walk(child, &pointer::index(&base, i));
                    }
                }
            }
        }

        for keyword in DEFINITION_KEYWORDS {
            if let Some(Value::Object(defs)) = node.get_mut(*keyword) {
                let base = pointer::child(at, keyword);
                for (key, value) in defs.iter_mut() {
                    if let Value::Object(child) = value {
                        self.walk(child, &pointer::child(&base, key));
                    }
                }
            }
        }

        if let Some(Value::Object(extra)) = node.get_mut("additionalProperties") {
            self.walk(extra, &pointer::child(at, "additionalProperties"));
        }
    }

    /// Size limits cannot be repaired mechanically; report what the fixed
    /// tree still exceeds
    fn check_limits(&mut self, fixed: &Value) {
        let stats = SchemaStats::collect(fixed);
        for violation in stats.violations(&self.index.rules().size_limits) {
            self.unresolved(UnresolvedError::new(
                "",
                FixKind::QuantitativeLimitExceeded,
                violation.message,
                "Size limits cannot be met mechanically; split or simplify the schema",
            ));
        }
    }
}
