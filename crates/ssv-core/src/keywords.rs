//! Keyword classification tables
//!
//! Every key on a schema node falls into one of three buckets:
//! - structural (`type`), always allowed
//! - composition / applicator keywords, checked against the rule set's
//!   composition support
//! - everything else, checked against the keyword list of the node's type
//!
//! Copyright (c) 2025 SSV Team
//! Licensed under the Apache-2.0 license

use serde_json::Value;

/// Keywords valid on any node regardless of type or provider
pub const STRUCTURAL_KEYWORDS: &[&str] = &["type"];

/// Composition and applicator keywords
///
/// `definitions` is the draft-07 spelling of `$defs` and is classified the
/// same way everywhere.
pub const COMPOSITION_KEYWORDS: &[&str] = &[
    "anyOf",
    "allOf",
    "oneOf",
    "not",
    "if",
    "then",
    "else",
    "dependentRequired",
    "dependentSchemas",
    "$ref",
    "$defs",
    "definitions",
];

/// Definition containers walked with their depth reset to zero
pub const DEFINITION_KEYWORDS: &[&str] = &["$defs", "definitions"];

/// Composition keywords the fixer removes outright when unsupported
pub const REMOVABLE_COMPOSITION_KEYWORDS: &[&str] =
    &["not", "if", "dependentRequired", "dependentSchemas"];

pub fn is_structural_keyword(key: &str) -> bool {
    STRUCTURAL_KEYWORDS.contains(&key)
}

pub fn is_composition_keyword(key: &str) -> bool {
    COMPOSITION_KEYWORDS.contains(&key)
}

/// Name under which a composition keyword is looked up in a rule set
pub fn canonical_composition_keyword(key: &str) -> &str {
    if key == "definitions" {
        "$defs"
    } else {
        key
    }
}

/// Render an unsupported constraint as a human-readable description hint
///
/// Known constraints use short templates (`>= 0`, `min length: 3`); anything
/// else becomes `key: <json>`.
pub fn constraint_hint(key: &str, value: &Value) -> String {
    let v = || hint_value(value);
    match key {
        "minimum" => format!(">= {}", v()),
        "maximum" => format!("<= {}", v()),
        "exclusiveMinimum" => format!("> {}", v()),
        "exclusiveMaximum" => format!("< {}", v()),
        "multipleOf" => format!("multiple of {}", v()),
        "minLength" => format!("min length: {}", v()),
        "maxLength" => format!("max length: {}", v()),
        "pattern" => format!("pattern: {}", v()),
        "format" => format!("format: {}", v()),
        "minItems" => format!("min items: {}", v()),
        "maxItems" => format!("max items: {}", v()),
        "uniqueItems" => "items must be unique".to_string(),
        "prefixItems" => "tuple structure removed".to_string(),
        _ => format!("{}: {}", key, value),
    }
}

/// Plain-text rendering of a constraint value: strings unquoted, integral
/// floats without a fractional part, arrays comma-joined.
fn hint_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => {
                format!("{}", f as i64)
            }
            _ => n.to_string(),
        },
        Value::Array(items) => items.iter().map(hint_value).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}
