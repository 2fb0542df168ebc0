//! Type resolution for schema nodes
//!
//! Providers express nullability as `["T", "null"]`, so a node's effective
//! type is the single non-null entry of a type list. Lists with more than one
//! non-null entry are multi-type unions, which no provider accepts directly.
//!
//! Copyright (c) 2025 SSV Team
//! Licensed under the Apache-2.0 license

use serde_json::{Map, Value};

/// Effective scalar type of a schema node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedType<'a> {
    /// A single type, possibly nullable
    Known(&'a str),
    /// A type list with two or more non-null entries
    MultiUnion,
    /// No `type`, or a `type` that cannot be interpreted
    Unknown,
}

impl<'a> ResolvedType<'a> {
    pub fn known(self) -> Option<&'a str> {
        match self {
            ResolvedType::Known(t) => Some(t),
            _ => None,
        }
    }

    pub fn is(self, type_name: &str) -> bool {
        self.known() == Some(type_name)
    }
}

/// Resolve the effective type of a node
pub fn resolve_type(node: &Map<String, Value>) -> ResolvedType<'_> {
    match node.get("type") {
        Some(Value::String(t)) => ResolvedType::Known(t),
        Some(Value::Array(entries)) => {
            let mut non_null = entries.iter().filter(|v| v.as_str() != Some("null"));
            match (non_null.next(), non_null.next()) {
                (Some(only), None) => only.as_str().map_or(ResolvedType::Unknown, ResolvedType::Known),
                (Some(_), Some(_)) => ResolvedType::MultiUnion,
                _ => ResolvedType::Unknown,
            }
        }
        _ => ResolvedType::Unknown,
    }
}

/// Non-null entries of a multi-type union, `None` for anything else
pub fn union_members(node: &Map<String, Value>) -> Option<&Vec<Value>> {
    match (node.get("type"), resolve_type(node)) {
        (Some(Value::Array(entries)), ResolvedType::MultiUnion) => Some(entries),
        _ => None,
    }
}
