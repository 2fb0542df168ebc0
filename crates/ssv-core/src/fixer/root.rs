//! Root reshaping

use super::{AppliedFix, FixKind, Fixer};
use crate::resolver::{resolve_type, union_members};
use serde_json::{Map, Value};

impl Fixer<'_> {
    /// Wrap a root of a disallowed type under an `items` property
    pub(super) fn fix_root_type(&mut self, root: &mut Map<String, Value>) {
        let Some(t) = resolve_type(root).known().map(str::to_owned) else {
            return;
        };
        if self.index.rules().root_type.allows(&t) {
            return;
        }

        self.wrap_root(root, "items");
        self.applied(
            AppliedFix::new(
                "",
                FixKind::RootTypeWrong,
                format!("Wrapped \"{}\" root in object with \"items\" property", t),
            )
            .with_info_lost("Wrapper property name \"items\" is generic and may need renaming"),
        );
    }

    /// Wrap a forbidden root-level `anyOf` under a `result` property
    ///
    /// A root `oneOf` or multi-type union counts too, since the walk rewrites
    /// both into `anyOf`. Only applies when `anyOf` is supported below the
    /// root; otherwise the composition repair reports it.
    pub(super) fn fix_root_any_of(&mut self, root: &mut Map<String, Value>) {
        if self.index.rules().root_any_of_allowed || !self.index.supports_composition("anyOf") {
            return;
        }
        let Some(source) = self.root_any_of_source(root) else {
            return;
        };

        self.wrap_root(root, "result");
        self.applied(
            AppliedFix::new(
                "",
                FixKind::RootAnyofNotAllowed,
                format!("Wrapped root-level {} in object with \"result\" property", source),
            )
            .with_info_lost("Adds one nesting level; wrapper property name is generic"),
        );
    }

    /// What makes the root an `anyOf` once fixed, if anything
    fn root_any_of_source(&self, root: &Map<String, Value>) -> Option<&'static str> {
        if root.contains_key("anyOf") {
            Some("anyOf")
        } else if root.contains_key("oneOf") && !self.index.supports_composition("oneOf") {
            Some("oneOf")
        } else if union_members(root).is_some() {
            Some("type union")
        } else {
            None
        }
    }

    fn wrap_root(&self, root: &mut Map<String, Value>, property: &str) {
        let original = std::mem::take(root);

        let mut properties = Map::new();
        properties.insert(property.to_string(), Value::Object(original));

        root.insert("type".to_string(), Value::String("object".to_string()));
        root.insert("properties".to_string(), Value::Object(properties));
        root.insert(
            "required".to_string(),
            Value::Array(vec![Value::String(property.to_string())]),
        );
        if self.index.rules().wants_additional_properties_false() {
            root.insert("additionalProperties".to_string(), Value::Bool(false));
        }
    }
}
