//! Provider rule sets
//!
//! A [`RuleSet`] is the declarative capability table for one LLM provider's
//! structured-output mode: which root types it accepts, which keywords each
//! JSON type may carry, which composition keywords and string formats are
//! understood, object-level policies, and hard size limits. Rule sets are pure
//! data supplied by an external store and are never derived by the engine.
//!
//! [`RuleIndex`] compiles the lists of a rule set into hash-set lookups once per
//! validate/fix call.
//!
//! Copyright (c) 2025 SSV Team
//! Licensed under the Apache-2.0 license

use crate::error::{Error, Result};
use crate::keywords::canonical_composition_keyword;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Allowed top-level type(s) for a provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RootType {
    Single(String),
    Many(Vec<String>),
}

impl RootType {
    /// All allowed root type names, in declaration order
    pub fn allowed(&self) -> Vec<&str> {
        match self {
            RootType::Single(t) => vec![t.as_str()],
            RootType::Many(ts) => ts.iter().map(String::as_str).collect(),
        }
    }

    pub fn allows(&self, type_name: &str) -> bool {
        self.allowed().contains(&type_name)
    }

    /// Human-readable form, e.g. `object or array`
    pub fn describe(&self) -> String {
        self.allowed().join(" or ")
    }
}

impl Default for RootType {
    fn default() -> Self {
        RootType::Single("object".to_string())
    }
}

/// Keywords one JSON type accepts for a provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportedType {
    #[serde(rename = "type")]
    pub type_name: String,
    pub supported_keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unsupported_keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl SupportedType {
    pub fn new<I, S>(type_name: impl Into<String>, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            type_name: type_name.into(),
            supported_keywords: keywords.into_iter().map(Into::into).collect(),
            unsupported_keywords: Vec::new(),
            notes: None,
        }
    }
}

/// Supported and unsupported applicator keywords
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositionSupport {
    #[serde(default)]
    pub supported: Vec<String>,
    #[serde(default)]
    pub unsupported: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Optional numeric ceilings; `None` means unlimited
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SizeLimits {
    pub max_properties: Option<u64>,
    pub max_nesting_depth: Option<u64>,
    pub max_string_length_names_enums: Option<u64>,
    pub max_enum_values: Option<u64>,
}

/// Declarative capability table for one provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleSet {
    pub rule_set_id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub provider: String,
    pub provider_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub models: Vec<String>,

    pub supported_types: Vec<SupportedType>,
    /// Allowed `format` values; empty means `format` itself is unsupported
    #[serde(default, rename = "stringFormats")]
    pub supported_string_formats: Vec<String>,
    #[serde(default)]
    pub composition: CompositionSupport,
    #[serde(default)]
    pub size_limits: SizeLimits,

    pub root_type: RootType,
    pub root_any_of_allowed: bool,
    pub all_fields_required: bool,
    pub additional_properties_must_be_false: bool,
    #[serde(default)]
    pub additional_properties_false_recommended: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tips: Vec<String>,
}

impl RuleSet {
    /// Create a permissive-by-omission rule set: object root, no supported
    /// types, no composition, no policies. Use the `with_*` methods to fill it.
    pub fn new(rule_set_id: impl Into<String>, provider_id: impl Into<String>) -> Self {
        Self {
            rule_set_id: rule_set_id.into(),
            display_name: String::new(),
            provider: String::new(),
            provider_id: provider_id.into(),
            doc_url: None,
            description: None,
            models: Vec::new(),
            supported_types: Vec::new(),
            supported_string_formats: Vec::new(),
            composition: CompositionSupport::default(),
            size_limits: SizeLimits::default(),
            root_type: RootType::default(),
            root_any_of_allowed: false,
            all_fields_required: false,
            additional_properties_must_be_false: false,
            additional_properties_false_recommended: false,
            tips: Vec::new(),
        }
    }

    pub fn with_type<I, S>(mut self, type_name: &str, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.supported_types.push(SupportedType::new(type_name, keywords));
        self
    }

    pub fn with_root_type(mut self, root_type: RootType) -> Self {
        self.root_type = root_type;
        self
    }

    pub fn with_composition<I, S>(mut self, supported: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.composition.supported = supported.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_string_formats<I, S>(mut self, formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.supported_string_formats = formats.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_size_limits(mut self, limits: SizeLimits) -> Self {
        self.size_limits = limits;
        self
    }

    pub fn with_root_any_of_allowed(mut self, allowed: bool) -> Self {
        self.root_any_of_allowed = allowed;
        self
    }

    pub fn with_all_fields_required(mut self, required: bool) -> Self {
        self.all_fields_required = required;
        self
    }

    pub fn with_additional_properties_false(mut self, must_be_false: bool) -> Self {
        self.additional_properties_must_be_false = must_be_false;
        self
    }

    pub fn with_additional_properties_false_recommended(mut self, recommended: bool) -> Self {
        self.additional_properties_false_recommended = recommended;
        self
    }

    /// Whether a wrapper object should carry `additionalProperties: false`
    pub fn wants_additional_properties_false(&self) -> bool {
        self.additional_properties_must_be_false || self.additional_properties_false_recommended
    }

    /// Sanity checks for rule set data loaded from a store
    pub fn check(&self) -> Result<()> {
        if self.rule_set_id.trim().is_empty() {
            return Err(Error::configuration("rule set id must not be empty"));
        }
        if self.root_type.allowed().is_empty() {
            return Err(Error::configuration(format!(
                "rule set '{}' declares no root type",
                self.rule_set_id
            )));
        }
        let mut seen = HashSet::new();
        for st in &self.supported_types {
            if !seen.insert(st.type_name.as_str()) {
                return Err(Error::configuration(format!(
                    "rule set '{}' declares type '{}' more than once",
                    self.rule_set_id, st.type_name
                )));
            }
        }
        Ok(())
    }

    /// Compile lookup tables for a walk
    pub fn index(&self) -> RuleIndex<'_> {
        RuleIndex::new(self)
    }
}

/// Hash-set view of a [`RuleSet`] used during a single walk
#[derive(Debug)]
pub struct RuleIndex<'a> {
    rules: &'a RuleSet,
    composition: HashSet<&'a str>,
    keywords_by_type: HashMap<&'a str, HashSet<&'a str>>,
}

impl<'a> RuleIndex<'a> {
    pub fn new(rules: &'a RuleSet) -> Self {
        let composition = rules
            .composition
            .supported
            .iter()
            .map(|k| canonical_composition_keyword(k))
            .collect();
        let keywords_by_type = rules
            .supported_types
            .iter()
            .map(|st| {
                (
                    st.type_name.as_str(),
                    st.supported_keywords.iter().map(String::as_str).collect(),
                )
            })
            .collect();
        Self {
            rules,
            composition,
            keywords_by_type,
        }
    }

    pub fn rules(&self) -> &'a RuleSet {
        self.rules
    }

    /// Composition support, with `definitions` treated as `$defs`
    pub fn supports_composition(&self, keyword: &str) -> bool {
        self.composition.contains(canonical_composition_keyword(keyword))
    }

    pub fn supports_type(&self, type_name: &str) -> bool {
        self.keywords_by_type.contains_key(type_name)
    }

    /// Keywords accepted by a type; `None` when the type itself is unsupported
    pub fn type_keywords(&self, type_name: &str) -> Option<&HashSet<&'a str>> {
        self.keywords_by_type.get(type_name)
    }

    pub fn type_supports_keyword(&self, type_name: &str, keyword: &str) -> bool {
        self.type_keywords(type_name)
            .is_some_and(|keywords| keywords.contains(keyword))
    }

    /// Listed string formats; empty means the provider has no format list
    pub fn string_formats(&self) -> &'a [String] {
        &self.rules.supported_string_formats
    }

    pub fn format_supported(&self, format: &str) -> bool {
        self.rules.supported_string_formats.iter().any(|f| f == format)
    }
}
