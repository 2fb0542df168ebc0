//! Rule-set store
//!
//! A rule-set document has the shape `{"meta": {...}, "ruleSets": [...]}` and
//! may be JSON or YAML. The default document ships inside the crate; callers
//! can point at their own file to override it. Lookups accept either a
//! rule-set id (`gpt-4-o1`) or a provider id (`openai`).
//!
//! Copyright (c) 2025 SSV Team
//! Licensed under the Apache-2.0 license

use crate::error::{RegistryError, RegistryResult};
use crate::format::Format;
use serde::{Deserialize, Serialize};
use ssv_core::RuleSet;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tracing::debug;

/// The rule-set document embedded at compile time
pub const BUNDLED_RULE_SETS: &str = include_str!("../data/schema_rule_sets.json");

const BUNDLED_ORIGIN: &str = "<bundled>";

/// Document-level metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RuleSetsMeta {
    pub version: String,
    pub last_updated: String,
    pub description: String,
    /// Provider id to documentation URL
    pub sources: BTreeMap<String, String>,
}

/// On-disk shape of a rule-set document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleSetDocument {
    #[serde(default)]
    pub meta: RuleSetsMeta,
    pub rule_sets: Vec<RuleSet>,
}

/// Loaded, checked collection of rule sets in document order
#[derive(Debug, Clone)]
pub struct RuleSetRegistry {
    meta: RuleSetsMeta,
    rule_sets: Vec<RuleSet>,
}

impl RuleSetRegistry {
    /// Load the embedded default document
    pub fn bundled() -> RegistryResult<Self> {
        Self::from_str(BUNDLED_RULE_SETS, Format::Json, BUNDLED_ORIGIN)
    }

    /// Load a document from a `.json`, `.yaml` or `.yml` file
    pub fn from_path(path: &Path) -> RegistryResult<Self> {
        let format = Format::from_path(path)?;
        let content =
            std::fs::read_to_string(path).map_err(|e| RegistryError::io(path, e))?;
        Self::from_str(&content, format, &path.display().to_string())
    }

    /// Load from `path` when given, otherwise the embedded document
    pub fn load(path: Option<&Path>) -> RegistryResult<Self> {
        match path {
            Some(path) => Self::from_path(path),
            None => Self::bundled(),
        }
    }

    /// Parse document text; `origin` is used in error messages
    pub fn from_str(content: &str, format: Format, origin: &str) -> RegistryResult<Self> {
        let document: RuleSetDocument = format.parse(content, origin)?;
        Self::from_document(document, origin)
    }

    /// Check and index a parsed document
    ///
    /// Fails when the document is empty, two rule sets share an id, or any
    /// rule set fails [`RuleSet::check`].
    pub fn from_document(document: RuleSetDocument, origin: &str) -> RegistryResult<Self> {
        if document.rule_sets.is_empty() {
            return Err(RegistryError::Empty {
                origin: origin.to_string(),
            });
        }

        let mut seen = HashSet::new();
        for rules in &document.rule_sets {
            if !seen.insert(rules.rule_set_id.as_str()) {
                return Err(RegistryError::DuplicateRuleSet {
                    id: rules.rule_set_id.clone(),
                    origin: origin.to_string(),
                });
            }
            rules.check().map_err(|source| RegistryError::InvalidRuleSet {
                id: rules.rule_set_id.clone(),
                source,
            })?;
        }

        debug!(
            origin,
            count = document.rule_sets.len(),
            version = %document.meta.version,
            "Loaded rule sets"
        );

        Ok(Self {
            meta: document.meta,
            rule_sets: document.rule_sets,
        })
    }

    pub fn meta(&self) -> &RuleSetsMeta {
        &self.meta
    }

    pub fn len(&self) -> usize {
        self.rule_sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rule_sets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RuleSet> {
        self.rule_sets.iter()
    }

    /// All rule-set ids in document order
    pub fn ids(&self) -> Vec<&str> {
        self.rule_sets
            .iter()
            .map(|r| r.rule_set_id.as_str())
            .collect()
    }

    /// Exact lookup by rule-set id
    pub fn get(&self, rule_set_id: &str) -> Option<&RuleSet> {
        self.rule_sets.iter().find(|r| r.rule_set_id == rule_set_id)
    }

    /// First rule set for a provider id
    pub fn by_provider(&self, provider_id: &str) -> Option<&RuleSet> {
        self.rule_sets.iter().find(|r| r.provider_id == provider_id)
    }

    /// Look up by rule-set id, falling back to provider id
    pub fn resolve(&self, key: &str) -> RegistryResult<&RuleSet> {
        self.get(key)
            .or_else(|| self.by_provider(key))
            .ok_or_else(|| RegistryError::UnknownRuleSet {
                id: key.to_string(),
                available: self.ids().join(", "),
            })
    }

    /// Resolve each key in order, dropping repeats; no keys selects every rule set
    pub fn select<S: AsRef<str>>(&self, keys: &[S]) -> RegistryResult<Vec<&RuleSet>> {
        if keys.is_empty() {
            return Ok(self.rule_sets.iter().collect());
        }

        let mut selected: Vec<&RuleSet> = Vec::with_capacity(keys.len());
        for key in keys {
            let rules = self.resolve(key.as_ref())?;
            if !selected.iter().any(|r| r.rule_set_id == rules.rule_set_id) {
                selected.push(rules);
            }
        }
        Ok(selected)
    }
}
