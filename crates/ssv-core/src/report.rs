//! Cross-provider compatibility report
//!
//! Runs the validator for several rule sets and groups the markers by
//! severity, with a one-line summary of which providers accept the schema.
//!
//! Copyright (c) 2025 SSV Team
//! Licensed under the Apache-2.0 license

use crate::rule_set::RuleSet;
use crate::types::{IssueKind, Marker, Severity};
use crate::validator;
use serde::{Deserialize, Serialize};

/// 1-indexed start position of a marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

/// One marker as it appears in a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportEntry {
    pub message: String,
    pub severity: Severity,
    pub kind: IssueKind,
    pub pointer: String,
    pub location: Location,
}

impl From<&Marker> for ReportEntry {
    fn from(marker: &Marker) -> Self {
        Self {
            message: marker.message.clone(),
            severity: marker.severity,
            kind: marker.kind,
            pointer: marker.pointer.clone(),
            location: Location {
                line: marker.start_line,
                column: marker.start_column,
            },
        }
    }
}

/// Validation outcome for one rule set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderResult {
    pub provider: String,
    pub rule_set_id: String,
    pub rule_set_name: String,
    pub valid: bool,
    pub errors: Vec<ReportEntry>,
    pub warnings: Vec<ReportEntry>,
    pub infos: Vec<ReportEntry>,
}

impl ProviderResult {
    pub fn from_markers(rules: &RuleSet, markers: &[Marker]) -> Self {
        let with = |severity: Severity| -> Vec<ReportEntry> {
            markers
                .iter()
                .filter(|m| m.severity == severity)
                .map(ReportEntry::from)
                .collect()
        };
        let errors = with(Severity::Error);
        Self {
            provider: rules.provider_id.clone(),
            rule_set_id: rules.rule_set_id.clone(),
            rule_set_name: rules.display_name.clone(),
            valid: errors.is_empty(),
            errors,
            warnings: with(Severity::Warning),
            infos: with(Severity::Info),
        }
    }
}

/// Per-provider results plus a summary line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibilityReport {
    pub results: Vec<ProviderResult>,
    pub summary: String,
}

impl CompatibilityReport {
    /// Validate `raw` against each rule set, in the order given
    pub fn check<'r, I>(raw: &str, rule_sets: I) -> Self
    where
        I: IntoIterator<Item = &'r RuleSet>,
    {
        let results = rule_sets
            .into_iter()
            .map(|rules| ProviderResult::from_markers(rules, &validator::validate(raw, rules)))
            .collect();
        Self::from_results(results)
    }

    pub fn from_results(results: Vec<ProviderResult>) -> Self {
        let summary = summarize(&results);
        Self { results, summary }
    }

    pub fn all_valid(&self) -> bool {
        self.results.iter().all(|r| r.valid)
    }

    pub fn error_count(&self) -> usize {
        self.results.iter().map(|r| r.errors.len()).sum()
    }
}

fn summarize(results: &[ProviderResult]) -> String {
    let total = results.len();
    let (valid, invalid): (Vec<&ProviderResult>, Vec<&ProviderResult>) =
        results.iter().partition(|r| r.valid);

    if valid.len() == total {
        format!("Valid for all {} providers.", total)
    } else if invalid.len() == total {
        format!("Invalid for all {} providers.", total)
    } else {
        let names = |group: &[&ProviderResult]| -> String {
            group
                .iter()
                .map(|r| r.provider.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        };
        format!(
            "Valid for {}/{} providers ({}). Issues found for: {}.",
            valid.len(),
            total,
            names(&valid),
            names(&invalid)
        )
    }
}
