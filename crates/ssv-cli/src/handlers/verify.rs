//! Verify command handler
//!
//! Runs every `*.json` document under the given paths through the structural
//! pre-check and each selected rule set, optionally fixing failures, and
//! compares the outcome with the expectation a document declares in its
//! top-level `_meta` object.

use super::{effective_selection, load_registry};
use crate::cli::VerifyArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use anyhow::Context;
use chrono::Utc;
use regex::RegexBuilder;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use ssv_core::{fix, validate, ReportEntry, RuleSet};
use ssv_schemas::{check_structure, RuleSetRegistry, StructuralCheck};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;

/// Outcome a test document declares for itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Expectation {
    Valid,
    Invalid,
}

/// The `_meta` object of a test document
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct DocumentMeta {
    expected: Option<Expectation>,
    expect_error_pattern: Option<String>,
    /// Restricts the expectation to one rule set or provider
    rule_set_id: Option<String>,
}

impl DocumentMeta {
    fn applies_to(&self, rules: &RuleSet) -> bool {
        self.rule_set_id
            .as_deref()
            .map_or(true, |key| key == rules.rule_set_id || key == rules.provider_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpectationCheck {
    pub expected: Expectation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    pub matched: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FixOutcome {
    pub applied: usize,
    pub lossy: usize,
    pub unresolved: usize,
    pub post_fix_errors: usize,
    pub succeeded: bool,
}

/// One document checked against one rule set
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleSetOutcome {
    pub rule_set_id: String,
    pub provider: String,
    pub valid: bool,
    pub errors: Vec<ReportEntry>,
    pub warnings: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expectation: Option<ExpectationCheck>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix: Option<FixOutcome>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentReport {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structural: Option<StructuralCheck>,
    pub results: Vec<RuleSetOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DocumentReport {
    fn failed(path: &Path, error: &anyhow::Error) -> Self {
        Self {
            path: path.display().to_string(),
            structural: None,
            results: Vec::new(),
            error: Some(format!("{:#}", error)),
        }
    }

    fn mismatches(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.expectation.as_ref().is_some_and(|e| !e.matched))
            .count()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifySummary {
    pub documents: usize,
    pub tests: usize,
    pub passed: usize,
    pub failed: usize,
    pub expectation_mismatches: usize,
    pub fix_attempted: usize,
    pub fix_succeeded: usize,
    pub document_errors: usize,
}

impl VerifySummary {
    fn from_documents(documents: &[DocumentReport]) -> Self {
        let mut summary = Self {
            documents: documents.len(),
            ..Self::default()
        };
        for document in documents {
            if document.error.is_some() {
                summary.document_errors += 1;
            }
            summary.expectation_mismatches += document.mismatches();
            for result in &document.results {
                summary.tests += 1;
                if result.valid {
                    summary.passed += 1;
                } else {
                    summary.failed += 1;
                }
                if let Some(fix) = &result.fix {
                    summary.fix_attempted += 1;
                    if fix.succeeded {
                        summary.fix_succeeded += 1;
                    }
                }
            }
        }
        summary
    }
}

/// Full verification run, as written to `--report`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyReport {
    pub generated_at: String,
    pub rule_set_ids: Vec<String>,
    pub summary: VerifySummary,
    pub documents: Vec<DocumentReport>,
}

/// Handle the verify command
#[instrument(skip(config, output), fields(paths = args.paths.len()))]
pub async fn handle_verify(args: VerifyArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let timer = Timer::new("verify_command");
    info!("Starting verification");

    let files = collect_documents(&args.paths)?;
    let registry = Arc::new(load_registry(config)?);
    let selection = effective_selection(args.rule_set_ids.clone(), config);
    let rule_set_ids: Vec<String> = registry
        .select(&selection)?
        .into_iter()
        .map(|r| r.rule_set_id.clone())
        .collect();
    let rule_set_ids = Arc::new(rule_set_ids);
    let fix_enabled = !args.no_fix && config.verify.fix;

    output.info(&format!(
        "Verifying {} document(s) against {}",
        files.len(),
        rule_set_ids.join(", ")
    ))?;

    let handles: Vec<_> = files
        .iter()
        .cloned()
        .map(|path| {
            let registry = Arc::clone(&registry);
            let ids = Arc::clone(&rule_set_ids);
            tokio::task::spawn_blocking(move || {
                verify_document(&path, &registry, &ids, fix_enabled)
                    .unwrap_or_else(|e| DocumentReport::failed(&path, &e))
            })
        })
        .collect();

    let progress = output.progress_bar(files.len() as u64, "verifying");
    let mut documents = Vec::with_capacity(handles.len());
    for handle in handles {
        let document = handle.await?;
        if let Some(pb) = &progress {
            pb.inc(1);
        }
        documents.push(document);
    }
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let report = VerifyReport {
        generated_at: Utc::now().to_rfc3339(),
        rule_set_ids: (*rule_set_ids).clone(),
        summary: VerifySummary::from_documents(&documents),
        documents,
    };

    if let Some(path) = report_path(&args, config) {
        write_report(&path, &report)?;
        info!(path = %path.display(), "Wrote verification report");
        output.info(&format!("Report written to {}", path.display()))?;
    }

    if output.is_human() {
        write_human(output, &report)?;
    } else {
        output.data(&report)?;
    }

    let mismatches = report.summary.expectation_mismatches;
    info!(
        documents = report.summary.documents,
        mismatches,
        elapsed_ms = timer.elapsed().as_millis() as u64,
        "Verification finished"
    );
    if mismatches > 0 {
        return Err(Error::ExpectationMismatch { count: mismatches });
    }
    Ok(())
}

/// Expand paths into a list of `*.json` files, sorted within each directory
fn collect_documents(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if !path.exists() {
            return Err(Error::FileNotFound { path: path.clone() });
        }
        if path.is_file() {
            files.push(path.clone());
            continue;
        }

        let mut found: Vec<PathBuf> = WalkDir::new(path)
            .follow_links(true)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable entry");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("json"))
            .collect();
        found.sort();
        debug!(dir = %path.display(), count = found.len(), "Collected documents");
        files.extend(found);
    }
    Ok(files)
}

/// Check one document against every selected rule set
fn verify_document(
    path: &Path,
    registry: &RuleSetRegistry,
    rule_set_ids: &[String],
    fix_enabled: bool,
) -> anyhow::Result<DocumentReport> {
    let content = fs::read_to_string(path).with_context(|| format!("Reading {}", path.display()))?;
    let mut schema: Value =
        serde_json::from_str(&content).with_context(|| format!("Parsing {}", path.display()))?;

    let meta = match schema.as_object_mut().and_then(|map| map.shift_remove("_meta")) {
        Some(meta) => serde_json::from_value::<DocumentMeta>(meta).context("Invalid _meta object")?,
        None => DocumentMeta::default(),
    };
    let pattern = meta
        .expect_error_pattern
        .as_deref()
        .map(|p| RegexBuilder::new(p).case_insensitive(true).build())
        .transpose()
        .context("Invalid expectErrorPattern")?;

    let raw = serde_json::to_string_pretty(&schema)?;
    let structural = check_structure(&schema);

    let mut results = Vec::with_capacity(rule_set_ids.len());
    for rules in registry.select(rule_set_ids)? {
        let markers = validate(&raw, rules);
        let errors: Vec<ReportEntry> = markers
            .iter()
            .filter(|m| m.is_error())
            .map(ReportEntry::from)
            .collect();
        let valid = errors.is_empty();

        let expectation = meta
            .expected
            .filter(|_| meta.applies_to(rules))
            .map(|expected| {
                let messages = errors
                    .iter()
                    .map(|e| e.message.as_str())
                    .collect::<Vec<_>>()
                    .join("\n");
                check_expectation(expected, valid, pattern.as_ref(), &messages, meta.expect_error_pattern.clone())
            });

        let fix = (!valid && fix_enabled)
            .then(|| fix_and_revalidate(&schema, rules))
            .transpose()?;

        results.push(RuleSetOutcome {
            rule_set_id: rules.rule_set_id.clone(),
            provider: rules.provider_id.clone(),
            valid,
            warnings: markers.len() - errors.len(),
            errors,
            expectation,
            fix,
        });
    }

    Ok(DocumentReport {
        path: path.display().to_string(),
        structural: Some(structural),
        results,
        error: None,
    })
}

fn check_expectation(
    expected: Expectation,
    valid: bool,
    pattern: Option<&regex::Regex>,
    messages: &str,
    pattern_text: Option<String>,
) -> ExpectationCheck {
    let (matched, detail) = match expected {
        Expectation::Valid if valid => (true, None),
        Expectation::Valid => (false, Some("expected valid, got errors".to_string())),
        Expectation::Invalid if valid => (false, Some("expected errors, got none".to_string())),
        Expectation::Invalid => match pattern {
            Some(re) if !re.is_match(messages) => {
                (false, Some(format!("no error matched /{}/", re.as_str())))
            }
            _ => (true, None),
        },
    };
    ExpectationCheck {
        expected,
        pattern: pattern_text,
        matched,
        detail,
    }
}

fn fix_and_revalidate(schema: &Value, rules: &RuleSet) -> anyhow::Result<FixOutcome> {
    let result = fix(schema, rules);
    let fixed_text = serde_json::to_string_pretty(&result.fixed_schema)?;
    let post_fix_errors = validate(&fixed_text, rules)
        .iter()
        .filter(|m| m.is_error())
        .count();
    Ok(FixOutcome {
        applied: result.applied_fixes.len(),
        lossy: result.lossy_fixes().count(),
        unresolved: result.unresolved_errors.len(),
        post_fix_errors,
        succeeded: post_fix_errors == 0,
    })
}

fn report_path(args: &VerifyArgs, config: &Config) -> Option<PathBuf> {
    args.report.clone().or_else(|| {
        config.verify.report_dir.as_ref().map(|dir| {
            dir.join(format!("verify-{}.json", Utc::now().format("%Y%m%dT%H%M%SZ")))
        })
    })
}

fn write_report(path: &Path, report: &VerifyReport) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(report)?)?;
    Ok(())
}

fn write_human(output: &mut OutputWriter, report: &VerifyReport) -> Result<()> {
    for document in &report.documents {
        if let Some(error) = &document.error {
            output.error(&format!("✗ {}: {}", document.path, error))?;
            continue;
        }

        let failing: Vec<&RuleSetOutcome> = document.results.iter().filter(|r| !r.valid).collect();
        if failing.is_empty() && document.mismatches() == 0 {
            output.success(&format!("✓ {}", document.path))?;
        } else {
            output.writeln(&format!("✗ {}", document.path))?;
        }

        if let Some(structural) = document.structural.as_ref().filter(|s| !s.valid) {
            for error in &structural.errors {
                output.warning(&format!("    not a valid JSON Schema: {}", error))?;
            }
        }

        for result in &document.results {
            if !result.valid {
                output.writeln(&format!(
                    "    {}: {} error(s)",
                    result.rule_set_id,
                    result.errors.len()
                ))?;
                for entry in &result.errors {
                    output.writeln(&format!(
                        "      {}:{} {}",
                        entry.location.line, entry.location.column, entry.message
                    ))?;
                }
            }
            if let Some(fix) = &result.fix {
                let status = if fix.succeeded { "fixed" } else { "not fixed" };
                output.writeln(&format!(
                    "    {}: {} ({} fix(es), {} unresolved, {} error(s) after fixing)",
                    result.rule_set_id, status, fix.applied, fix.unresolved, fix.post_fix_errors
                ))?;
            }
            if let Some(check) = result.expectation.as_ref().filter(|c| !c.matched) {
                output.error(&format!(
                    "    {}: expectation mismatch: {}",
                    result.rule_set_id,
                    check.detail.as_deref().unwrap_or("unexpected result")
                ))?;
            }
        }
    }

    let s = &report.summary;
    output.section("Summary")?;
    output.table(
        &["Metric", "Count"],
        vec![
            vec!["Documents".to_string(), s.documents.to_string()],
            vec!["Tests".to_string(), s.tests.to_string()],
            vec!["Passed".to_string(), s.passed.to_string()],
            vec!["Failed".to_string(), s.failed.to_string()],
            vec!["Expectation mismatches".to_string(), s.expectation_mismatches.to_string()],
            vec!["Fix attempted".to_string(), s.fix_attempted.to_string()],
            vec!["Fix succeeded".to_string(), s.fix_succeeded.to_string()],
            vec!["Document errors".to_string(), s.document_errors.to_string()],
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn ids(registry: &RuleSetRegistry) -> Vec<String> {
        registry.ids().into_iter().map(String::from).collect()
    }

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_collect_documents_sorted_and_filtered() {
        let dir = tempdir().unwrap();
        write(dir.path(), "b.json", "{}");
        write(dir.path(), "a.json", "{}");
        write(dir.path(), "nested/c.json", "{}");
        write(dir.path(), "notes.txt", "");

        let files = collect_documents(&[dir.path().to_path_buf()]).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().display().to_string())
            .collect();
        assert_eq!(names, vec!["a.json", "b.json", "nested/c.json"]);
    }

    #[test]
    fn test_collect_documents_missing_path() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            collect_documents(&[dir.path().join("absent")]),
            Err(Error::FileNotFound { .. })
        ));
    }

    #[test]
    fn test_meta_is_stripped_and_expectation_checked() {
        let dir = tempdir().unwrap();
        let path = write(
            dir.path(),
            "open.json",
            r#"{
                "_meta": {"expected": "invalid", "expectErrorPattern": "REQUIRED", "ruleSetId": "openai"},
                "type": "object",
                "properties": {"a": {"type": "string"}},
                "additionalProperties": false
            }"#,
        );
        let registry = RuleSetRegistry::bundled().unwrap();

        let report = verify_document(&path, &registry, &ids(&registry), true).unwrap();
        let openai = report.results.iter().find(|r| r.provider == "openai").unwrap();

        assert!(!openai.valid);
        assert_eq!(openai.expectation.as_ref().map(|e| e.matched), Some(true));
        assert!(openai.fix.as_ref().unwrap().succeeded);
        assert!(report.results.iter().filter(|r| r.provider != "openai").all(|r| r.expectation.is_none()));
        assert!(openai.errors.iter().all(|e| !e.message.contains("_meta")));
    }

    #[test]
    fn test_expectation_mismatch_detected() {
        let dir = tempdir().unwrap();
        let path = write(
            dir.path(),
            "bad.json",
            r#"{"_meta": {"expected": "valid"}, "type": "object", "properties": {"a": {"type": "string"}}}"#,
        );
        let registry = RuleSetRegistry::bundled().unwrap();

        let report = verify_document(&path, &registry, &["gpt-4-o1".to_string()], false).unwrap();
        assert_eq!(report.mismatches(), 1);
        assert!(report.results[0].fix.is_none());
    }

    #[test]
    fn test_unreadable_document_is_reported() {
        let dir = tempdir().unwrap();
        let path = write(dir.path(), "broken.json", "{not json");
        let registry = RuleSetRegistry::bundled().unwrap();

        let err = verify_document(&path, &registry, &ids(&registry), true).unwrap_err();
        let report = DocumentReport::failed(&path, &err);
        assert!(report.error.unwrap().starts_with("Parsing "));
    }

    #[test]
    fn test_summary_counts() {
        let outcome = |valid: bool, fixed: Option<bool>, matched: Option<bool>| RuleSetOutcome {
            rule_set_id: "r".to_string(),
            provider: "p".to_string(),
            valid,
            errors: Vec::new(),
            warnings: 0,
            expectation: matched.map(|matched| ExpectationCheck {
                expected: Expectation::Valid,
                pattern: None,
                matched,
                detail: None,
            }),
            fix: fixed.map(|succeeded| FixOutcome {
                applied: 1,
                lossy: 0,
                unresolved: 0,
                post_fix_errors: usize::from(!succeeded),
                succeeded,
            }),
        };
        let documents = vec![
            DocumentReport {
                path: "a.json".to_string(),
                structural: None,
                results: vec![outcome(true, None, Some(true)), outcome(false, Some(true), Some(false))],
                error: None,
            },
            DocumentReport::failed(Path::new("b.json"), &anyhow::anyhow!("boom")),
        ];

        assert_eq!(
            VerifySummary::from_documents(&documents),
            VerifySummary {
                documents: 2,
                tests: 2,
                passed: 1,
                failed: 1,
                expectation_mismatches: 1,
                fix_attempted: 1,
                fix_succeeded: 1,
                document_errors: 1,
            }
        );
    }

    #[test]
    fn test_invalid_pattern_in_meta() {
        let dir = tempdir().unwrap();
        let path = write(
            dir.path(),
            "p.json",
            r#"{"_meta": {"expected": "invalid", "expectErrorPattern": "("}, "type": "object"}"#,
        );
        let registry = RuleSetRegistry::bundled().unwrap();
        assert!(verify_document(&path, &registry, &ids(&registry), false).is_err());
    }
}
