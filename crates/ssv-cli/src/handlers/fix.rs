//! Fix command handler

use super::{load_registry, read_schema};
use crate::cli::FixArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use colored::Colorize;
use serde::Serialize;
use similar::TextDiff;
use ssv_core::{fix_str, validate, FixResult, ReportEntry};
use std::fs;
use tracing::{debug, info, instrument};

/// Machine-readable result of the fix command
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FixOutput<'a> {
    rule_set_id: &'a str,
    provider: &'a str,
    #[serde(flatten)]
    result: &'a FixResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    residual: Option<Vec<ReportEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    saved_to: Option<String>,
}

/// Handle the fix command
#[instrument(skip(config, output), fields(file = %args.schema.display(), target = args.target()))]
pub async fn handle_fix(args: FixArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let _timer = Timer::with_details("fix_command", &format!("file: {}", args.schema.display()));
    info!("Starting fix");

    let raw = read_schema(&args.schema)?;
    let registry = load_registry(config)?;
    let rules = registry.resolve(args.target())?;

    output.info(&format!(
        "Fixing {} for {} ({})",
        args.schema.display(),
        rules.rule_set_id,
        rules.provider_id
    ))?;

    let result = fix_str(&raw, rules)?;
    debug!(
        applied = result.applied_fixes.len(),
        unresolved = result.unresolved_errors.len(),
        lossy = result.lossy_fixes().count(),
        "Fixer finished"
    );

    let fixed_text = serde_json::to_string_pretty(&result.fixed_schema)?;

    let residual = if args.no_revalidate {
        None
    } else {
        let markers = validate(&fixed_text, rules);
        Some(markers)
    };
    let residual_errors = residual
        .as_ref()
        .map(|markers| markers.iter().filter(|m| m.is_error()).count())
        .unwrap_or(0);

    if let Some(path) = &args.save_to {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, format!("{}\n", fixed_text))?;
        info!(path = %path.display(), "Saved fixed schema");
    }

    if output.is_human() {
        output.section("Fixes")?;
        output.fix_result(&result)?;

        if args.diff {
            output.section("Diff")?;
            let original: serde_json::Value = serde_json::from_str(&raw)?;
            let original_text = serde_json::to_string_pretty(&original)?;
            write_diff(output, &original_text, &fixed_text)?;
        } else {
            output.section("Fixed Schema")?;
            output.writeln(&fixed_text)?;
        }

        if let Some(markers) = &residual {
            output.section("Re-validation")?;
            if markers.is_empty() {
                output.success(&format!("✓ Fixed schema is valid for {}", rules.rule_set_id))?;
            } else {
                output.markers(markers)?;
            }
        }

        if let Some(path) = &args.save_to {
            output.success(&format!("✓ Saved fixed schema to {}", path.display()))?;
        }
    } else {
        output.data(&FixOutput {
            rule_set_id: &rules.rule_set_id,
            provider: &rules.provider_id,
            result: &result,
            residual: residual
                .as_ref()
                .map(|markers| markers.iter().map(ReportEntry::from).collect()),
            saved_to: args.save_to.as_ref().map(|p| p.display().to_string()),
        })?;
    }

    if result.is_fully_resolved() && residual_errors == 0 {
        return Ok(());
    }
    Err(Error::FixIncomplete {
        unresolved: result.unresolved_errors.len(),
        residual: residual_errors,
    })
}

/// Print a unified line diff between two texts
fn write_diff(output: &mut OutputWriter, original: &str, fixed: &str) -> Result<()> {
    let diff = TextDiff::from_lines(original, fixed);
    if diff.ratio() >= 1.0 {
        return output.info("No changes");
    }

    let rendered = diff
        .unified_diff()
        .context_radius(3)
        .header("original", "fixed")
        .to_string();

    for line in rendered.lines() {
        if line.starts_with('+') && !line.starts_with("+++") {
            output.writeln(&line.green().to_string())?;
        } else if line.starts_with('-') && !line.starts_with("---") {
            output.writeln(&line.red().to_string())?;
        } else {
            output.writeln(line)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use ssv_schemas::RuleSetRegistry;

    #[test]
    fn test_fix_output_flattens_result() {
        let registry = RuleSetRegistry::bundled().unwrap();
        let rules = registry.resolve("openai").unwrap();
        let result = fix_str(r#"{"type":"object","properties":{"a":{"type":"string"}}}"#, rules).unwrap();

        let out = FixOutput {
            rule_set_id: &rules.rule_set_id,
            provider: &rules.provider_id,
            result: &result,
            residual: Some(Vec::new()),
            saved_to: None,
        };
        let value = serde_json::to_value(&out).unwrap();

        assert_eq!(value["ruleSetId"], "gpt-4-o1");
        assert_eq!(value["fixedSchema"]["additionalProperties"], false);
        assert_eq!(value["fixedSchema"]["required"], serde_json::json!(["a"]));
        assert!(value["appliedFixes"].as_array().unwrap().len() >= 2);
        assert!(value.get("savedTo").is_none());
    }

    #[test]
    fn test_format_is_serializable_in_every_machine_format() {
        use crate::output::OutputFormatter;
        let result = FixResult::unchanged(serde_json::json!({"type": "object"}));
        let out = FixOutput {
            rule_set_id: "r",
            provider: "p",
            result: &result,
            residual: None,
            saved_to: None,
        };
        for format in [OutputFormat::Json, OutputFormat::Yaml, OutputFormat::JsonPretty] {
            assert!(format.format(&out).is_ok());
        }
    }
}
