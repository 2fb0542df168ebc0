//! Validate command handler

use super::{effective_selection, load_registry, read_schema};
use crate::cli::ValidateArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use ssv_core::CompatibilityReport;
use ssv_schemas::{check_structure, StructuralCheck};
use tracing::{debug, info, instrument, warn};

/// Handle the validate command
#[instrument(skip(config, output), fields(file = %args.schema.display()))]
pub async fn handle_validate(
    args: ValidateArgs,
    config: &Config,
    output: &mut OutputWriter,
) -> Result<()> {
    let _timer = Timer::with_details("validate_command", &format!("file: {}", args.schema.display()));
    info!("Starting validation");

    let raw = read_schema(&args.schema)?;
    debug!("Schema read, {} bytes", raw.len());

    let schema: serde_json::Value = serde_json::from_str(&raw).map_err(|_| Error::InvalidFormat {
        path: args.schema.clone(),
        expected: "a JSON Schema document".to_string(),
    })?;

    let registry = load_registry(config)?;
    let selection = effective_selection(args.selection(), config);
    let rule_sets = registry.select(&selection)?;
    debug!(rule_sets = rule_sets.len(), "Selected rule sets");

    output.info(&format!(
        "Validating {} against {} rule set(s)",
        args.schema.display(),
        rule_sets.len()
    ))?;

    let structure = check_structure(&schema);
    if !structure.valid {
        warn!(errors = ?structure.errors, "Schema failed the meta-schema check");
        for error in &structure.errors {
            output.warning(&format!("Not a valid JSON Schema: {}", error))?;
        }
    }

    let mut report = CompatibilityReport::check(&raw, rule_sets.iter().copied());
    if !structure.valid {
        report.summary = structural_summary(&structure, &report);
    }
    output.report(&report)?;

    if report.all_valid() {
        info!("Schema is compatible with every selected rule set");
        return Ok(());
    }

    let failing = report.results.iter().filter(|r| !r.valid).count();
    info!(failing, errors = report.error_count(), "Schema is incompatible");
    Err(Error::ValidationFailed {
        rule_sets: failing,
        errors: report.error_count(),
    })
}

/// Summary for a document that failed the meta-schema check
///
/// Provider rules only inspect object schemas, so a clean provider result
/// says nothing about such a document.
fn structural_summary(structure: &StructuralCheck, report: &CompatibilityReport) -> String {
    let errors = structure.errors.len();
    if report.all_valid() {
        format!(
            "Not a valid JSON Schema ({} structural error(s)); no provider rule violations found for {} rule set(s).",
            errors,
            report.results.len()
        )
    } else {
        format!("Not a valid JSON Schema ({} structural error(s)). {}", errors, report.summary)
    }
}
