//! Rule-sets command handler

use super::load_registry;
use crate::cli::RuleSetsArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::OutputWriter;
use ssv_core::RuleSet;
use tracing::debug;

/// Handle the rule-sets command
pub async fn handle_rule_sets(
    args: RuleSetsArgs,
    config: &Config,
    output: &mut OutputWriter,
) -> Result<()> {
    let registry = load_registry(config)?;
    let rule_sets: Vec<&RuleSet> = match &args.provider {
        Some(provider) => registry.iter().filter(|r| &r.provider_id == provider).collect(),
        None => registry.iter().collect(),
    };
    debug!(count = rule_sets.len(), "Listing rule sets");

    if !output.is_human() {
        return output.data(&rule_sets);
    }

    if rule_sets.is_empty() {
        return output.info("No rule sets match");
    }

    let meta = registry.meta();
    if !meta.version.is_empty() {
        output.info(&format!("Rule-set document version {} ({})", meta.version, meta.last_updated))?;
    }

    if args.detailed {
        for rules in rule_sets {
            write_detailed(output, rules)?;
        }
        return Ok(());
    }

    let rows = rule_sets
        .iter()
        .map(|r| {
            vec![
                r.rule_set_id.clone(),
                r.provider_id.clone(),
                r.display_name.clone(),
                r.models.join(", "),
            ]
        })
        .collect();
    output.table(&["ID", "Provider", "Name", "Models"], rows)
}

fn write_detailed(output: &mut OutputWriter, rules: &RuleSet) -> Result<()> {
    output.section(&format!("{} ({})", rules.display_name, rules.rule_set_id))?;

    let yes_no = |flag: bool| if flag { "yes" } else { "no" };
    let additional = if rules.additional_properties_must_be_false {
        "must be false"
    } else if rules.additional_properties_false_recommended {
        "false recommended"
    } else {
        "unrestricted"
    };
    let limit = |value: Option<u64>| value.map_or_else(|| "none".to_string(), |v| v.to_string());

    let mut lines = vec![
        format!("Provider: {} ({})", rules.provider, rules.provider_id),
        format!("Root type: {}", rules.root_type.describe()),
        format!("Root anyOf allowed: {}", yes_no(rules.root_any_of_allowed)),
        format!("All fields required: {}", yes_no(rules.all_fields_required)),
        format!("additionalProperties: {}", additional),
        format!("Composition: {}", rules.composition.supported.join(", ")),
        format!("String formats: {}", rules.supported_string_formats.join(", ")),
        format!(
            "Limits: {} properties, depth {}, {} name/enum chars, {} enum values",
            limit(rules.size_limits.max_properties),
            limit(rules.size_limits.max_nesting_depth),
            limit(rules.size_limits.max_string_length_names_enums),
            limit(rules.size_limits.max_enum_values)
        ),
    ];
    if !rules.models.is_empty() {
        lines.push(format!("Models: {}", rules.models.join(", ")));
    }
    if let Some(url) = &rules.doc_url {
        lines.push(format!("Docs: {}", url));
    }
    for line in lines {
        output.writeln(&line)?;
    }

    output.writeln("Types:")?;
    for supported in &rules.supported_types {
        output.writeln(&format!(
            "  {}: {}",
            supported.type_name,
            supported.supported_keywords.join(", ")
        ))?;
    }

    for tip in &rules.tips {
        output.writeln(&format!("  • {}", tip))?;
    }
    Ok(())
}
