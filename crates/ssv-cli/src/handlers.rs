//! Command handlers for CLI subcommands
//!
//! This module contains the implementation logic for each CLI subcommand.

mod completions;
mod config;
mod fix;
mod rule_sets;
mod validate;
mod verify;

pub use completions::handle_completions;
pub use config::handle_config;
pub use fix::handle_fix;
pub use rule_sets::handle_rule_sets;
pub use validate::handle_validate;
pub use verify::handle_verify;

use crate::config::Config;
use crate::error::{Error, Result};
use ssv_schemas::RuleSetRegistry;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Read a schema file as JSON text
///
/// YAML input is converted to pretty-printed JSON so that marker positions
/// refer to the text the validator actually sees.
pub(crate) fn read_schema(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let content = fs::read_to_string(path)?;

    let is_yaml = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.eq_ignore_ascii_case("yaml") || s.eq_ignore_ascii_case("yml"))
        .unwrap_or(false);

    if !is_yaml {
        return Ok(content);
    }

    let value: serde_json::Value = serde_yaml::from_str(&content).map_err(|_| Error::InvalidFormat {
        path: path.to_path_buf(),
        expected: "YAML".to_string(),
    })?;
    debug!(path = %path.display(), "Converted YAML schema to JSON");
    Ok(serde_json::to_string_pretty(&value)?)
}

/// Load the configured rule-set document, or the bundled one
pub(crate) fn load_registry(config: &Config) -> Result<RuleSetRegistry> {
    Ok(RuleSetRegistry::load(config.rule_sets_file.as_deref())?)
}

/// Command-line selection, falling back to the configured default providers
pub(crate) fn effective_selection(selection: Vec<String>, config: &Config) -> Vec<String> {
    if selection.is_empty() {
        config.default_providers.clone()
    } else {
        selection
    }
}
