//! Configuration management for the CLI
//!
//! This module handles loading configuration from:
//! - Default values
//! - Configuration files (YAML/JSON/TOML)
//! - Command-line arguments, which take precedence over the file

use crate::error::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Providers or rule-set ids used when a command selects none
    pub default_providers: Vec<String>,

    /// Rule-set document replacing the bundled one
    pub rule_sets_file: Option<PathBuf>,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingSettings,

    /// Verification harness settings
    pub verify: VerifyConfig,
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format (human, json, json-pretty, yaml)
    pub format: String,

    /// Use colored output by default
    pub color: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level used when no -v flag is given (trace, debug, info, warn, error)
    pub level: Option<String>,

    /// Log format (compact, full, json)
    pub format: Option<String>,

    /// Log file path
    pub file: Option<PathBuf>,
}

/// Verification harness configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifyConfig {
    /// Run the fixer on documents that fail validation
    pub fix: bool,

    /// Directory receiving a timestamped JSON report after each run
    pub report_dir: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "human".to_string(),
            color: true,
        }
    }
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            fix: true,
            report_dir: None,
        }
    }
}

/// Config file syntax, chosen by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Syntax {
    Yaml,
    Json,
    Toml,
}

impl Syntax {
    fn of(path: &Path) -> Result<Self> {
        match path.extension().and_then(|s| s.to_str()) {
            Some("yaml" | "yml") => Ok(Syntax::Yaml),
            Some("json") => Ok(Syntax::Json),
            Some("toml") => Ok(Syntax::Toml),
            _ => Err(Error::InvalidFormat {
                path: path.to_path_buf(),
                expected: "a .yaml, .yml, .json or .toml config file".to_string(),
            }),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;

        let config = match Syntax::of(path)? {
            Syntax::Yaml => serde_yaml::from_str(&content)
                .with_context(|| format!("Parsing {}", path.display()))?,
            Syntax::Json => serde_json::from_str(&content)
                .with_context(|| format!("Parsing {}", path.display()))?,
            Syntax::Toml => toml::from_str(&content).map_err(|e| {
                Error::config(format!("Failed to parse {}: {}", path.display(), e))
            })?,
        };

        debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Load configuration from the first existing default location
    pub fn load() -> Result<Self> {
        for path in Self::default_config_paths() {
            if path.exists() {
                match Self::from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "Failed to load config, skipping");
                    }
                }
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file or default locations
    pub fn load_with_file(file: Option<&Path>) -> Result<Self> {
        if let Some(path) = file {
            Self::from_file(path)
        } else {
            Self::load()
        }
    }

    /// Configuration file paths checked in order
    pub fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // Current directory
        for stem in [".ssv", "ssv"] {
            for ext in ["yaml", "json", "toml"] {
                paths.push(PathBuf::from(format!("{}.{}", stem, ext)));
            }
        }

        // User config directory
        if let Some(config_dir) = dirs::config_dir() {
            let ssv_dir = config_dir.join("ssv");
            for ext in ["yaml", "json", "toml"] {
                paths.push(ssv_dir.join(format!("config.{}", ext)));
            }
        }

        // Home directory
        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".ssv.yaml"));
            paths.push(home_dir.join(".ssv.json"));
        }

        paths
    }

    /// Apply command-line overrides
    pub fn with_rule_sets_file(mut self, path: Option<PathBuf>) -> Self {
        if path.is_some() {
            self.rule_sets_file = path;
        }
        self
    }

    /// Save configuration to a file, format chosen by extension
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = match Syntax::of(path)? {
            Syntax::Yaml => serde_yaml::to_string(self)?,
            Syntax::Json => serde_json::to_string_pretty(self)?,
            Syntax::Toml => toml::to_string_pretty(self)
                .map_err(|e| Error::config(format!("Failed to serialize as TOML: {}", e)))?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.default_providers.is_empty());
        assert_eq!(config.output.format, "human");
        assert!(config.verify.fix);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ssv.yaml");
        std::fs::write(&path, "default_providers: [openai]\nverify:\n  fix: false\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.default_providers, vec!["openai"]);
        assert!(!config.verify.fix);
        assert_eq!(config.output, OutputConfig::default());
    }

    #[test]
    fn test_round_trip_each_syntax() {
        let dir = tempdir().unwrap();
        let mut config = Config::default();
        config.default_providers = vec!["gemini".to_string()];
        config.logging.level = Some("debug".to_string());
        config.verify.report_dir = Some(PathBuf::from("reports"));

        for name in ["c.yaml", "c.json", "c.toml"] {
            let path = dir.path().join(name);
            config.save(&path).unwrap();
            assert_eq!(Config::from_file(&path).unwrap(), config, "{}", name);
        }
    }

    #[test]
    fn test_unknown_extension_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ssv.ini");
        std::fs::write(&path, "").unwrap();
        assert!(matches!(
            Config::from_file(&path),
            Err(Error::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_missing_explicit_file() {
        let dir = tempdir().unwrap();
        let result = Config::load_with_file(Some(&dir.path().join("absent.yaml")));
        assert!(matches!(result, Err(Error::FileNotFound { .. })));
    }

    #[test]
    fn test_cli_rule_sets_override() {
        let mut config = Config::default();
        config.rule_sets_file = Some(PathBuf::from("from-config.json"));

        let kept = config.clone().with_rule_sets_file(None);
        assert_eq!(kept.rule_sets_file, Some(PathBuf::from("from-config.json")));

        let replaced = config.with_rule_sets_file(Some(PathBuf::from("cli.yaml")));
        assert_eq!(replaced.rule_sets_file, Some(PathBuf::from("cli.yaml")));
    }
}
