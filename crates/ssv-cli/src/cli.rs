//! Command-line interface argument parsing and definitions
//!
//! This module defines the CLI structure using clap's derive API,
//! providing a type-safe and well-documented command interface.

use clap::{ArgGroup, Parser, Subcommand, ValueEnum};
use is_terminal::IsTerminal;
use std::path::PathBuf;

/// SSV - Structured-output schema validator
///
/// Checks JSON Schemas against the structured-output rules of LLM providers,
/// rewrites them to fit, and verifies whole corpora of test schemas.
#[derive(Parser, Debug)]
#[command(
    name = "ssv",
    version,
    author,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Enable verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "SSV_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format for results [default: human]
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Rule-set document to use instead of the bundled one (JSON or YAML)
    #[arg(long = "rule-sets", value_name = "FILE", global = true, env = "SSV_RULE_SETS")]
    pub rule_sets_file: Option<PathBuf>,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check a schema against one or more provider rule sets
    Validate(ValidateArgs),

    /// Rewrite a schema so one provider accepts it
    Fix(FixArgs),

    /// Run the validator (and fixer) over a directory of test schemas
    Verify(VerifyArgs),

    /// List the available provider rule sets
    RuleSets(RuleSetsArgs),

    /// Manage configuration files and settings
    Config(ConfigArgs),

    /// Generate shell completions for the specified shell
    Completions(CompletionsArgs),
}

/// Arguments for the validate command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to the JSON Schema file (JSON or YAML)
    #[arg(value_name = "SCHEMA")]
    pub schema: PathBuf,

    /// Provider id to validate against (repeatable)
    #[arg(short, long = "provider", value_name = "PROVIDER")]
    pub providers: Vec<String>,

    /// Rule-set id to validate against (repeatable)
    #[arg(short = 'r', long = "rule-set", value_name = "RULE_SET")]
    pub rule_set_ids: Vec<String>,
}

impl ValidateArgs {
    /// Provider and rule-set selections in the order given
    pub fn selection(&self) -> Vec<String> {
        self.providers
            .iter()
            .chain(&self.rule_set_ids)
            .cloned()
            .collect()
    }
}

/// Arguments for the fix command
#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("target").required(true).args(["provider", "rule_set_id"])))]
pub struct FixArgs {
    /// Path to the JSON Schema file (JSON or YAML)
    #[arg(value_name = "SCHEMA")]
    pub schema: PathBuf,

    /// Provider id to fix for
    #[arg(short, long, value_name = "PROVIDER")]
    pub provider: Option<String>,

    /// Rule-set id to fix for
    #[arg(short = 'r', long = "rule-set", value_name = "RULE_SET")]
    pub rule_set_id: Option<String>,

    /// Write the fixed schema to a file
    #[arg(long = "save-to", value_name = "OUTPUT_FILE")]
    pub save_to: Option<PathBuf>,

    /// Show a unified diff between the input and the fixed schema
    #[arg(long)]
    pub diff: bool,

    /// Skip validating the fixed schema
    #[arg(long)]
    pub no_revalidate: bool,
}

impl FixArgs {
    /// The selected provider or rule-set id
    pub fn target(&self) -> &str {
        self.rule_set_id
            .as_deref()
            .or(self.provider.as_deref())
            .unwrap_or_default()
    }
}

/// Arguments for the verify command
#[derive(Parser, Debug)]
pub struct VerifyArgs {
    /// Schema files or directories to scan for *.json documents
    #[arg(value_name = "PATH", required = true)]
    pub paths: Vec<PathBuf>,

    /// Rule-set or provider ids to run (comma-separated; all when omitted)
    #[arg(short = 'r', long = "rule-set", value_name = "RULE_SET", value_delimiter = ',')]
    pub rule_set_ids: Vec<String>,

    /// Do not run the fixer on documents that fail validation
    #[arg(long)]
    pub no_fix: bool,

    /// Write the JSON report to a file
    #[arg(long, value_name = "REPORT_FILE")]
    pub report: Option<PathBuf>,
}

/// Arguments for the rule-sets command
#[derive(Parser, Debug)]
pub struct RuleSetsArgs {
    /// Show every capability of each rule set
    #[arg(long)]
    pub detailed: bool,

    /// Only show rule sets for this provider
    #[arg(short, long, value_name = "PROVIDER")]
    pub provider: Option<String>,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration management actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show(ConfigShowArgs),

    /// Write a default configuration file
    Init(ConfigInitArgs),

    /// List the locations searched for a configuration file
    Path,
}

/// Arguments for config show
#[derive(Parser, Debug)]
pub struct ConfigShowArgs {
    /// Show configuration in specified format
    #[arg(short, long, value_enum, default_value = "yaml")]
    pub format: ConfigFormat,
}

/// Arguments for config init
#[derive(Parser, Debug)]
pub struct ConfigInitArgs {
    /// Where to write the file
    #[arg(value_name = "PATH", default_value = ".ssv.yaml")]
    pub path: PathBuf,

    /// Force overwrite an existing config file
    #[arg(long)]
    pub force: bool,
}

/// Configuration file formats
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ConfigFormat {
    /// TOML format
    Toml,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

/// Arguments for generating shell completions
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Output format options
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable formatted output
    Human,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Pretty-printed JSON output
    JsonPretty,
}

impl OutputFormat {
    /// Parse a config-file value such as `json-pretty`
    pub fn from_config(value: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(value, true).ok()
    }
}

/// Supported shells for completion generation
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective verbosity level (considering quiet flag)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Check if colored output should be used
    pub fn use_color(&self) -> bool {
        !self.no_color && std::io::stdout().is_terminal()
    }
}

impl Shell {
    /// Convert to clap_complete shell type
    pub fn to_clap_shell(self) -> clap_complete::Shell {
        match self {
            Shell::Bash => clap_complete::Shell::Bash,
            Shell::Zsh => clap_complete::Shell::Zsh,
            Shell::Fish => clap_complete::Shell::Fish,
            Shell::PowerShell => clap_complete::Shell::PowerShell,
            Shell::Elvish => clap_complete::Shell::Elvish,
        }
    }
}
