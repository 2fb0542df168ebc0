//! SSV CLI - Command-line interface for structured-output schema validation
//!
//! This is the main entry point for the SSV CLI application, providing
//! commands for validating JSON Schemas against LLM provider rule sets,
//! fixing them, and verifying whole corpora of test schemas.

mod cli;
mod config;
mod error;
mod handlers;
mod logging;
mod output;

use cli::{Cli, Commands, OutputFormat};
use colored::control;
use config::Config;
use error::Result;
use logging::{timing::Timer, LoggingConfig};
use output::OutputWriter;
use std::process;
use tracing::instrument;

#[tokio::main]
async fn main() {
    // Parse command-line arguments
    let cli = Cli::parse_args();

    // Configuration feeds logging, so it is loaded before the subscriber exists
    let config = Config::load_with_file(cli.config.as_deref())
        .map(|c| c.with_rule_sets_file(cli.rule_sets_file.clone()));

    let use_color = cli.use_color()
        && config.as_ref().map(|c| c.output.color).unwrap_or(true);
    control::set_override(use_color);

    if let Err(e) = init_logging(&cli, config.as_ref().ok()) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let result = match config {
        Ok(config) => run(cli, config, use_color).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => {
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}", error::format_error(&e, use_color));

            if e.should_show_help() {
                eprintln!("\nFor more information, try '--help'");
            }

            process::exit(e.exit_code());
        }
    }
}

/// Main application logic
#[instrument(skip(cli, config), fields(command = ?cli.command))]
async fn run(cli: Cli, config: Config, use_color: bool) -> Result<()> {
    let _timer = Timer::new("cli_execution");

    let format = effective_output_format(cli.output, &config);
    let mut output = OutputWriter::new(format, use_color, cli.quiet);

    tracing::info!(
        command = ?cli.command,
        verbosity = cli.verbosity_level(),
        format = ?format,
        "Executing command"
    );

    match cli.command {
        Commands::Validate(args) => handlers::handle_validate(args, &config, &mut output).await,
        Commands::Fix(args) => handlers::handle_fix(args, &config, &mut output).await,
        Commands::Verify(args) => handlers::handle_verify(args, &config, &mut output).await,
        Commands::RuleSets(args) => handlers::handle_rule_sets(args, &config, &mut output).await,
        Commands::Config(args) => handlers::handle_config(args, &config, &mut output).await,
        Commands::Completions(args) => handlers::handle_completions(args),
    }
}

/// `-o` wins over the config file, which wins over human output
fn effective_output_format(flag: Option<OutputFormat>, config: &Config) -> OutputFormat {
    flag.or_else(|| {
        let parsed = OutputFormat::from_config(&config.output.format);
        if parsed.is_none() {
            tracing::warn!(format = %config.output.format, "Unknown output format in config, using human");
        }
        parsed
    })
    .unwrap_or(OutputFormat::Human)
}

/// Initialize the logging system
fn init_logging(cli: &Cli, config: Option<&Config>) -> Result<()> {
    let mut logging_config = LoggingConfig::from_verbosity(cli.verbosity_level());

    if let Some(config) = config {
        logging_config.merge_with_settings(&config.logging);
    }

    // Apply environment overrides
    logging_config.merge_with_env();

    // If quiet mode, only log errors
    if cli.quiet {
        logging_config.level = "error".to_string();
        logging_config.console = false;
    }

    logging::init_logging(logging_config)
}
