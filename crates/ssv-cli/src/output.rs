//! Output formatting and writing utilities
//!
//! This module provides utilities for formatting and writing output
//! in various formats (JSON, YAML, human-readable) with specialized
//! support for compatibility reports, fix results, and progress indicators.

use crate::cli::OutputFormat;
use crate::error::Result;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use is_terminal::IsTerminal;
use serde::Serialize;
use ssv_core::{CompatibilityReport, FixResult, Marker, ProviderResult, ReportEntry, Severity};
use std::io::{self, Write};
use tracing::trace;

/// Trait for formatting output with specialized support for common types
pub trait OutputFormatter {
    /// Format a serializable value
    fn format<T: Serialize>(&self, value: &T) -> Result<String>;

    /// Format a cross-provider compatibility report
    fn format_report(&self, report: &CompatibilityReport) -> Result<String>;
}

impl OutputFormatter for OutputFormat {
    fn format<T: Serialize>(&self, value: &T) -> Result<String> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_string(value)?),
            OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
            OutputFormat::Human => {
                // For human format, use pretty JSON as fallback
                Ok(serde_json::to_string_pretty(value)?)
            }
        }
    }

    fn format_report(&self, report: &CompatibilityReport) -> Result<String> {
        match self {
            OutputFormat::Human => Ok(format_report_human(report)),
            _ => self.format(report),
        }
    }
}

/// Output writer that handles different output formats and colors
pub struct OutputWriter {
    format: OutputFormat,
    use_color: bool,
    show_progress: bool,
    quiet: bool,
    writer: Box<dyn Write>,
}

impl OutputWriter {
    /// Create a new output writer
    pub fn new(format: OutputFormat, use_color: bool, quiet: bool) -> Self {
        Self {
            format,
            use_color,
            show_progress: !quiet && format == OutputFormat::Human && io::stderr().is_terminal(),
            quiet,
            writer: Box::new(io::stdout()),
        }
    }

    /// Create an output writer with a custom writer
    #[cfg(test)]
    pub fn with_writer(format: OutputFormat, use_color: bool, quiet: bool, writer: Box<dyn Write>) -> Self {
        Self {
            format,
            use_color,
            show_progress: false, // No progress bars with custom writers
            quiet,
            writer,
        }
    }

    pub fn is_human(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Write raw output
    pub fn write(&mut self, content: &str) -> Result<()> {
        write!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write a line of output
    pub fn writeln(&mut self, content: &str) -> Result<()> {
        writeln!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write an info message
    pub fn info(&mut self, message: &str) -> Result<()> {
        if self.quiet || !self.is_human() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&format!("{} {}", "ℹ".blue(), message))
        } else {
            self.writeln(&format!("INFO: {}", message))
        }
    }

    /// Write a success message
    pub fn success(&mut self, message: &str) -> Result<()> {
        if self.quiet || !self.is_human() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.green().to_string())
        } else {
            self.writeln(message)
        }
    }

    /// Write a warning message
    pub fn warning(&mut self, message: &str) -> Result<()> {
        if !self.is_human() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.yellow().to_string())
        } else {
            self.writeln(&format!("WARNING: {}", message))
        }
    }

    /// Write an error message
    pub fn error(&mut self, message: &str) -> Result<()> {
        if !self.is_human() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.red().to_string())
        } else {
            self.writeln(&format!("ERROR: {}", message))
        }
    }

    /// Write a section header
    pub fn section(&mut self, title: &str) -> Result<()> {
        if self.quiet || !self.is_human() {
            return Ok(());
        }

        self.writeln("")?;
        if self.use_color {
            self.writeln(&format!("═══ {} ═══", title).bright_blue().to_string())
        } else {
            self.writeln(&format!("=== {} ===", title))
        }
    }

    /// Write data in the configured format
    pub fn data<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let formatted = self.format.format(value)?;
        trace!(bytes = formatted.len(), "Outputting data");

        if self.is_human() || !formatted.ends_with('\n') {
            self.writeln(&formatted)
        } else {
            self.write(&formatted)
        }
    }

    /// Write a compatibility report with specialized formatting
    pub fn report(&mut self, report: &CompatibilityReport) -> Result<()> {
        if self.is_human() {
            return self.human_report(report);
        }
        let formatted = self.format.format_report(report)?;
        self.writeln(formatted.trim_end())
    }

    fn human_report(&mut self, report: &CompatibilityReport) -> Result<()> {
        for result in &report.results {
            let header = provider_header(result);
            if self.use_color {
                let header = if result.valid { header.green() } else { header.red() };
                self.writeln(&header.bold().to_string())?;
            } else {
                self.writeln(&header)?;
            }
            for entry in result.errors.iter().chain(&result.warnings).chain(&result.infos) {
                self.entry_line(entry)?;
            }
        }
        self.writeln("")?;
        self.writeln(&report.summary)
    }

    fn entry_line(&mut self, entry: &ReportEntry) -> Result<()> {
        let line = format_entry(entry);
        if !self.use_color {
            return self.writeln(&line);
        }
        let colored = match entry.severity {
            Severity::Error => line.red(),
            Severity::Warning => line.yellow(),
            Severity::Info => line.normal(),
        };
        self.writeln(&colored.to_string())
    }

    /// Write residual markers after a fix, in `line:column severity message` form
    pub fn markers(&mut self, markers: &[Marker]) -> Result<()> {
        for marker in markers {
            self.entry_line(&ReportEntry::from(marker))?;
        }
        Ok(())
    }

    /// Write the applied and unresolved sections of a fix result
    pub fn fix_result(&mut self, result: &FixResult) -> Result<()> {
        if !self.is_human() {
            return Ok(());
        }
        let text = format_fix_result_human(result);
        for line in text.lines() {
            if self.use_color && line.trim_start().starts_with("info lost:") {
                self.writeln(&line.yellow().to_string())?;
            } else if self.use_color && line.trim_start().starts_with("✗") {
                self.writeln(&line.red().to_string())?;
            } else {
                self.writeln(line)?;
            }
        }
        Ok(())
    }

    /// Write a table (for human format)
    pub fn table(&mut self, headers: &[&str], rows: Vec<Vec<String>>) -> Result<()> {
        if self.quiet || !self.is_human() {
            return Ok(());
        }

        // Calculate column widths
        let mut widths = headers.iter().map(|h| h.chars().count()).collect::<Vec<_>>();
        for row in &rows {
            for (i, cell) in row.iter().enumerate() {
                if i < widths.len() {
                    widths[i] = widths[i].max(cell.chars().count());
                }
            }
        }

        let header_row = headers
            .iter()
            .enumerate()
            .map(|(i, h)| format!("{:width$}", h, width = widths[i]))
            .collect::<Vec<_>>()
            .join(" │ ");

        if self.use_color {
            self.writeln(&header_row.bold().to_string())?;
        } else {
            self.writeln(&header_row)?;
        }

        let separator = widths
            .iter()
            .map(|w| "─".repeat(*w))
            .collect::<Vec<_>>()
            .join("─┼─");
        self.writeln(&separator)?;

        for row in rows {
            let row_str = row
                .iter()
                .enumerate()
                .map(|(i, cell)| match widths.get(i) {
                    Some(width) => format!("{:width$}", cell, width = width),
                    None => cell.clone(),
                })
                .collect::<Vec<_>>()
                .join(" │ ");
            self.writeln(row_str.trim_end())?;
        }

        Ok(())
    }

    /// Create a progress bar for long operations
    pub fn progress_bar(&self, length: u64, message: &str) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }

        let pb = ProgressBar::new(length);
        if let Ok(style) = default_progress_style() {
            pb.set_style(style);
        }
        pb.set_message(message.to_string());
        Some(pb)
    }
}

/// Helper function to create a progress bar style
pub fn default_progress_style() -> std::result::Result<ProgressStyle, indicatif::style::TemplateError> {
    Ok(ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
        .progress_chars("#>-"))
}

fn provider_header(result: &ProviderResult) -> String {
    let name = if result.rule_set_name.is_empty() {
        result.rule_set_id.clone()
    } else {
        format!("{} ({})", result.rule_set_name, result.rule_set_id)
    };
    if result.valid {
        format!("✓ {}", name)
    } else {
        format!("✗ {}: {} error(s)", name, result.errors.len())
    }
}

/// `line:column severity message` for one report entry
fn format_entry(entry: &ReportEntry) -> String {
    format!(
        "  {}:{} {} {}",
        entry.location.line, entry.location.column, entry.severity, entry.message
    )
}

/// Format a compatibility report for human reading
fn format_report_human(report: &CompatibilityReport) -> String {
    let mut output = String::new();
    for result in &report.results {
        output.push_str(&provider_header(result));
        output.push('\n');
        for entry in result.errors.iter().chain(&result.warnings).chain(&result.infos) {
            output.push_str(&format_entry(entry));
            output.push('\n');
        }
    }
    output.push('\n');
    output.push_str(&report.summary);
    output
}

/// Format a fix result for human reading
fn format_fix_result_human(result: &FixResult) -> String {
    let mut output = String::new();

    if result.applied_fixes.is_empty() {
        output.push_str("No fixes applied\n");
    } else {
        output.push_str(&format!("Applied {} fix(es):\n", result.applied_fixes.len()));
        for fix in &result.applied_fixes {
            output.push_str(&format!(
                "  ✓ {} [{}] {}\n",
                display_pointer(&fix.pointer),
                fix.kind,
                fix.description
            ));
            if let Some(lost) = &fix.info_lost {
                output.push_str(&format!("      info lost: {}\n", lost));
            }
        }
    }

    if !result.unresolved_errors.is_empty() {
        output.push_str(&format!(
            "\n{} unresolved error(s):\n",
            result.unresolved_errors.len()
        ));
        for error in &result.unresolved_errors {
            output.push_str(&format!(
                "  ✗ {} [{}] {}\n      reason: {}\n",
                display_pointer(&error.pointer),
                error.kind,
                error.message,
                error.reason
            ));
        }
    }

    output
}

fn display_pointer(pointer: &str) -> &str {
    if pointer.is_empty() {
        "(root)"
    } else {
        pointer
    }
}
