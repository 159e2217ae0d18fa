//! Output formatting and writing utilities
//!
//! Documents and reports are written to stdout in the selected format.
//! Status lines (info, success, warning) only appear in human mode, so the
//! machine formats stay parseable.
//!
//! Copyright (c) 2025 Jsonmorph Team
//! Licensed under the Apache-2.0 license

use crate::cli::OutputFormat;
use crate::error::Result;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use jsonmorph_schemas::{ValidationError, ValidationReport};
use serde::Serialize;
use std::io::{self, Write};
use tracing::{debug, trace};

/// Formatting for serializable values and validation reports
pub trait OutputFormatter {
    /// Format a serializable value
    fn format<T: Serialize>(&self, value: &T) -> Result<String>;

    /// Format a validation report; `detailed` adds schema paths and keywords
    fn format_validation_report(&self, report: &ValidationReport, detailed: bool)
        -> Result<String>;
}

impl OutputFormatter for OutputFormat {
    fn format<T: Serialize>(&self, value: &T) -> Result<String> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_string(value)?),
            OutputFormat::JsonPretty | OutputFormat::Human => {
                Ok(serde_json::to_string_pretty(value)?)
            }
            OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
        }
    }

    fn format_validation_report(
        &self,
        report: &ValidationReport,
        detailed: bool,
    ) -> Result<String> {
        match self {
            OutputFormat::Human => Ok(format_validation_report_human(report, detailed)),
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
    /// Create a new output writer on stdout
    pub fn new(format: OutputFormat, use_color: bool, quiet: bool, show_progress: bool) -> Self {
        Self {
            format,
            use_color,
            show_progress: show_progress && !quiet,
            quiet,
            writer: Box::new(io::stdout()),
        }
    }

    /// Create an output writer with a custom writer
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn with_writer(format: OutputFormat, quiet: bool, writer: Box<dyn Write>) -> Self {
        Self {
            format,
            use_color: false,
            show_progress: false,
            quiet,
            writer,
        }
    }

    /// Write a line of output
    pub fn writeln(&mut self, content: &str) -> Result<()> {
        writeln!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write an info message
    pub fn info(&mut self, message: &str) -> Result<()> {
        debug!("Output info: {}", message);

        if self.quiet || self.format != OutputFormat::Human {
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
        if self.quiet || self.format != OutputFormat::Human {
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
        if self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.yellow().to_string())
        } else {
            self.writeln(&format!("WARNING: {}", message))
        }
    }

    /// Write a section header
    pub fn section(&mut self, title: &str) -> Result<()> {
        if self.quiet || self.format != OutputFormat::Human {
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

        // serde_yaml already ends with a newline
        if formatted.ends_with('\n') {
            write!(self.writer, "{}", formatted)?;
            self.writer.flush()?;
            Ok(())
        } else {
            self.writeln(&formatted)
        }
    }

    /// Write a validation report
    pub fn validation_report(&mut self, report: &ValidationReport, detailed: bool) -> Result<()> {
        let formatted = self.format.format_validation_report(report, detailed)?;
        let formatted = formatted.trim_end_matches('\n');

        if self.format == OutputFormat::Human && self.use_color {
            let colored = if report.is_valid() {
                formatted.green().to_string()
            } else {
                formatted.red().to_string()
            };
            self.writeln(&colored)
        } else {
            self.writeln(formatted)
        }
    }

    /// Create a progress bar for multi-file operations
    pub fn progress_bar(&self, length: u64, message: &str) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }

        let pb = ProgressBar::new(length);
        pb.set_style(default_progress_style());
        pb.set_message(message.to_string());
        Some(pb)
    }
}

/// Helper function to create a progress bar style
pub fn default_progress_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-")
}

/// Format a validation report for human reading
fn format_validation_report_human(report: &ValidationReport, detailed: bool) -> String {
    if report.is_valid() {
        return "✓ Document is valid".to_string();
    }

    let mut output = format!("✗ Validation failed - {} error(s)\n", report.errors().len());
    for (i, error) in report.errors().iter().enumerate() {
        output.push_str(&format!("{}. {}\n", i + 1, format_validation_error_human(error, detailed)));
    }
    output
}

fn format_validation_error_human(error: &ValidationError, detailed: bool) -> String {
    if !detailed {
        return error.to_string();
    }

    let path = if error.instance_path.is_empty() {
        "(root)"
    } else {
        error.instance_path.as_str()
    };
    format!(
        "{}\n   at: {}\n   keyword: {}\n   schema: {}",
        error.message, path, error.keyword, error.schema_path
    )
}


#[cfg(test)]
mod tests {
    use super::testing::{writer, SharedBuffer};
    use super::*;
    use serde_json::json;

    fn invalid_report() -> ValidationReport {
        ValidationReport::from_errors(vec![
            ValidationError::new("", "/required", "\"id\" is a required property"),
            ValidationError::new("/age", "/properties/age/minimum", "-1 is less than the minimum of 0"),
        ])
    }

    #[test]
    fn test_json_data_is_compact() {
        let (mut out, buffer) = writer(OutputFormat::Json);
        out.data(&json!({"b": 1, "a": [true]})).unwrap();
        assert_eq!(buffer.contents(), "{\"b\":1,\"a\":[true]}\n");
    }

    #[test]
    fn test_yaml_data_single_trailing_newline() {
        let (mut out, buffer) = writer(OutputFormat::Yaml);
        out.data(&json!({"a": 1})).unwrap();
        assert_eq!(buffer.contents(), "a: 1\n");
    }

    #[test]
    fn test_status_lines_only_in_human_mode() {
        let (mut out, buffer) = writer(OutputFormat::Json);
        out.info("hello").unwrap();
        out.success("done").unwrap();
        out.warning("careful").unwrap();
        out.section("Title").unwrap();
        assert_eq!(buffer.contents(), "");

        let (mut out, buffer) = writer(OutputFormat::Human);
        out.info("hello").unwrap();
        out.warning("careful").unwrap();
        assert_eq!(buffer.contents(), "INFO: hello\nWARNING: careful\n");
    }

    #[test]
    fn test_quiet_suppresses_info_but_not_warnings() {
        let buffer = SharedBuffer::default();
        let mut out = OutputWriter::with_writer(OutputFormat::Human, true, Box::new(buffer.clone()));
        out.info("hello").unwrap();
        out.success("done").unwrap();
        out.warning("careful").unwrap();
        assert_eq!(buffer.contents(), "WARNING: careful\n");
    }

    #[test]
    fn test_human_validation_report() {
        let (mut out, buffer) = writer(OutputFormat::Human);
        out.validation_report(&invalid_report(), false).unwrap();

        let text = buffer.contents();
        assert!(text.starts_with("✗ Validation failed - 2 error(s)\n"));
        assert!(text.contains("1. data \"id\" is a required property\n"));
        assert!(text.contains("2. data/age -1 is less than the minimum of 0"));
    }

    #[test]
    fn test_detailed_validation_report() {
        let text = OutputFormat::Human
            .format_validation_report(&invalid_report(), true)
            .unwrap();
        assert!(text.contains("at: (root)"));
        assert!(text.contains("keyword: minimum"));
        assert!(text.contains("schema: /properties/age/minimum"));
    }

    #[test]
    fn test_machine_validation_report() {
        let text = OutputFormat::Json
            .format_validation_report(&ValidationReport::valid(), false)
            .unwrap();
        assert_eq!(text, "{\"valid\":true,\"errors\":[]}");
    }

    #[test]
    fn test_no_progress_with_custom_writer() {
        let (out, _) = writer(OutputFormat::Human);
        assert!(out.progress_bar(3, "working").is_none());
    }
}
