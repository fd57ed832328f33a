//! Human-readable output formatter.

use std::io::Write;

use console::style;

use super::{display_name, resource_label, LintFormatter, LintReport, LinterSection, ResourceReport};

/// Formats a lint report for terminal display.
pub struct HumanFormatter {
    /// Whether to use colors (ANSI escape codes).
    pub use_color: bool,
}

impl HumanFormatter {
    pub fn new(use_color: bool) -> Self {
        Self { use_color }
    }

    fn status(&self, passed: bool) -> String {
        let text = if passed { "Passed" } else { "Failed" };
        match (self.use_color, passed) {
            (false, _) => text.to_string(),
            (true, true) => style(text).green().to_string(),
            (true, false) => style(text).red().to_string(),
        }
    }

    fn write_resource<W: Write>(
        &self,
        label: &str,
        resource: &ResourceReport,
        writer: &mut W,
    ) -> std::io::Result<()> {
        writeln!(writer, "==> Linting {}: {}\n", label, resource.path)?;

        if resource.messages.is_empty() {
            writeln!(writer, "No issues found")?;
        }
        for msg in &resource.messages {
            if msg.path.is_empty() {
                writeln!(writer, "[{}] {}", msg.severity, msg.message)?;
            } else {
                writeln!(writer, "[{}] {}: {}", msg.severity, msg.path, msg.message)?;
            }
        }

        writeln!(
            writer,
            "\nSummary for {}: {} error(s), {} warning(s), {} info",
            resource.path, resource.summary.errors, resource.summary.warnings, resource.summary.infos
        )?;
        writeln!(writer, "Status: {}\n", self.status(resource.success))
    }

    fn write_section<W: Write>(&self, section: &LinterSection, writer: &mut W) -> std::io::Result<()> {
        let name = display_name(section.tool);
        if !section.enabled {
            return writeln!(writer, "{} linting is disabled in .replicated config\n", name);
        }
        let label = resource_label(section.tool);
        if section.resources.is_empty() {
            return writeln!(writer, "No {}s configured (skipping {} linting)\n", label, name);
        }
        for resource in &section.resources {
            self.write_resource(label, resource, writer)?;
        }
        Ok(())
    }
}

impl LintFormatter for HumanFormatter {
    fn format<W: Write>(&self, report: &LintReport, writer: &mut W) -> std::io::Result<()> {
        for warning in &report.warnings {
            writeln!(writer, "Warning: {}", warning)?;
        }
        if !report.warnings.is_empty() {
            writeln!(writer)?;
        }

        for section in &report.sections {
            self.write_section(section, writer)?;
        }

        let summary = report.summary();
        if summary.total_resources > 1 {
            writeln!(writer, "==> Overall Summary")?;
            for section in report.sections.iter().filter(|s| !s.resources.is_empty()) {
                let label = resource_label(section.tool);
                writeln!(writer, "{}s linted: {}", label, section.resources.len())?;
                writeln!(writer, "{}s passed: {}", label, section.passed())?;
                writeln!(writer, "{}s failed: {}", label, section.failed())?;
            }
            writeln!(writer, "Total errors: {}", summary.total_errors)?;
            writeln!(writer, "Total warnings: {}", summary.total_warnings)?;
            writeln!(writer, "Total info: {}", summary.total_info)?;
            writeln!(
                writer,
                "\nOverall Status: {}",
                self.status(summary.overall_success)
            )?;
        }

        Ok(())
    }
}
