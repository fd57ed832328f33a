//! Lint report model and output formatters.
//!
//! A [`LintReport`] collects one section per linter, each holding a
//! [`ResourceReport`] per linted chart, spec or manifest. Formatters render
//! the whole report at once.

pub mod human;
pub mod json;

use std::collections::BTreeMap;
use std::io::Write;

use serde::Serialize;

use crate::error::LintError;
use crate::lint::message::{LintMessage, LintResult, Severity, SeverityCounts};
use crate::tools::Tool;

/// Output format for lint results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
}

/// Trait for formatting a lint report.
pub trait LintFormatter {
    fn format<W: Write>(&self, report: &LintReport, writer: &mut W) -> std::io::Result<()>;
}

pub use human::HumanFormatter;
pub use json::JsonFormatter;

/// Singular noun for what a linter checks.
pub fn resource_label(tool: Tool) -> &'static str {
    match tool {
        Tool::Helm => "chart",
        Tool::Preflight => "preflight spec",
        Tool::SupportBundle => "support bundle spec",
        Tool::EmbeddedCluster => "embedded cluster config",
        Tool::Kots => "KOTS manifest",
    }
}

/// Linter name as shown to users.
pub fn display_name(tool: Tool) -> &'static str {
    match tool {
        Tool::Helm => "Helm",
        Tool::Preflight => "Preflight",
        Tool::SupportBundle => "Support bundle",
        Tool::EmbeddedCluster => "Embedded cluster",
        Tool::Kots => "KOTS",
    }
}

/// Lint outcome for one resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceReport {
    pub path: String,
    pub success: bool,
    pub messages: Vec<LintMessage>,
    pub summary: SeverityCounts,
}

impl ResourceReport {
    /// Build from a linter result. Under `strict`, warnings also fail.
    pub fn from_result(path: impl Into<String>, result: LintResult, strict: bool) -> Self {
        let summary = result.counts();
        let success = result.success && !(strict && summary.warnings > 0);
        Self {
            path: path.into(),
            success,
            messages: result.messages,
            summary,
        }
    }

    /// A resource whose lint step itself failed.
    pub fn from_error(path: impl Into<String>, error: &LintError) -> Self {
        let path = path.into();
        let messages = vec![LintMessage::new(Severity::Error, "", error.to_string())];
        Self {
            summary: SeverityCounts::from_messages(&messages),
            path,
            success: false,
            messages,
        }
    }
}

/// Results of one linter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinterSection {
    pub tool: Tool,
    pub enabled: bool,
    pub resources: Vec<ResourceReport>,
}

impl LinterSection {
    pub fn new(tool: Tool, enabled: bool) -> Self {
        Self {
            tool,
            enabled,
            resources: Vec::new(),
        }
    }

    pub fn passed(&self) -> usize {
        self.resources.iter().filter(|r| r.success).count()
    }

    pub fn failed(&self) -> usize {
        self.resources.len() - self.passed()
    }
}

/// Context recorded alongside the results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<String>,
    pub cli_version: String,
    /// Resolved version per tool name.
    pub tool_versions: BTreeMap<String, String>,
}

/// Totals across every linter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LintSummary {
    pub total_resources: usize,
    pub passed_resources: usize,
    pub failed_resources: usize,
    pub total_errors: usize,
    pub total_warnings: usize,
    pub total_info: usize,
    pub overall_success: bool,
}

/// Everything one lint run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LintReport {
    pub metadata: ReportMetadata,
    pub sections: Vec<LinterSection>,
    /// Non-fatal findings outside any resource (orphan manifests, stale tools).
    pub warnings: Vec<String>,
}

impl LintReport {
    pub fn new(metadata: ReportMetadata) -> Self {
        Self {
            metadata,
            ..Default::default()
        }
    }

    pub fn section(&self, tool: Tool) -> Option<&LinterSection> {
        self.sections.iter().find(|s| s.tool == tool)
    }

    pub fn summary(&self) -> LintSummary {
        let mut counts = SeverityCounts::default();
        let mut summary = LintSummary::default();
        for resource in self.sections.iter().flat_map(|s| &s.resources) {
            summary.total_resources += 1;
            if resource.success {
                summary.passed_resources += 1;
            } else {
                summary.failed_resources += 1;
            }
            counts.add(resource.summary);
        }
        summary.total_errors = counts.errors;
        summary.total_warnings = counts.warnings;
        summary.total_info = counts.infos;
        summary.overall_success = summary.failed_resources == 0;
        summary
    }

    pub fn is_success(&self) -> bool {
        self.summary().overall_success
    }
}
