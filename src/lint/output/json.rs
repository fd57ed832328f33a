//! JSON output formatter.
//!
//! Each linter gets a `<tool>_results` object holding `enabled` and its
//! resources under a linter-specific key (`charts`, `specs`, `configs`,
//! `manifests`).

use std::collections::BTreeMap;
use std::io::Write;

use serde::Serialize;

use super::{LintFormatter, LintReport, LintSummary, LinterSection, ReportMetadata, ResourceReport};
use crate::tools::Tool;

/// Formats a lint report as JSON.
pub struct JsonFormatter;

#[derive(Serialize)]
struct JsonOutput<'a> {
    metadata: &'a ReportMetadata,
    #[serde(flatten)]
    sections: BTreeMap<String, JsonSection<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
    summary: LintSummary,
}

#[derive(Serialize)]
struct JsonSection<'a> {
    enabled: bool,
    #[serde(flatten)]
    resources: BTreeMap<&'static str, &'a [ResourceReport]>,
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self
    }

    fn resources_key(tool: Tool) -> &'static str {
        match tool {
            Tool::Helm => "charts",
            Tool::Preflight | Tool::SupportBundle => "specs",
            Tool::EmbeddedCluster => "configs",
            Tool::Kots => "manifests",
        }
    }

    fn section(section: &LinterSection) -> JsonSection<'_> {
        JsonSection {
            enabled: section.enabled,
            resources: BTreeMap::from([(
                Self::resources_key(section.tool),
                section.resources.as_slice(),
            )]),
        }
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl LintFormatter for JsonFormatter {
    fn format<W: Write>(&self, report: &LintReport, writer: &mut W) -> std::io::Result<()> {
        let output = JsonOutput {
            metadata: &report.metadata,
            sections: report
                .sections
                .iter()
                .map(|s| (format!("{}_results", s.tool.version_key()), Self::section(s)))
                .collect(),
            warnings: report.warnings.clone(),
            summary: report.summary(),
        };

        serde_json::to_writer_pretty(&mut *writer, &output).map_err(std::io::Error::other)?;
        writeln!(writer)
    }
}
