//! Report parsing for the troubleshoot linters (`preflight`, `support-bundle`).
//!
//! Both tools print `{"results": [{"filePath", "errors", "warnings",
//! "infos"}]}`, with issues carrying `line`, `column`, `message` and `field`.

use serde::Deserialize;

use crate::error::Result;
use crate::lint::extract::{decode_json, null_as_default};
use crate::lint::message::{LintMessage, Severity};
use crate::tools::Tool;

/// Accessors shared by every troubleshoot issue shape.
pub trait LintIssue {
    fn line(&self) -> u64;
    fn column(&self) -> u64;
    fn message(&self) -> &str;
    fn field(&self) -> &str;
}

/// An issue reported by `preflight lint`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PreflightIssue {
    pub line: u64,
    pub column: u64,
    pub message: String,
    pub field: String,
}

/// An issue reported by `support-bundle lint`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SupportBundleIssue {
    pub line: u64,
    pub column: u64,
    pub message: String,
    pub field: String,
}

macro_rules! impl_lint_issue {
    ($($ty:ty),*) => {
        $(impl LintIssue for $ty {
            fn line(&self) -> u64 {
                self.line
            }
            fn column(&self) -> u64 {
                self.column
            }
            fn message(&self) -> &str {
                &self.message
            }
            fn field(&self) -> &str {
                &self.field
            }
        })*
    };
}

impl_lint_issue!(PreflightIssue, SupportBundleIssue);

/// Issues for one linted file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct FileResult<T> {
    #[serde(rename = "filePath", default)]
    pub file_path: String,
    #[serde(default = "Vec::new", deserialize_with = "null_as_default")]
    pub errors: Vec<T>,
    #[serde(default = "Vec::new", deserialize_with = "null_as_default")]
    pub warnings: Vec<T>,
    #[serde(default = "Vec::new", deserialize_with = "null_as_default")]
    pub infos: Vec<T>,
}

/// Top-level troubleshoot lint report.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TroubleshootReport<T> {
    pub results: Vec<FileResult<T>>,
}

/// Render an issue as `line N: message (field: F)`.
pub fn format_issue(issue: &impl LintIssue) -> String {
    let mut message = issue.message().to_string();
    if issue.line() > 0 {
        message = format!("line {}: {}", issue.line(), message);
    }
    if !issue.field().is_empty() {
        message = format!("{} (field: {})", message, issue.field());
    }
    message
}

/// Flatten a report: per file, errors then warnings then infos.
pub fn normalize<T: LintIssue>(report: &TroubleshootReport<T>) -> Vec<LintMessage> {
    let mut messages = Vec::new();
    for file in &report.results {
        let buckets = [
            (Severity::Error, &file.errors),
            (Severity::Warning, &file.warnings),
            (Severity::Info, &file.infos),
        ];
        for (severity, issues) in buckets {
            messages.extend(
                issues
                    .iter()
                    .map(|issue| LintMessage::new(severity, &file.file_path, format_issue(issue))),
            );
        }
    }
    messages
}

/// Parse `preflight lint --format json` output.
pub fn parse_preflight_output(output: &str) -> Result<Vec<LintMessage>> {
    let report: TroubleshootReport<PreflightIssue> = decode_json(Tool::Preflight, output)?;
    Ok(normalize(&report))
}

/// Parse `support-bundle lint --format json` output.
pub fn parse_support_bundle_output(output: &str) -> Result<Vec<LintMessage>> {
    let report: TroubleshootReport<SupportBundleIssue> = decode_json(Tool::SupportBundle, output)?;
    Ok(normalize(&report))
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = r#"Linting specs...
{
  "results": [
    {
      "filePath": "preflight.yaml",
      "errors": [{"line": 12, "column": 3, "message": "analyzer is required", "field": "spec.analyzers"}],
      "warnings": [{"line": 0, "message": "no collectors defined"}],
      "infos": null
    },
    {
      "filePath": "other.yaml",
      "errors": [],
      "warnings": [],
      "infos": [{"message": "uses v1beta2"}]
    }
  ]
}
"#;

    #[test]
    fn normalizes_in_file_then_severity_order() {
        let messages = parse_preflight_output(REPORT).unwrap();
        assert_eq!(
            messages,
            vec![
                LintMessage::new(
                    Severity::Error,
                    "preflight.yaml",
                    "line 12: analyzer is required (field: spec.analyzers)"
                ),
                LintMessage::new(Severity::Warning, "preflight.yaml", "no collectors defined"),
                LintMessage::new(Severity::Info, "other.yaml", "uses v1beta2"),
            ]
        );
    }

    #[test]
    fn support_bundle_uses_same_shape() {
        let output = r#"{"results": [{"filePath": "sb.yaml", "errors": [{"line": 4, "message": "bad"}]}]}"#;
        let messages = parse_support_bundle_output(output).unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].message, "line 4: bad");
        assert_eq!(messages[0].path, "sb.yaml");
    }

    #[test]
    fn empty_results_are_fine() {
        assert!(parse_preflight_output(r#"{"results": []}"#).unwrap().is_empty());
    }

    #[test]
    fn output_without_report_is_an_error() {
        assert!(parse_preflight_output("Error: unknown flag --format").is_err());
        assert!(parse_support_bundle_output(r#"{"status": "ok"}"#).is_err());
    }

    #[test]
    fn field_without_line() {
        let issue = SupportBundleIssue {
            message: "missing".into(),
            field: "spec.collectors".into(),
            ..Default::default()
        };
        assert_eq!(format_issue(&issue), "missing (field: spec.collectors)");
    }
}
