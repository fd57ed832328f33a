//! Parsing of `kots lint --output json` reports.

use serde::Deserialize;

use crate::error::{LintError, Result};
use crate::lint::extract::{extract_json, null_as_default};
use crate::lint::message::{LintMessage, Severity};
use crate::tools::Tool;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KotsReport {
    #[serde(default, deserialize_with = "null_as_default")]
    pub lint_expressions: Vec<KotsExpression>,
    #[serde(default)]
    pub is_linting_complete: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct KotsExpression {
    pub rule: String,
    /// `error`, `warn` or `info`.
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    pub path: String,
    #[serde(deserialize_with = "null_as_default")]
    pub positions: Vec<KotsPosition>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct KotsPosition {
    pub start: KotsLine,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct KotsLine {
    pub line: i64,
}

/// Map a kots expression type to a severity; unknown types are info.
pub fn normalize_severity(kind: &str) -> Severity {
    match kind.to_ascii_lowercase().as_str() {
        "error" => Severity::Error,
        "warn" => Severity::Warning,
        _ => Severity::Info,
    }
}

/// Render as `[rule] line N: message`.
pub fn format_expression(expr: &KotsExpression) -> String {
    let mut message = expr.message.clone();
    if let Some(line) = expr.positions.first().map(|p| p.start.line).filter(|l| *l > 0) {
        message = format!("line {}: {}", line, message);
    }
    if !expr.rule.is_empty() {
        message = format!("[{}] {}", expr.rule, message);
    }
    message
}

/// Parse kots lint output. Empty output means no findings.
pub fn parse_kots_output(output: &str) -> Result<Vec<LintMessage>> {
    if output.trim().is_empty() {
        return Ok(Vec::new());
    }
    let json = extract_json(Tool::Kots, output)?;
    let report: KotsReport = serde_json::from_str(json).map_err(|e| LintError::OutputParse {
        tool: Tool::Kots.to_string(),
        message: format!("failed to unmarshal JSON output: {}", e),
    })?;

    Ok(report
        .lint_expressions
        .iter()
        .map(|expr| {
            LintMessage::new(
                normalize_severity(&expr.kind),
                &expr.path,
                format_expression(expr),
            )
        })
        .collect())
}
