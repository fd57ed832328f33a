//! Embedded cluster configs: detection, version pinning and report parsing.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_yaml::Value;

use crate::error::{LintError, Result};
use crate::lint::extract::{extract_json, null_as_default};
use crate::lint::message::{LintMessage, Severity};
use crate::tools::Tool;

/// API group of embedded cluster `Config` resources.
pub const EC_API_GROUP: &str = "embeddedcluster.replicated.com";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EcReport {
    #[serde(default, deserialize_with = "null_as_default")]
    pub files: Vec<EcFileResult>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EcFileResult {
    pub path: String,
    pub valid: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub errors: Vec<EcIssue>,
    #[serde(deserialize_with = "null_as_default")]
    pub warnings: Vec<EcIssue>,
    #[serde(deserialize_with = "null_as_default")]
    pub infos: Vec<EcIssue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EcIssue {
    pub field: String,
    pub message: String,
}

impl EcIssue {
    fn render(&self) -> String {
        if self.field.is_empty() {
            self.message.clone()
        } else {
            format!("{}: {}", self.field, self.message)
        }
    }
}

/// Parse `embedded-cluster lint --output json` output.
pub fn parse_embedded_cluster_output(output: &str) -> Result<Vec<LintMessage>> {
    if output.trim().is_empty() {
        return Ok(Vec::new());
    }
    let json = extract_json(Tool::EmbeddedCluster, output)?;
    let report: EcReport = serde_json::from_str(json).map_err(|e| LintError::OutputParse {
        tool: Tool::EmbeddedCluster.to_string(),
        message: format!("failed to unmarshal JSON output: {}", e),
    })?;

    let mut messages = Vec::new();
    for file in &report.files {
        for (severity, issues) in [
            (Severity::Error, &file.errors),
            (Severity::Warning, &file.warnings),
            (Severity::Info, &file.infos),
        ] {
            messages.extend(
                issues
                    .iter()
                    .map(|issue| LintMessage::new(severity, &file.path, issue.render())),
            );
        }
    }
    Ok(messages)
}

fn is_ec_config_doc(value: &Value) -> bool {
    value.get("kind").and_then(Value::as_str) == Some("Config")
        && value
            .get("apiVersion")
            .and_then(Value::as_str)
            .is_some_and(|v| v.contains(EC_API_GROUP))
}

fn looks_like_ec_config(content: &str) -> bool {
    (content.contains("kind: Config") || content.contains("kind:Config"))
        && content.contains(EC_API_GROUP)
}

/// Whether a YAML stream holds an embedded cluster `Config`.
///
/// Templated files that do not parse are matched on their text.
pub fn is_embedded_cluster_config(content: &str) -> bool {
    for document in serde_yaml::Deserializer::from_str(content) {
        match Value::deserialize(document) {
            Ok(value) if is_ec_config_doc(&value) => return true,
            Ok(_) => {}
            Err(_) => return looks_like_ec_config(content),
        }
    }
    false
}

/// The embedded cluster version pinned in a config's `spec.version`.
///
/// Falls back to the first literal `version:` line when the file is a
/// template that does not parse as YAML.
pub fn extract_ec_version(config_path: &Path) -> Result<String> {
    let version_error = |message: &str| LintError::Discovery {
        pattern: config_path.display().to_string(),
        message: message.to_string(),
    };

    let content = fs::read_to_string(config_path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            version_error("embedded cluster config does not exist")
        } else {
            LintError::Io(e)
        }
    })?;

    for document in serde_yaml::Deserializer::from_str(&content) {
        let Ok(value) = Value::deserialize(document) else {
            break;
        };
        if is_ec_config_doc(&value) {
            return value
                .get("spec")
                .and_then(|spec| spec.get("version"))
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .ok_or_else(|| version_error("embedded cluster config missing spec.version field"));
        }
    }

    if !looks_like_ec_config(&content) {
        return Err(version_error(
            "file does not appear to be an embedded cluster config",
        ));
    }

    content
        .lines()
        .filter_map(|line| line.trim().strip_prefix("version:"))
        .map(|v| v.trim().trim_matches(|c| c == '"' || c == '\''))
        .find(|v| !v.is_empty() && !v.contains("{{"))
        .map(str::to_string)
        .ok_or_else(|| version_error("embedded cluster config missing spec.version field"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const CONFIG: &str = "apiVersion: embeddedcluster.replicated.com/v1beta1\nkind: Config\nspec:\n  version: 2.1.3+k8s-1.30\n";

    fn write(temp: &TempDir, content: &str) -> std::path::PathBuf {
        let path = temp.path().join("ec.yaml");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn parses_file_buckets() {
        let output = r#"{"files": [{"path": "ec.yaml", "valid": false,
            "errors": [{"field": "spec.version", "message": "required"}],
            "warnings": [{"field": "", "message": "unknown extension"}]}]}"#;
        let messages = parse_embedded_cluster_output(output).unwrap();
        assert_eq!(
            messages,
            vec![
                LintMessage::new(Severity::Error, "ec.yaml", "spec.version: required"),
                LintMessage::new(Severity::Warning, "ec.yaml", "unknown extension"),
            ]
        );
    }

    #[test]
    fn detects_config_documents() {
        assert!(is_embedded_cluster_config(&format!("kind: ConfigMap\n---\n{}", CONFIG)));
        assert!(!is_embedded_cluster_config("apiVersion: v1\nkind: Config\n"));
    }

    #[test]
    fn reads_spec_version() {
        let temp = TempDir::new().unwrap();
        let path = write(&temp, CONFIG);
        assert_eq!(extract_ec_version(&path).unwrap(), "2.1.3+k8s-1.30");
    }

    #[test]
    fn templated_config_falls_back_to_text() {
        let temp = TempDir::new().unwrap();
        let path = write(
            &temp,
            "apiVersion: embeddedcluster.replicated.com/v1beta1\nkind: Config\nspec:\n  version: \"2.0.0\"\n  roles: [{{ repl ConfigOption \"roles\" }}\n",
        );
        assert_eq!(extract_ec_version(&path).unwrap(), "2.0.0");
    }

    #[test]
    fn missing_version_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = write(
            &temp,
            "apiVersion: embeddedcluster.replicated.com/v1beta1\nkind: Config\nspec: {}\n",
        );
        assert!(extract_ec_version(&path)
            .unwrap_err()
            .to_string()
            .contains("missing spec.version"));
    }
}
