//! Index of `kind: HelmChart` manifests keyed by `name:chartVersion`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use tracing::debug;

use crate::discovery::{discover_manifest_files, GitignoreChecker, ResourceKind};
use crate::error::{LintError, Result};
use crate::validation::scalar_text;

/// One HelmChart document.
#[derive(Debug, Clone, PartialEq)]
pub struct HelmChartManifest {
    /// `spec.chart.name`, matched against the chart's own name.
    pub name: String,
    /// `spec.chart.chartVersion`, matched against the chart's version.
    pub chart_version: String,
    /// `spec.builder`, values used to render the chart offline. May be empty.
    pub builder_values: Mapping,
    pub source_file: PathBuf,
}

impl HelmChartManifest {
    pub fn key(&self) -> String {
        format!("{}:{}", self.name, self.chart_version)
    }
}

/// HelmChart manifests by `name:chartVersion`.
pub type ManifestIndex = BTreeMap<String, HelmChartManifest>;

fn text_at(value: &Value, path: &[&str]) -> Option<String> {
    path.iter()
        .try_fold(value, |v, key| v.get(*key))
        .and_then(scalar_text)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Every complete HelmChart document in a YAML stream.
///
/// Documents of other kinds, or missing `spec.chart.name` or
/// `spec.chart.chartVersion`, are skipped. A malformed document ends the
/// scan of that stream; documents before it are kept.
pub fn parse_helmchart_documents(content: &str, source_file: &Path) -> Vec<HelmChartManifest> {
    let mut manifests = Vec::new();

    for document in serde_yaml::Deserializer::from_str(content) {
        let value = match Value::deserialize(document) {
            Ok(value) => value,
            Err(e) => {
                debug!("Stopped reading {}: {}", source_file.display(), e);
                break;
            }
        };

        if value.get("kind").and_then(Value::as_str) != Some(ResourceKind::HelmChart.as_str()) {
            continue;
        }

        let name = text_at(&value, &["spec", "chart", "name"]);
        let version = text_at(&value, &["spec", "chart", "chartVersion"]);
        let (Some(name), Some(version)) = (name, version) else {
            debug!(
                "Skipping HelmChart in {} without spec.chart.name and spec.chart.chartVersion",
                source_file.display()
            );
            continue;
        };

        let builder_values = value
            .get("spec")
            .and_then(|spec| spec.get("builder"))
            .and_then(Value::as_mapping)
            .cloned()
            .unwrap_or_default();

        manifests.push(HelmChartManifest {
            name,
            chart_version: version,
            builder_values,
            source_file: source_file.to_path_buf(),
        });
    }

    manifests
}

/// Add manifests to the index, failing on the first repeated key.
pub fn insert_unique(index: &mut ManifestIndex, manifests: Vec<HelmChartManifest>) -> Result<()> {
    for manifest in manifests {
        let key = manifest.key();
        if let Some(existing) = index.get(&key) {
            return Err(LintError::DuplicateManifest {
                key,
                first: existing.source_file.clone(),
                second: manifest.source_file,
            });
        }
        index.insert(key, manifest);
    }
    Ok(())
}

/// Scan every file matched by `patterns` for HelmChart manifests.
///
/// # Errors
///
/// Fails when no patterns are configured, when a pattern is invalid, or
/// when two documents share a `name:chartVersion` key.
pub fn discover_helmchart_manifests(
    patterns: &[String],
    gitignore: Option<&GitignoreChecker>,
) -> Result<ManifestIndex> {
    if patterns.is_empty() {
        return Err(LintError::ConfigValidation {
            message: "no manifests configured - cannot discover HelmChart resources".to_string(),
        });
    }

    let mut index = ManifestIndex::new();
    for file in discover_manifest_files(patterns, gitignore)? {
        let content = match fs::read_to_string(&file) {
            Ok(content) => content,
            Err(e) => {
                debug!("Skipping unreadable {}: {}", file.display(), e);
                continue;
            }
        };
        insert_unique(&mut index, parse_helmchart_documents(&content, &file))?;
    }

    debug!("Found {} HelmChart manifest(s)", index.len());
    Ok(index)
}
