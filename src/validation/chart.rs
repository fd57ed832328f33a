//! Chart identity from `Chart.yaml`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_yaml::Value;

use crate::discovery::CHART_MARKERS;
use crate::error::{LintError, Result};
use crate::validation::scalar_text;

/// A chart directory with the name and version it declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartMetadata {
    pub path: PathBuf,
    pub name: String,
    pub version: String,
}

impl ChartMetadata {
    /// Manifest index key, `name:version`.
    pub fn key(&self) -> String {
        format!("{}:{}", self.name, self.version)
    }
}

#[derive(Debug, Default, Deserialize)]
struct ChartFile {
    #[serde(default)]
    name: Value,
    #[serde(default)]
    version: Value,
}

/// Read `Chart.yaml` (or `Chart.yml`) from a chart directory.
///
/// Both `name` and `version` must be present and non-empty.
pub fn read_chart_metadata(chart_dir: &Path) -> Result<ChartMetadata> {
    let metadata_error = |message: String| LintError::ChartMetadata {
        path: chart_dir.to_path_buf(),
        message,
    };

    let content = CHART_MARKERS
        .iter()
        .find_map(|marker| fs::read_to_string(chart_dir.join(marker)).ok())
        .ok_or_else(|| metadata_error("failed to read Chart.yaml or Chart.yml".to_string()))?;

    let chart: ChartFile = serde_yaml::from_str::<Option<ChartFile>>(&content)
        .map_err(|e| metadata_error(format!("failed to parse Chart.yaml: {}", e)))?
        .unwrap_or_default();

    let name = scalar_text(&chart.name).unwrap_or_default();
    let version = scalar_text(&chart.version).unwrap_or_default();

    if name.trim().is_empty() {
        return Err(metadata_error("chart name is empty in Chart.yaml".to_string()));
    }
    if version.trim().is_empty() {
        return Err(metadata_error("chart version is empty in Chart.yaml".to_string()));
    }

    Ok(ChartMetadata {
        path: chart_dir.to_path_buf(),
        name: name.trim().to_string(),
        version: version.trim().to_string(),
    })
}

/// Read metadata for every chart directory, failing on the first bad one.
pub fn read_all_chart_metadata(chart_dirs: &[PathBuf]) -> Result<Vec<ChartMetadata>> {
    chart_dirs
        .iter()
        .map(|dir| read_chart_metadata(dir))
        .collect()
}
