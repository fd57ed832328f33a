//! Cross-check configured charts against discovered HelmChart manifests.

use std::collections::HashSet;
use std::path::PathBuf;

use tracing::warn;

use crate::error::{MissingChart, MissingChartsError, Result};
use crate::validation::chart::ChartMetadata;
use crate::validation::helmchart::ManifestIndex;

/// A non-fatal finding from chart mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    /// `name:chartVersion` of the unclaimed manifest.
    pub key: String,
    pub source_file: PathBuf,
    pub message: String,
}

/// Require a HelmChart manifest for every chart.
///
/// Every chart without a manifest is reported in one
/// [`MissingChartsError`]. Manifests no chart claims come back as
/// warnings, in key order.
pub fn validate_chart_mapping(
    charts: &[ChartMetadata],
    index: &ManifestIndex,
) -> Result<Vec<ValidationWarning>> {
    let mut claimed = HashSet::new();
    let mut missing = Vec::new();

    for chart in charts {
        let key = chart.key();
        if index.contains_key(&key) {
            claimed.insert(key);
        } else {
            missing.push(MissingChart {
                path: chart.path.clone(),
                name: chart.name.clone(),
                version: chart.version.clone(),
            });
        }
    }

    if !missing.is_empty() {
        return Err(MissingChartsError { missing }.into());
    }

    let warnings = index
        .iter()
        .filter(|(key, _)| !claimed.contains(*key))
        .map(|(key, manifest)| {
            let message = format!(
                "HelmChart manifest at {:?} ({}) has no corresponding chart configured",
                manifest.source_file.display().to_string(),
                key
            );
            warn!("{}", message);
            ValidationWarning {
                key: key.clone(),
                source_file: manifest.source_file.clone(),
                message,
            }
        })
        .collect();

    Ok(warnings)
}
