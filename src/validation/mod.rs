//! Chart and HelmChart manifest cross-validation.
//!
//! Every configured chart must have a `kind: HelmChart` manifest whose
//! `spec.chart.name` and `spec.chart.chartVersion` match its `Chart.yaml`.
//! Missing manifests fail together; unclaimed manifests only warn.

pub mod chart;
pub mod helmchart;
pub mod mapping;

pub use chart::{read_all_chart_metadata, read_chart_metadata, ChartMetadata};
pub use helmchart::{
    discover_helmchart_manifests, parse_helmchart_documents, HelmChartManifest, ManifestIndex,
};
pub use mapping::{validate_chart_mapping, ValidationWarning};

use serde_yaml::Value;

/// Text of a YAML scalar. Numbers and booleans are rendered to text so
/// `chartVersion: 1.5` matches a `1.5` chart version.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars_render_as_text() {
        assert_eq!(scalar_text(&Value::from("web")), Some("web".to_string()));
        assert_eq!(scalar_text(&Value::from(2)), Some("2".to_string()));
        assert_eq!(scalar_text(&Value::from(1.5)), Some("1.5".to_string()));
        assert_eq!(scalar_text(&Value::Null), None);
    }
}
