//! Run linter binaries against individual resources.
//!
//! One process per resource, waited on before returning. Success is the
//! linter's exit status; findings come from its output either way.

use std::ffi::OsStr;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::Command;

use serde::Deserialize;
use serde_yaml::Value;
use tracing::debug;

use crate::error::{LintError, Result};
use crate::lint::embedded_cluster::parse_embedded_cluster_output;
use crate::lint::helm::parse_helm_output;
use crate::lint::kots::parse_kots_output;
use crate::lint::message::{LintMessage, LintResult};
use crate::lint::troubleshoot::{parse_preflight_output, parse_support_bundle_output};
use crate::tools::Tool;
use crate::validation::ManifestIndex;

/// Combined output and exit status of one linter run.
struct Invocation {
    success: bool,
    output: String,
}

fn ensure_exists(tool: Tool, path: &Path) -> Result<()> {
    match fs::metadata(path) {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(LintError::Discovery {
            pattern: path.display().to_string(),
            message: format!("{} input path does not exist", tool),
        }),
        Err(e) => Err(e.into()),
    }
}

fn invoke(tool: Tool, binary: &Path, args: &[&OsStr]) -> Result<Invocation> {
    debug!("Running {} {:?}", binary.display(), args);
    let output = Command::new(binary)
        .args(args)
        .output()
        .map_err(|e| LintError::ToolExecution {
            tool: tool.to_string(),
            message: format!("{}: {}", binary.display(), e),
        })?;

    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));
    Ok(Invocation {
        success: output.status.success(),
        output: combined,
    })
}

/// Attach the raw output to a parse failure.
fn parse_with_context(
    tool: Tool,
    run: &Invocation,
    parse: impl Fn(&str) -> Result<Vec<LintMessage>>,
) -> Result<LintResult> {
    match parse(&run.output) {
        Ok(messages) => Ok(LintResult {
            success: run.success,
            messages,
        }),
        Err(e) => {
            let reason = match e {
                LintError::OutputParse { message, .. } => message,
                other => other.to_string(),
            };
            let message = if run.success {
                format!("{}\nOutput: {}", reason, run.output)
            } else {
                format!("lint failed and output parsing failed: {}\nOutput: {}", reason, run.output)
            };
            Err(LintError::OutputParse {
                tool: tool.to_string(),
                message,
            })
        }
    }
}

/// `helm lint <chart>`.
pub fn lint_chart(helm: &Path, chart_dir: &Path) -> Result<LintResult> {
    ensure_exists(Tool::Helm, chart_dir)?;
    let run = invoke(Tool::Helm, helm, &[OsStr::new("lint"), chart_dir.as_os_str()])?;
    let messages = parse_helm_output(&run.output);

    if !run.success && messages.is_empty() {
        return Err(LintError::ToolExecution {
            tool: Tool::Helm.to_string(),
            message: format!("helm lint failed\n{}", run.output),
        });
    }
    Ok(LintResult {
        success: run.success,
        messages,
    })
}

/// Whether a preflight spec uses the templated `v1beta3` API.
pub fn is_preflight_v1beta3(spec_path: &Path) -> Result<bool> {
    let content = fs::read_to_string(spec_path)?;

    for document in serde_yaml::Deserializer::from_str(&content) {
        let Ok(value) = Value::deserialize(document) else {
            break;
        };
        let kind = value.get("kind").and_then(Value::as_str);
        let api = value.get("apiVersion").and_then(Value::as_str).unwrap_or("");
        if kind == Some("Preflight") && api.contains("v1beta3") {
            return Ok(true);
        }
    }

    let has_kind = content.contains("kind: Preflight") || content.contains("kind:Preflight");
    Ok(has_kind && content.contains("v1beta3"))
}

/// Inputs for one preflight lint.
#[derive(Debug, Clone, Copy)]
pub struct PreflightInput<'a> {
    pub spec_path: &'a Path,
    pub values_path: Option<&'a Path>,
    /// `name:version` of the chart whose builder values apply.
    pub chart_key: Option<&'a str>,
}

/// `preflight lint --format json [--values ...] <spec>`.
///
/// Builder values from the chart's HelmChart manifest are passed as an
/// extra values file. A `v1beta3` spec needs at least one manifest.
pub fn lint_preflight(
    preflight: &Path,
    input: PreflightInput<'_>,
    manifests: &ManifestIndex,
) -> Result<LintResult> {
    ensure_exists(Tool::Preflight, input.spec_path)?;

    if is_preflight_v1beta3(input.spec_path)? && manifests.is_empty() {
        return Err(LintError::ConfigValidation {
            message: format!(
                "v1beta3 preflight spec {} requires HelmChart manifests\nCheck that your manifests paths include the HelmChart definition",
                input.spec_path.display()
            ),
        });
    }

    let mut args: Vec<&OsStr> = vec![OsStr::new("lint"), OsStr::new("--format"), OsStr::new("json")];
    if let Some(values) = input.values_path {
        args.push(OsStr::new("--values"));
        args.push(values.as_os_str());
    }

    let builder = input
        .chart_key
        .and_then(|key| manifests.get(key))
        .filter(|manifest| !manifest.builder_values.is_empty());

    // Held until the process exits; removed on drop.
    let builder_file = match builder {
        Some(manifest) => {
            let mut file = tempfile::Builder::new()
                .prefix("replicated-builder-")
                .suffix(".yaml")
                .tempfile()?;
            let yaml = serde_yaml::to_string(&manifest.builder_values)
                .map_err(|e| anyhow::anyhow!("failed to marshal builder values: {}", e))?;
            file.write_all(yaml.as_bytes())?;
            file.flush()?;
            Some(file)
        }
        None => None,
    };
    if let Some(file) = &builder_file {
        args.push(OsStr::new("--values"));
        args.push(file.path().as_os_str());
    }

    args.push(input.spec_path.as_os_str());
    let run = invoke(Tool::Preflight, preflight, &args)?;
    parse_with_context(Tool::Preflight, &run, parse_preflight_output)
}

/// `support-bundle lint --format json <spec>`.
pub fn lint_support_bundle(support_bundle: &Path, spec_path: &Path) -> Result<LintResult> {
    ensure_exists(Tool::SupportBundle, spec_path)?;
    let run = invoke(
        Tool::SupportBundle,
        support_bundle,
        &[OsStr::new("lint"), OsStr::new("--format"), OsStr::new("json"), spec_path.as_os_str()],
    )?;
    parse_with_context(Tool::SupportBundle, &run, parse_support_bundle_output)
}

/// `kots lint --output json <path>`.
pub fn lint_kots(kots: &Path, path: &Path) -> Result<LintResult> {
    ensure_exists(Tool::Kots, path)?;
    let run = invoke(
        Tool::Kots,
        kots,
        &[OsStr::new("lint"), OsStr::new("--output"), OsStr::new("json"), path.as_os_str()],
    )?;
    parse_with_context(Tool::Kots, &run, parse_kots_output)
}

/// `embedded-cluster lint --output json <config>`.
pub fn lint_embedded_cluster(embedded_cluster: &Path, config_path: &Path) -> Result<LintResult> {
    ensure_exists(Tool::EmbeddedCluster, config_path)?;
    let run = invoke(
        Tool::EmbeddedCluster,
        embedded_cluster,
        &[OsStr::new("lint"), OsStr::new("--output"), OsStr::new("json"), config_path.as_os_str()],
    )?;
    parse_with_context(Tool::EmbeddedCluster, &run, parse_embedded_cluster_output)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::lint::message::Severity;
    use crate::validation::HelmChartManifest;
    use serde_yaml::Mapping;
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Write an executable shell script standing in for a linter.
    fn fake_linter(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn spec(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn helm_success_with_info_messages() {
        let temp = TempDir::new().unwrap();
        let helm = fake_linter(
            temp.path(),
            "helm",
            "echo '==> Linting'; echo '[INFO] Chart.yaml: icon is recommended'",
        );
        let chart = temp.path().join("chart");
        fs::create_dir(&chart).unwrap();

        let result = lint_chart(&helm, &chart).unwrap();
        assert!(result.success);
        assert_eq!(result.messages.len(), 1);
        assert_eq!(result.messages[0].severity, Severity::Info);
    }

    #[test]
    fn helm_failure_without_findings_is_an_error() {
        let temp = TempDir::new().unwrap();
        let helm = fake_linter(temp.path(), "helm", "echo 'Error: boom' >&2; exit 1");
        let chart = temp.path().join("chart");
        fs::create_dir(&chart).unwrap();

        let err = lint_chart(&helm, &chart).unwrap_err();
        assert!(err.to_string().contains("Error: boom"));
    }

    #[test]
    fn missing_input_is_checked_before_running() {
        let temp = TempDir::new().unwrap();
        let helm = fake_linter(temp.path(), "helm", "exit 0");
        let err = lint_chart(&helm, &temp.path().join("nope")).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn support_bundle_nonzero_exit_keeps_messages() {
        let temp = TempDir::new().unwrap();
        let sb = fake_linter(
            temp.path(),
            "support-bundle",
            r#"echo 'linting...'; echo '{"results":[{"filePath":"sb.yaml","errors":[{"line":3,"message":"bad"}]}]}'; exit 1"#,
        );
        let spec = spec(temp.path(), "sb.yaml", "kind: SupportBundle\n");

        let result = lint_support_bundle(&sb, &spec).unwrap();
        assert!(!result.success);
        assert_eq!(result.messages[0].message, "line 3: bad");
    }

    #[test]
    fn unparseable_output_includes_raw_text() {
        let temp = TempDir::new().unwrap();
        let sb = fake_linter(temp.path(), "support-bundle", "echo 'segfault'; exit 2");
        let spec = spec(temp.path(), "sb.yaml", "kind: SupportBundle\n");

        let err = lint_support_bundle(&sb, &spec).unwrap_err();
        let text = err.to_string();
        assert!(text.contains("lint failed and output parsing failed"));
        assert!(text.contains("segfault"));
    }

    #[test]
    fn preflight_passes_values_and_builder_values() {
        let temp = TempDir::new().unwrap();
        // Echo the arguments back inside a JSON message.
        let preflight = fake_linter(
            temp.path(),
            "preflight",
            r#"printf '{"results":[{"filePath":"p.yaml","infos":[{"message":"%s"}]}]}' "$*""#,
        );
        let spec = spec(
            temp.path(),
            "p.yaml",
            "apiVersion: troubleshoot.sh/v1beta2\nkind: Preflight\n",
        );
        let values = spec_values(temp.path());

        let mut builder = Mapping::new();
        builder.insert("replicas".into(), 2.into());
        let mut index = ManifestIndex::new();
        index.insert(
            "web:1.0.0".to_string(),
            HelmChartManifest {
                name: "web".into(),
                chart_version: "1.0.0".into(),
                builder_values: builder,
                source_file: temp.path().join("helmchart.yaml"),
            },
        );

        let result = lint_preflight(
            &preflight,
            PreflightInput {
                spec_path: &spec,
                values_path: Some(&values),
                chart_key: Some("web:1.0.0"),
            },
            &index,
        )
        .unwrap();

        let args = &result.messages[0].message;
        assert!(args.starts_with("lint --format json --values"));
        assert!(args.contains(&values.display().to_string()));
        assert!(args.contains("replicated-builder-"));
        assert!(args.ends_with(&spec.display().to_string()));
    }

    fn spec_values(dir: &Path) -> PathBuf {
        spec(dir, "values.yaml", "replicas: 1\n")
    }

    #[test]
    fn v1beta3_preflight_requires_manifests() {
        let temp = TempDir::new().unwrap();
        let preflight = fake_linter(temp.path(), "preflight", "exit 0");
        let spec = spec(
            temp.path(),
            "p.yaml",
            "apiVersion: troubleshoot.sh/v1beta3\nkind: Preflight\n",
        );

        let err = lint_preflight(
            &preflight,
            PreflightInput {
                spec_path: &spec,
                values_path: None,
                chart_key: None,
            },
            &ManifestIndex::new(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("requires HelmChart manifests"));
    }

    #[test]
    fn kots_and_embedded_cluster_use_output_flag() {
        let temp = TempDir::new().unwrap();
        let kots = fake_linter(
            temp.path(),
            "kots",
            r#"test "$2" = "--output" || exit 9; echo '{"lintExpressions":[{"type":"warn","message":"m","path":"a.yaml"}]}'"#,
        );
        let ec = fake_linter(
            temp.path(),
            "embedded-cluster",
            r#"test "$3" = "json" || exit 9; echo '{"files":[]}'"#,
        );
        let target = spec(temp.path(), "a.yaml", "kind: Config\n");

        let kots_result = lint_kots(&kots, &target).unwrap();
        assert!(kots_result.success);
        assert_eq!(kots_result.messages[0].severity, Severity::Warning);

        let ec_result = lint_embedded_cluster(&ec, &target).unwrap();
        assert!(ec_result.success);
        assert!(ec_result.messages.is_empty());
    }

    #[test]
    fn missing_binary_is_an_execution_error() {
        let temp = TempDir::new().unwrap();
        let target = spec(temp.path(), "a.yaml", "kind: Config\n");
        let err = lint_kots(&temp.path().join("no-such-kots"), &target).unwrap_err();
        assert!(matches!(err, LintError::ToolExecution { .. }));
    }
}
