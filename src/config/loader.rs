//! Configuration file discovery and loading.
//!
//! Resolution walks upward from a starting directory, collecting at most
//! one `.replicated` file per directory. Each file is parsed on its own and
//! has its relative paths anchored at its own directory before the chain is
//! merged from the outermost file inward.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::merger::{dedup_resources, merge_configs};
use crate::config::paths::{absolutize, resolve_against};
use crate::config::schema::{LintSettings, ProjectConfig, LATEST};
use crate::config::validator::validate;
use crate::error::{LintError, Result};
use crate::tools::Tool;

/// File names probed in each directory, in priority order.
pub const CONFIG_FILE_NAMES: [&str; 2] = [".replicated", ".replicated.yaml"];

/// Find every config file from `start` up to the filesystem root.
///
/// Returns paths ordered outermost first.
pub fn find_config_files(start: &Path) -> Vec<PathBuf> {
    let mut found = Vec::new();
    let mut current = start.to_path_buf();

    loop {
        if let Some(path) = CONFIG_FILE_NAMES
            .iter()
            .map(|name| current.join(name))
            .find(|path| path.is_file())
        {
            found.push(path);
        }

        if !current.pop() {
            break;
        }
    }

    found.reverse();
    found
}

/// Find the directory holding the innermost config file.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    find_config_files(start)
        .pop()
        .and_then(|p| p.parent().map(Path::to_path_buf))
}

/// Load a single config file with its paths resolved against its directory.
///
/// # Errors
///
/// Returns `ConfigParse` if the YAML is invalid.
pub fn load_config_file(path: &Path) -> Result<ProjectConfig> {
    let content = fs::read_to_string(path)?;
    let mut config = parse_config(&content, path)?;
    if let Some(dir) = path.parent() {
        resolve_paths(&mut config, dir);
    }
    Ok(config)
}

/// Parse YAML (or JSON) content into a ProjectConfig.
///
/// An empty document yields an empty config.
///
/// # Arguments
///
/// * `content` - The YAML content to parse
/// * `source_path` - Path for error reporting
pub fn parse_config(content: &str, source_path: &Path) -> Result<ProjectConfig> {
    let parse_error = |e: serde_yaml::Error| LintError::ConfigParse {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    };

    let value: serde_yaml::Value = serde_yaml::from_str(content).map_err(parse_error)?;
    if value.is_null() {
        return Ok(ProjectConfig::default());
    }
    serde_yaml::from_value(value).map_err(parse_error)
}

/// Anchor every chart, preflight, values and manifest path at `base_dir`.
pub fn resolve_paths(config: &mut ProjectConfig, base_dir: &Path) {
    for chart in &mut config.charts {
        if !chart.path.is_empty() {
            chart.path = resolve_against(base_dir, &chart.path);
        }
    }
    for preflight in &mut config.preflights {
        if !preflight.path.is_empty() {
            preflight.path = resolve_against(base_dir, &preflight.path);
        }
        if let Some(values) = preflight.values_path.as_mut().filter(|v| !v.is_empty()) {
            *values = resolve_against(base_dir, values);
        }
    }
    for pattern in &mut config.manifests {
        if !pattern.is_empty() {
            *pattern = resolve_against(base_dir, pattern);
        }
    }
}

/// Fill in lint settings the config did not set.
pub fn apply_defaults(config: &mut ProjectConfig) {
    let lint = config.repl_lint.get_or_insert_with(LintSettings::default);
    lint.version.get_or_insert(1);
    lint.enabled.get_or_insert(true);

    for tool in Tool::ALL {
        let linter = lint.linters.get_mut(tool);
        linter.disabled.get_or_insert(!tool.enabled_by_default());
        linter.strict.get_or_insert(false);

        lint.tools
            .entry(tool.name().to_string())
            .or_insert_with(|| LATEST.to_string());
    }
}

/// Resolve the effective configuration for `start`.
///
/// If `start` is a file it is loaded on its own. Otherwise every config
/// file from `start` up to the root is merged, parent first. Finding no
/// config at all is not an error and yields a defaulted empty config.
///
/// # Errors
///
/// Returns `ConfigParse` naming the offending file, or `ConfigValidation`
/// if the merged result is invalid.
pub fn resolve_config(start: Option<&Path>) -> Result<ProjectConfig> {
    let start = match start {
        Some(path) => absolutize(path)?,
        None => absolutize(Path::new("."))?,
    };

    let mut config = if start.is_file() {
        debug!("Loading config file {}", start.display());
        load_config_file(&start)?
    } else {
        let files = find_config_files(&start);
        debug!(
            "Found {} config file(s) above {}",
            files.len(),
            start.display()
        );
        let configs = files
            .iter()
            .map(|path| load_config_file(path))
            .collect::<Result<Vec<_>>>()?;
        merge_configs(&configs)
    };

    apply_defaults(&mut config);
    dedup_resources(&mut config);
    validate(&config)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &Path, name: &str, content: &str) -> PathBuf {
        fs::create_dir_all(dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn no_config_yields_defaults() {
        let temp = TempDir::new().unwrap();
        let config = resolve_config(Some(temp.path())).unwrap();

        assert!(config.charts.is_empty());
        let lint = config.lint_settings();
        assert_eq!(lint.version, Some(1));
        for tool in Tool::ALL {
            assert_eq!(lint.tool_version(tool), LATEST);
        }
        assert_eq!(lint.linters.helm.disabled, Some(false));
        assert_eq!(lint.linters.kots.disabled, Some(true));
    }

    #[test]
    fn single_config_paths_are_absolute() {
        let temp = TempDir::new().unwrap();
        write_config(
            temp.path(),
            ".replicated",
            "charts:\n  - path: ./charts/app\npreflights:\n  - path: preflight.yaml\n    valuesPath: ./values.yaml\nmanifests:\n  - ./manifests/*.yaml\n",
        );

        let config = resolve_config(Some(temp.path())).unwrap();
        let root = absolutize(temp.path()).unwrap();
        assert_eq!(
            PathBuf::from(&config.charts[0].path),
            root.join("charts/app")
        );
        assert_eq!(
            PathBuf::from(&config.preflights[0].path),
            root.join("preflight.yaml")
        );
        assert_eq!(
            config.preflights[0].values_path.as_deref().map(PathBuf::from),
            Some(root.join("values.yaml"))
        );
        assert!(Path::new(&config.manifests[0]).is_absolute());
    }

    #[test]
    fn yaml_extension_is_probed() {
        let temp = TempDir::new().unwrap();
        write_config(temp.path(), ".replicated.yaml", "appSlug: from-yaml\n");
        let config = resolve_config(Some(temp.path())).unwrap();
        assert_eq!(config.app_slug, "from-yaml");
    }

    #[test]
    fn primary_name_wins_within_directory() {
        let temp = TempDir::new().unwrap();
        write_config(temp.path(), ".replicated", "appSlug: primary\n");
        write_config(temp.path(), ".replicated.yaml", "appSlug: secondary\n");
        let config = resolve_config(Some(temp.path())).unwrap();
        assert_eq!(config.app_slug, "primary");
    }

    #[test]
    fn nested_configs_resolve_against_own_directory() {
        let temp = TempDir::new().unwrap();
        let child = temp.path().join("apps").join("web");
        write_config(
            temp.path(),
            ".replicated",
            "appSlug: root\npromoteToChannelNames: [Stable]\ncharts:\n  - path: ./common\n",
        );
        write_config(
            &child,
            ".replicated",
            "appSlug: web\ncharts:\n  - path: ./chart\n",
        );

        let config = resolve_config(Some(&child)).unwrap();
        let root = absolutize(temp.path()).unwrap();
        let paths: Vec<_> = config.charts.iter().map(|c| PathBuf::from(&c.path)).collect();
        assert_eq!(
            paths,
            vec![root.join("common"), root.join("apps/web/chart")]
        );
        assert_eq!(config.app_slug, "web");
        assert_eq!(config.promote_to_channel_names, vec!["Stable"]);
    }

    #[test]
    fn duplicate_paths_across_chain_collapse() {
        let temp = TempDir::new().unwrap();
        let child = temp.path().join("sub");
        write_config(temp.path(), ".replicated", "charts:\n  - path: ./sub/chart\n");
        write_config(&child, ".replicated", "charts:\n  - path: ./chart\n");

        let config = resolve_config(Some(&child)).unwrap();
        assert_eq!(config.charts.len(), 1);
    }

    #[test]
    fn parse_error_names_file() {
        let temp = TempDir::new().unwrap();
        let child = temp.path().join("sub");
        write_config(temp.path(), ".replicated", "appSlug: ok\n");
        let bad = write_config(&child, ".replicated", "charts: [unclosed\n");

        let err = resolve_config(Some(&child)).unwrap_err();
        match err {
            LintError::ConfigParse { path, .. } => assert_eq!(path, bad),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn start_file_is_loaded_directly() {
        let temp = TempDir::new().unwrap();
        write_config(temp.path(), ".replicated", "appSlug: parent\n");
        let file = write_config(
            &temp.path().join("alt"),
            "custom.yaml",
            "charts:\n  - path: ./c\n",
        );

        let config = resolve_config(Some(&file)).unwrap();
        assert!(config.app_slug.is_empty());
        assert!(Path::new(&config.charts[0].path).is_absolute());
    }

    #[test]
    fn empty_file_is_empty_config() {
        let config = parse_config("# only a comment\n", Path::new(".replicated")).unwrap();
        assert_eq!(config, ProjectConfig::default());
    }

    #[test]
    fn json_content_is_accepted() {
        let config =
            parse_config(r#"{"appSlug": "json-app"}"#, Path::new(".replicated")).unwrap();
        assert_eq!(config.app_slug, "json-app");
    }

    #[test]
    fn invalid_tool_version_fails_resolution() {
        let temp = TempDir::new().unwrap();
        write_config(
            temp.path(),
            ".replicated",
            "repl-lint:\n  tools:\n    helm: not-a-version\n",
        );
        let err = resolve_config(Some(temp.path())).unwrap_err();
        assert!(matches!(err, LintError::ConfigValidation { .. }));
    }

    #[test]
    fn resolving_from_child_matches_manual_descent() {
        let temp = TempDir::new().unwrap();
        let mid = temp.path().join("a");
        let leaf = mid.join("b");
        write_config(temp.path(), ".replicated", "appSlug: r\ncharts:\n  - path: ./r\n");
        write_config(&mid, ".replicated", "releaseLabel: m\ncharts:\n  - path: ./m\n");
        write_config(&leaf, ".replicated", "appSlug: l\ncharts:\n  - path: ./l\n");

        let direct = resolve_config(Some(&leaf)).unwrap();

        let files = find_config_files(&absolutize(&leaf).unwrap());
        let loaded: Vec<_> = files.iter().map(|p| load_config_file(p).unwrap()).collect();
        let mut manual = crate::config::merger::merge(
            crate::config::merger::merge(loaded[0].clone(), &loaded[1]),
            &loaded[2],
        );
        apply_defaults(&mut manual);
        dedup_resources(&mut manual);

        assert_eq!(direct, manual);
    }
}
