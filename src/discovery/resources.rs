//! Resource discovery from configured patterns.
//!
//! Each pattern is either an explicit path, validated strictly, or a glob,
//! filtered leniently:
//!
//! - Charts are directories holding `Chart.yaml` or `Chart.yml`
//! - Preflight, SupportBundle and HelmChart specs are YAML files declaring
//!   the matching `kind`
//!
//! Explicit paths fail loudly when they do not point at the expected
//! resource. Glob matches that are not the expected resource are skipped.

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use crate::config::paths::clean;
use crate::discovery::gitignore::GitignoreChecker;
use crate::discovery::glob::{contains_glob, expand, ExpandOptions};
use crate::error::{LintError, Result};

/// Files that mark a directory as a Helm chart.
pub const CHART_MARKERS: [&str; 2] = ["Chart.yaml", "Chart.yml"];

/// Structured resource kinds discovered by content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Preflight,
    SupportBundle,
    HelmChart,
}

impl ResourceKind {
    /// The `kind:` value in YAML.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Preflight => "Preflight",
            Self::SupportBundle => "SupportBundle",
            Self::HelmChart => "HelmChart",
        }
    }

    fn description(&self) -> &'static str {
        match self {
            Self::Preflight => "preflight spec",
            Self::SupportBundle => "support bundle spec",
            Self::HelmChart => "HelmChart manifest",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn discovery_error(pattern: &str, message: impl Into<String>) -> LintError {
    LintError::Discovery {
        pattern: pattern.to_string(),
        message: message.into(),
    }
}

/// Drop the checker when the pattern names an ignored path on purpose.
fn effective_checker<'a>(
    pattern: &str,
    gitignore: Option<&'a GitignoreChecker>,
) -> Option<&'a GitignoreChecker> {
    gitignore.filter(|checker| {
        let bypass = checker.path_matches_ignored_pattern(pattern);
        if bypass {
            debug!("Pattern {} names an ignored path; not filtering", pattern);
        }
        !bypass
    })
}

/// Whether `dir` holds a chart marker file.
pub fn is_chart_directory(dir: &Path) -> bool {
    CHART_MARKERS.iter().any(|marker| dir.join(marker).is_file())
}

/// Discover Helm chart directories.
///
/// Supports patterns like `./charts/**`, `./charts/{app,api}/*`,
/// `./pkg/**/Chart.yaml`, or an explicit `./my-chart` directory.
pub fn discover_chart_paths(
    pattern: &str,
    gitignore: Option<&GitignoreChecker>,
) -> Result<Vec<PathBuf>> {
    if pattern.trim().is_empty() {
        return Err(discovery_error(pattern, "pattern cannot be empty"));
    }
    let cleaned = clean(Path::new(pattern));

    if !contains_glob(pattern) {
        if !cleaned.exists() {
            return Err(discovery_error(pattern, "path does not exist"));
        }
        if !cleaned.is_dir() {
            return Err(discovery_error(pattern, "path is not a directory"));
        }
        if !is_chart_directory(&cleaned) {
            return Err(discovery_error(
                pattern,
                format!(
                    "directory {} is not a valid Helm chart (no Chart.yaml or Chart.yml found)",
                    cleaned.display()
                ),
            ));
        }
        return Ok(vec![cleaned]);
    }

    let cleaned = cleaned.to_string_lossy().into_owned();
    let patterns: Vec<String> = if CHART_MARKERS.iter().any(|m| cleaned.ends_with(m)) {
        vec![cleaned]
    } else {
        CHART_MARKERS
            .iter()
            .map(|marker| format!("{}/{}", cleaned.trim_end_matches('/'), marker))
            .collect()
    };

    let options = ExpandOptions {
        files_only: true,
        gitignore: effective_checker(pattern, gitignore),
    };

    let mut seen = HashSet::new();
    let mut dirs = Vec::new();
    for p in &patterns {
        for marker in expand(p, options)? {
            let Some(dir) = marker.parent().map(Path::to_path_buf) else {
                continue;
            };
            if seen.insert(dir.clone()) {
                dirs.push(dir);
            }
        }
    }
    Ok(dirs)
}

/// Search patterns for YAML files under a user glob.
fn build_yaml_patterns(pattern: &str) -> Result<Vec<String>> {
    if pattern.ends_with(".yaml") || pattern.ends_with(".yml") {
        return Ok(vec![pattern.to_string()]);
    }
    if let Some(base) = pattern.strip_suffix("/*") {
        return Ok(vec![format!("{}/*.yaml", base), format!("{}/*.yml", base)]);
    }
    if pattern.ends_with("**") || pattern.contains('{') {
        return Ok(vec![
            format!("{}/*.yaml", pattern),
            format!("{}/*.yml", pattern),
        ]);
    }
    Err(discovery_error(
        pattern,
        "pattern must end with .yaml, .yml, *, or **",
    ))
}

fn has_yaml_extension(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// Whether any document in `content` declares `kind`.
///
/// Malformed YAML falls back to matching a `kind: <Kind>` line.
pub fn content_has_kind(content: &str, kind: &str) -> bool {
    for document in serde_yaml::Deserializer::from_str(content) {
        let value = match serde_yaml::Value::deserialize(document) {
            Ok(value) => value,
            Err(_) => {
                let line = format!(r"(?m)^kind:\s+{}\s*$", regex::escape(kind));
                return Regex::new(&line).is_ok_and(|re| re.is_match(content));
            }
        };
        if value.get("kind").and_then(|k| k.as_str()) == Some(kind) {
            return true;
        }
    }
    false
}

/// Whether the file at `path` declares `kind`.
pub fn has_kind(path: &Path, kind: ResourceKind) -> Result<bool> {
    let content = fs::read_to_string(path)?;
    Ok(content_has_kind(&content, kind.as_str()))
}

/// Discover YAML files declaring `kind`.
pub fn discover_yaml_by_kind(
    pattern: &str,
    kind: ResourceKind,
    gitignore: Option<&GitignoreChecker>,
) -> Result<Vec<PathBuf>> {
    if pattern.trim().is_empty() {
        return Err(discovery_error(pattern, "pattern cannot be empty"));
    }
    let cleaned = clean(Path::new(pattern));

    if !contains_glob(pattern) {
        if !has_yaml_extension(&cleaned) {
            return Err(discovery_error(pattern, "file must have .yaml or .yml extension"));
        }
        if !cleaned.exists() {
            return Err(discovery_error(pattern, "path does not exist"));
        }
        if cleaned.is_dir() {
            return Err(discovery_error(pattern, "path is a directory, expected a file"));
        }
        if !has_kind(&cleaned, kind)? {
            return Err(discovery_error(
                pattern,
                format!(
                    "file does not contain kind: {} (not a valid {})",
                    kind,
                    kind.description()
                ),
            ));
        }
        return Ok(vec![cleaned]);
    }

    let patterns = build_yaml_patterns(&cleaned.to_string_lossy())?;
    let options = ExpandOptions {
        files_only: true,
        gitignore: effective_checker(pattern, gitignore),
    };

    let mut seen = HashSet::new();
    let mut found = Vec::new();
    for p in &patterns {
        for path in expand(p, options)? {
            if !seen.insert(path.clone()) {
                continue;
            }
            match has_kind(&path, kind) {
                Ok(true) => found.push(path),
                Ok(false) => {}
                Err(e) => debug!("Skipping unreadable {}: {}", path.display(), e),
            }
        }
    }
    Ok(found)
}

/// Discover preflight specs.
pub fn discover_preflight_paths(
    pattern: &str,
    gitignore: Option<&GitignoreChecker>,
) -> Result<Vec<PathBuf>> {
    discover_yaml_by_kind(pattern, ResourceKind::Preflight, gitignore)
}

/// Discover support bundle specs.
pub fn discover_support_bundle_paths(
    pattern: &str,
    gitignore: Option<&GitignoreChecker>,
) -> Result<Vec<PathBuf>> {
    discover_yaml_by_kind(pattern, ResourceKind::SupportBundle, gitignore)
}

/// Discover support bundle specs across all manifest patterns.
///
/// No patterns means no support bundles; results are unique across patterns.
pub fn discover_support_bundles_from_manifests(
    manifest_patterns: &[String],
    gitignore: Option<&GitignoreChecker>,
) -> Result<Vec<PathBuf>> {
    let mut seen = HashSet::new();
    let mut all = Vec::new();
    for pattern in manifest_patterns {
        for path in discover_support_bundle_paths(pattern, gitignore)? {
            if seen.insert(path.clone()) {
                all.push(path);
            }
        }
    }
    Ok(all)
}

/// Expand manifest patterns into the unique files they match.
///
/// Unlike kind discovery, no extension is required.
pub fn discover_manifest_files(
    manifest_patterns: &[String],
    gitignore: Option<&GitignoreChecker>,
) -> Result<Vec<PathBuf>> {
    let mut seen = HashSet::new();
    let mut all = Vec::new();
    for pattern in manifest_patterns {
        let options = ExpandOptions {
            files_only: true,
            gitignore: effective_checker(pattern, gitignore),
        };
        for path in expand(pattern, options)? {
            if seen.insert(path.clone()) {
                all.push(path);
            }
        }
    }
    Ok(all)
}
