//! Error types for lint operations.
//!
//! This module defines [`LintError`], the primary error type used throughout
//! the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Configuration, discovery and resolution failures are fatal and carry the
//!   offending file, pattern or URL
//! - Missing chart manifests are batched into one [`MissingChartsError`]
//! - Use `anyhow::Error` (via `LintError::Other`) for unexpected errors

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Core error type for lint operations.
#[derive(Debug, Error)]
pub enum LintError {
    /// Failed to parse a project configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    /// Invalid configuration structure or values.
    #[error("Invalid configuration: {message}")]
    ConfigValidation { message: String },

    /// Glob pattern failed syntax validation.
    #[error("Invalid glob pattern {pattern:?}: {message}")]
    InvalidGlob { pattern: String, message: String },

    /// Pattern escapes the directory it is anchored at.
    #[error("Pattern {pattern:?} must not traverse outside the project directory")]
    PathTraversal { pattern: String },

    /// An explicit resource path could not be used.
    #[error("Discovery failed for {pattern:?}: {message}")]
    Discovery { pattern: String, message: String },

    /// Network request failed or returned a non-success status.
    #[error("Download failed for {url}: {message}")]
    Download { url: String, message: String },

    /// Downloaded bytes did not match the published digest.
    #[error("checksum mismatch for {file}: got {actual}, want {expected}")]
    ChecksumMismatch {
        file: String,
        expected: String,
        actual: String,
    },

    /// The checksum manifest had no entry for the archive.
    #[error("checksum for {file} not found in {url}")]
    ChecksumNotFound { file: String, url: String },

    /// The requested binary was not inside the archive.
    #[error("file {entry:?} not found in archive")]
    ArchiveEntryNotFound { entry: String },

    /// The archive could not be read.
    #[error("Failed to read archive: {message}")]
    Archive { message: String },

    /// No distribution is known for this tool.
    #[error("Unsupported tool: {name}")]
    UnsupportedTool { name: String },

    /// No distribution is published for the running platform.
    #[error("Unsupported platform: {os}/{arch}")]
    UnsupportedPlatform { os: String, arch: String },

    /// Resolving "latest" against the version-info endpoint failed.
    #[error("Failed to determine latest version of {tool}: {message}")]
    VersionLookup { tool: String, message: String },

    /// One or more charts have no HelmChart manifest.
    #[error(transparent)]
    MissingManifests(#[from] MissingChartsError),

    /// Two HelmChart manifests share a name:chartVersion key.
    #[error(
        "duplicate HelmChart manifest found for chart {key:?}\n  First:  {}\n  Second: {}\nEach chart name:version pair must be unique",
        .first.display(),
        .second.display()
    )]
    DuplicateManifest {
        key: String,
        first: PathBuf,
        second: PathBuf,
    },

    /// Chart.yaml was missing or incomplete.
    #[error("Failed to read chart metadata at {path}: {message}")]
    ChartMetadata { path: PathBuf, message: String },

    /// Tool output contained no decodable JSON.
    #[error("Failed to parse {tool} output: {message}")]
    OutputParse { tool: String, message: String },

    /// A linter binary could not be spawned.
    #[error("Failed to execute {tool}: {message}")]
    ToolExecution { tool: String, message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for lint operations.
pub type Result<T> = std::result::Result<T, LintError>;

/// A chart that has no matching HelmChart manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingChart {
    pub path: PathBuf,
    pub name: String,
    pub version: String,
}

/// Every chart lacking a HelmChart manifest, reported together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingChartsError {
    pub missing: Vec<MissingChart>,
}

impl fmt::Display for MissingChartsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let [chart] = self.missing.as_slice() {
            writeln!(
                f,
                "Missing HelmChart manifest for chart at {:?} ({}:{})",
                chart.path.display().to_string(),
                chart.name,
                chart.version
            )?;
        } else {
            writeln!(
                f,
                "Chart validation failed - {} charts missing HelmChart manifests:",
                self.missing.len()
            )?;
            for chart in &self.missing {
                writeln!(
                    f,
                    "  - {} ({}:{})",
                    chart.path.display(),
                    chart.name,
                    chart.version
                )?;
            }
        }
        writeln!(f)?;
        writeln!(
            f,
            "Each Helm chart requires a corresponding HelmChart manifest (kind: HelmChart)."
        )?;
        write!(
            f,
            "Ensure the manifests are in paths specified in the 'manifests' section of .replicated config."
        )
    }
}

impl std::error::Error for MissingChartsError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn chart(path: &str, name: &str, version: &str) -> MissingChart {
        MissingChart {
            path: PathBuf::from(path),
            name: name.to_string(),
            version: version.to_string(),
        }
    }

    #[test]
    fn config_parse_displays_path_and_message() {
        let err = LintError::ConfigParse {
            path: PathBuf::from("/proj/.replicated"),
            message: "bad indent".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/proj/.replicated"));
        assert!(msg.contains("bad indent"));
    }

    #[test]
    fn checksum_mismatch_shows_both_digests() {
        let err = LintError::ChecksumMismatch {
            file: "helm-v3.14.0-linux-amd64.tar.gz".to_string(),
            expected: "aaa".to_string(),
            actual: "bbb".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "checksum mismatch for helm-v3.14.0-linux-amd64.tar.gz: got bbb, want aaa"
        );
    }

    #[test]
    fn duplicate_manifest_names_both_files() {
        let err = LintError::DuplicateManifest {
            key: "app:1.0.0".to_string(),
            first: PathBuf::from("/a/one.yaml"),
            second: PathBuf::from("/b/two.yaml"),
        };
        let msg = err.to_string();
        assert!(msg.contains("\"app:1.0.0\""));
        assert!(msg.contains("First:  /a/one.yaml"));
        assert!(msg.contains("Second: /b/two.yaml"));
    }

    #[test]
    fn single_missing_chart_message() {
        let err = MissingChartsError {
            missing: vec![chart("/p/charts/b", "b", "2.0.0")],
        };
        let msg = err.to_string();
        assert!(msg.starts_with("Missing HelmChart manifest for chart at \"/p/charts/b\" (b:2.0.0)"));
        assert!(msg.contains("kind: HelmChart"));
    }

    #[test]
    fn multiple_missing_charts_are_listed() {
        let err = MissingChartsError {
            missing: vec![
                chart("/p/charts/a", "a", "1.0.0"),
                chart("/p/charts/b", "b", "2.0.0"),
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("2 charts missing HelmChart manifests"));
        assert!(msg.contains("  - /p/charts/a (a:1.0.0)"));
        assert!(msg.contains("  - /p/charts/b (b:2.0.0)"));
    }

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: LintError = io_err.into();
        assert!(matches!(err, LintError::Io(_)));
    }

    #[test]
    fn anyhow_error_is_transparent() {
        let err: LintError = anyhow::anyhow!("something odd").into();
        assert_eq!(err.to_string(), "something odd");
    }
}
