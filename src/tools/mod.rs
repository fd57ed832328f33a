//! External linter binaries: resolution, download and caching.
//!
//! This module provides:
//! - [`Tool`], the supported tool families
//! - [`Platform`] naming for download URLs and cache paths
//! - [`ToolCache`], the on-disk binary cache
//! - Checksum verification and in-memory archive extraction
//! - [`Resolver`], which turns `(tool, version)` into a local executable
//!
//! # Cache Layout
//!
//! `<cache-root>/<tool>/<version>/<os>-<arch>/<tool>[.exe]`, where the
//! cache root defaults to `<user-cache-dir>/replicated/tools`.

pub mod archive;
pub mod cache;
pub mod checksum;
pub mod distribution;
pub mod download;
pub mod platform;
pub mod resolver;
pub mod version_info;

pub use archive::{extract_from_tar_gz, extract_from_zip, ArchiveFormat};
pub use cache::ToolCache;
pub use checksum::{sha256_hex, verify_checksum};
pub use distribution::{ChecksumSource, Distribution, DistributionUrls};
pub use download::Downloader;
pub use platform::Platform;
pub use resolver::{Resolver, ResolverSettings};
pub use version_info::{compare_versions, VersionInfo};

use std::fmt;
use std::path::PathBuf;

/// A supported external tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tool {
    Helm,
    Preflight,
    SupportBundle,
    EmbeddedCluster,
    Kots,
}

impl Tool {
    /// Every supported tool, in lint order.
    pub const ALL: [Tool; 5] = [
        Tool::Helm,
        Tool::Preflight,
        Tool::SupportBundle,
        Tool::EmbeddedCluster,
        Tool::Kots,
    ];

    /// Name used in config files and cache paths.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Helm => "helm",
            Self::Preflight => "preflight",
            Self::SupportBundle => "support-bundle",
            Self::EmbeddedCluster => "embedded-cluster",
            Self::Kots => "kots",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.name() == name)
    }

    /// Key in the version-info `client_versions` map.
    pub fn version_key(&self) -> String {
        self.name().replace('-', "_")
    }

    /// Environment variable that points at a local binary.
    pub fn env_override(&self) -> &'static str {
        match self {
            Self::Helm => "REPLICATED_HELM_PATH",
            Self::Preflight => "REPLICATED_PREFLIGHT_PATH",
            Self::SupportBundle => "REPLICATED_SUPPORT_BUNDLE_PATH",
            Self::EmbeddedCluster => "REPLICATED_EMBEDDED_CLUSTER_PATH",
            Self::Kots => "REPLICATED_KOTS_PATH",
        }
    }

    /// Local binary named by the override variable, if set.
    pub fn override_path(&self) -> Option<PathBuf> {
        std::env::var_os(self.env_override())
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
    }

    /// Whether the linter runs when the config does not say.
    pub fn enabled_by_default(&self) -> bool {
        matches!(self, Self::Helm | Self::Preflight | Self::SupportBundle)
    }

    /// Executable file name on `platform`.
    pub fn binary_name(&self, platform: &Platform) -> String {
        format!("{}{}", self.name(), platform.exe_suffix())
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for tool in Tool::ALL {
            assert_eq!(Tool::from_name(tool.name()), Some(tool));
        }
        assert_eq!(Tool::from_name("troubleshoot"), None);
    }

    #[test]
    fn version_keys_use_underscores() {
        assert_eq!(Tool::SupportBundle.version_key(), "support_bundle");
        assert_eq!(Tool::EmbeddedCluster.version_key(), "embedded_cluster");
        assert_eq!(Tool::Helm.version_key(), "helm");
    }

    #[test]
    fn binary_name_has_exe_on_windows() {
        let windows = Platform::new("windows", "amd64");
        let linux = Platform::new("linux", "amd64");
        assert_eq!(Tool::Helm.binary_name(&windows), "helm.exe");
        assert_eq!(Tool::Helm.binary_name(&linux), "helm");
    }
}
