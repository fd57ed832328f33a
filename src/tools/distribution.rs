//! Where each tool family publishes its release archives.
//!
//! Helm publishes `helm-v<ver>-<os>-<arch>.tar.gz` (zip on Windows) with a
//! `.sha256sum` sidecar per archive. Troubleshoot tools (`preflight`,
//! `support-bundle`) publish `<tool>_<os>_<arch>.tar.gz` (a universal
//! `darwin_all` build on macOS, zip on Windows) with one checksums file per
//! release.

use crate::error::{LintError, Result};
use crate::tools::{ArchiveFormat, Platform, Tool};

/// Default Helm download host.
pub const HELM_BASE_URL: &str = "https://get.helm.sh";

/// Default troubleshoot release download prefix.
pub const TROUBLESHOOT_BASE_URL: &str =
    "https://github.com/replicatedhq/troubleshoot/releases/download";

/// Base URLs for each tool family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributionUrls {
    pub helm: String,
    pub troubleshoot: String,
}

impl Default for DistributionUrls {
    fn default() -> Self {
        Self {
            helm: HELM_BASE_URL.to_string(),
            troubleshoot: TROUBLESHOOT_BASE_URL.to_string(),
        }
    }
}

impl DistributionUrls {
    /// Point every family at one host (used with mock servers).
    pub fn all(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            helm: base.to_string(),
            troubleshoot: base.to_string(),
        }
    }
}

/// Published checksum artifact for an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChecksumSource {
    /// One digest for one archive.
    Sidecar { url: String },
    /// Many `<digest> <filename>` lines; look up the archive by name.
    Manifest { url: String },
}

impl ChecksumSource {
    pub fn url(&self) -> &str {
        match self {
            Self::Sidecar { url } | Self::Manifest { url } => url,
        }
    }
}

/// Everything needed to fetch and unpack one tool release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Distribution {
    pub archive_name: String,
    pub archive_url: String,
    pub format: ArchiveFormat,
    pub checksum: ChecksumSource,
    /// Suffix identifying the binary inside the archive.
    pub entry: String,
}

impl Distribution {
    /// Describe the release archive for `tool` at a concrete `version`.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedTool` for tool families with no known download
    /// location.
    pub fn for_tool(
        tool: Tool,
        version: &str,
        platform: &Platform,
        urls: &DistributionUrls,
    ) -> Result<Self> {
        let version = version.trim_start_matches('v');
        match tool {
            Tool::Helm => Ok(Self::helm(version, platform, &urls.helm)),
            Tool::Preflight | Tool::SupportBundle => {
                Ok(Self::troubleshoot(tool, version, platform, &urls.troubleshoot))
            }
            Tool::EmbeddedCluster | Tool::Kots => Err(LintError::UnsupportedTool {
                name: format!(
                    "{} (no download available; set {} to a local binary)",
                    tool,
                    tool.env_override()
                ),
            }),
        }
    }

    fn helm(version: &str, platform: &Platform, base: &str) -> Self {
        let base = base.trim_end_matches('/');
        let (format, ext) = if platform.is_windows() {
            (ArchiveFormat::Zip, "zip")
        } else {
            (ArchiveFormat::TarGz, "tar.gz")
        };
        let archive_name = format!(
            "helm-v{}-{}-{}.{}",
            version, platform.os, platform.arch, ext
        );
        let archive_url = format!("{}/{}", base, archive_name);
        Self {
            checksum: ChecksumSource::Sidecar {
                url: format!("{}.sha256sum", archive_url),
            },
            entry: format!(
                "{}-{}/{}",
                platform.os,
                platform.arch,
                Tool::Helm.binary_name(platform)
            ),
            archive_name,
            archive_url,
            format,
        }
    }

    fn troubleshoot(tool: Tool, version: &str, platform: &Platform, base: &str) -> Self {
        let base = base.trim_end_matches('/');
        let (archive_name, format) = if platform.is_darwin() {
            (format!("{}_darwin_all.tar.gz", tool), ArchiveFormat::TarGz)
        } else if platform.is_windows() {
            (
                format!("{}_{}_{}.zip", tool, platform.os, platform.arch),
                ArchiveFormat::Zip,
            )
        } else {
            (
                format!("{}_{}_{}.tar.gz", tool, platform.os, platform.arch),
                ArchiveFormat::TarGz,
            )
        };
        Self {
            archive_url: format!("{}/v{}/{}", base, version, archive_name),
            checksum: ChecksumSource::Manifest {
                url: format!("{}/v{}/troubleshoot_{}_checksums.txt", base, version, version),
            },
            entry: tool.binary_name(platform),
            archive_name,
            format,
        }
    }
}
