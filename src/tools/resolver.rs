//! Turn a `(tool, version)` request into a local executable.
//!
//! Resolution order:
//! 1. `latest` (or an empty spec) is replaced by the recommended version
//!    from the version-info endpoint; a failed lookup is fatal
//! 2. A cached binary is returned without touching the network
//! 3. Otherwise the release archive is downloaded, verified against its
//!    published SHA-256, unpacked in memory and written to the cache
//!
//! Nothing is written to disk until verification and extraction succeed.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, info};

use crate::config::schema::LATEST;
use crate::error::{LintError, Result};
use crate::tools::cache::default_cache_dir;
use crate::tools::checksum::{find_in_manifest, parse_sidecar};
use crate::tools::version_info::VERSION_INFO_URL;
use crate::tools::{
    verify_checksum, ChecksumSource, Distribution, DistributionUrls, Downloader, Platform, Tool,
    ToolCache, VersionInfo,
};

const SUPPORTED_OS: &[&str] = &["linux", "darwin", "windows"];
const SUPPORTED_ARCH: &[&str] = &["amd64", "arm64"];

/// Runtime knobs for tool resolution.
#[derive(Debug, Clone)]
pub struct ResolverSettings {
    pub cache_root: PathBuf,
    /// Local binaries that replace resolution, read from each tool's
    /// `REPLICATED_*_PATH` variable by default.
    pub overrides: BTreeMap<Tool, PathBuf>,
    pub version_info_url: String,
    pub urls: DistributionUrls,
    pub download_timeout: Duration,
    pub checksum_timeout: Duration,
    pub version_timeout: Duration,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            cache_root: default_cache_dir(),
            overrides: Tool::ALL
                .into_iter()
                .filter_map(|tool| tool.override_path().map(|path| (tool, path)))
                .collect(),
            version_info_url: VERSION_INFO_URL.to_string(),
            urls: DistributionUrls::default(),
            download_timeout: Duration::from_secs(5 * 60),
            checksum_timeout: Duration::from_secs(30),
            version_timeout: Duration::from_secs(5),
        }
    }
}

/// Resolves, downloads and caches linter binaries.
pub struct Resolver {
    settings: ResolverSettings,
    cache: ToolCache,
    downloader: Downloader,
    platform: Platform,
    version_info: RefCell<Option<VersionInfo>>,
}

impl Resolver {
    /// Create a resolver for the running platform.
    pub fn new(settings: ResolverSettings) -> Result<Self> {
        Ok(Self {
            cache: ToolCache::new(settings.cache_root.clone()),
            downloader: Downloader::new()?,
            platform: Platform::current(),
            version_info: RefCell::new(None),
            settings,
        })
    }

    /// Resolve binaries for a different platform (cache layout and URLs).
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn cache(&self) -> &ToolCache {
        &self.cache
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    /// Local binary configured to replace resolution of `tool`.
    pub fn override_path(&self, tool: Tool) -> Option<&PathBuf> {
        self.settings.overrides.get(&tool)
    }

    /// Local binary for `tool`, honouring its override.
    pub fn locate(&self, tool: Tool, version_spec: &str) -> Result<PathBuf> {
        if let Some(path) = self.override_path(tool) {
            debug!("Using {} from {}", tool, path.display());
            return Ok(path.clone());
        }
        self.resolve(tool, version_spec)
    }

    /// Cached or freshly downloaded binary for `tool` at `version_spec`.
    pub fn resolve(&self, tool: Tool, version_spec: &str) -> Result<PathBuf> {
        let version = self.resolve_version(tool, version_spec)?;

        let path = self.cache.binary_path(tool, &version, &self.platform);
        if self.cache.is_cached(tool, &version, &self.platform) {
            debug!("Cache hit for {} {} at {}", tool, version, path.display());
            return Ok(path);
        }

        info!("Downloading {} {}...", tool, version);
        let binary = self.download(tool, &version)?;
        self.cache.store(tool, &version, &self.platform, &binary)
    }

    /// Concrete version for a spec, without a leading `v`.
    pub fn resolve_version(&self, tool: Tool, version_spec: &str) -> Result<String> {
        let spec = version_spec.trim();
        if spec.is_empty() || spec == LATEST {
            return self.latest_version(tool);
        }
        Ok(spec.trim_start_matches('v').to_string())
    }

    /// Recommended version of `tool` from the version-info endpoint.
    ///
    /// The document is fetched once per resolver.
    pub fn latest_version(&self, tool: Tool) -> Result<String> {
        let lookup_error = |message: String| LintError::VersionLookup {
            tool: tool.to_string(),
            message,
        };

        if self.version_info.borrow().is_none() {
            let fetched = VersionInfo::fetch(
                &self.downloader,
                &self.settings.version_info_url,
                self.settings.version_timeout,
            )
            .map_err(|e| lookup_error(e.to_string()))?;
            *self.version_info.borrow_mut() = Some(fetched);
        }

        self.version_info
            .borrow()
            .as_ref()
            .and_then(|info| info.recommended(tool))
            .ok_or_else(|| lookup_error("no recommended version published".to_string()))
    }

    fn download(&self, tool: Tool, version: &str) -> Result<Vec<u8>> {
        if !SUPPORTED_OS.contains(&self.platform.os.as_str())
            || !SUPPORTED_ARCH.contains(&self.platform.arch.as_str())
        {
            return Err(LintError::UnsupportedPlatform {
                os: self.platform.os.clone(),
                arch: self.platform.arch.clone(),
            });
        }

        let dist = Distribution::for_tool(tool, version, &self.platform, &self.settings.urls)?;

        let archive = self
            .downloader
            .fetch_bytes(&dist.archive_url, self.settings.download_timeout)?;

        let expected = self.expected_checksum(&dist)?;
        verify_checksum(&archive, &expected, &dist.archive_name)?;
        debug!("Verified checksum for {}", dist.archive_name);

        dist.format.extract(&archive, &dist.entry)
    }

    fn expected_checksum(&self, dist: &Distribution) -> Result<String> {
        let url = dist.checksum.url();
        let content = self
            .downloader
            .fetch_text(url, self.settings.checksum_timeout)?;

        let digest = match &dist.checksum {
            ChecksumSource::Sidecar { .. } => parse_sidecar(&content),
            ChecksumSource::Manifest { .. } => find_in_manifest(&content, &dist.archive_name),
        };
        digest.ok_or_else(|| LintError::ChecksumNotFound {
            file: dist.archive_name.clone(),
            url: url.to_string(),
        })
    }
}
