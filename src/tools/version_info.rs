//! Recommended tool versions from the vendor version-info endpoint.
//!
//! The endpoint returns `{"client_versions": {"helm": "3.14.4", ...}}`
//! with underscore keys (`support_bundle`, `embedded_cluster`).

use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{LintError, Result};
use crate::tools::{Downloader, Tool};

/// Default version-info endpoint.
pub const VERSION_INFO_URL: &str = "https://replicated.app/ping";

/// Parsed version-info document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct VersionInfo {
    #[serde(default)]
    pub client_versions: HashMap<String, String>,
}

impl VersionInfo {
    /// Fetch and parse the document at `url`.
    pub fn fetch(downloader: &Downloader, url: &str, timeout: Duration) -> Result<Self> {
        let body = downloader.fetch_text(url, timeout)?;
        Self::parse(&body).map_err(|e| LintError::Download {
            url: url.to_string(),
            message: format!("invalid version info: {}", e),
        })
    }

    pub fn parse(body: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(body)
    }

    /// Recommended version for `tool`, without a leading `v`.
    pub fn recommended(&self, tool: Tool) -> Option<String> {
        self.client_versions
            .get(&tool.version_key())
            .map(|v| v.trim().trim_start_matches('v').to_string())
            .filter(|v| !v.is_empty())
    }
}

/// Whether `configured` is behind `recommended` by a minor or major version.
///
/// Patch differences and newer configured versions are not outdated.
/// Unparseable versions are never reported as outdated.
pub fn compare_versions(configured: &str, recommended: &str) -> bool {
    let parse = |v: &str| semver::Version::parse(v.trim_start_matches('v')).ok();
    let (Some(configured), Some(recommended)) = (parse(configured), parse(recommended)) else {
        return false;
    };

    if configured >= recommended {
        return false;
    }
    configured.major < recommended.major
        || (configured.major == recommended.major && configured.minor < recommended.minor)
}
