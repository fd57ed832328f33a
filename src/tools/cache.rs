//! On-disk cache of verified tool binaries.
//!
//! Entries are never modified or removed here. A binary is written to a
//! temporary file in its final directory and renamed into place, so a
//! reader never sees a partial file and two concurrent first-time writers
//! simply produce the same bytes.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::Result;
use crate::tools::{Platform, Tool};

/// Environment variable overriding the cache root.
pub const CACHE_DIR_ENV: &str = "REPLICATED_TOOLS_CACHE_DIR";

/// Default cache root: `<user-cache-dir>/replicated/tools`.
pub fn default_cache_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(CACHE_DIR_ENV).filter(|d| !d.is_empty()) {
        return PathBuf::from(dir);
    }
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("replicated")
        .join("tools")
}

/// Binary cache rooted at one directory.
#[derive(Debug, Clone)]
pub struct ToolCache {
    root: PathBuf,
}

impl ToolCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Get the cache root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path a binary lives at, whether or not it exists yet.
    pub fn binary_path(&self, tool: Tool, version: &str, platform: &Platform) -> PathBuf {
        self.root
            .join(tool.name())
            .join(version)
            .join(platform.to_string())
            .join(tool.binary_name(platform))
    }

    /// Whether a regular file is cached for this entry.
    pub fn is_cached(&self, tool: Tool, version: &str, platform: &Platform) -> bool {
        self.binary_path(tool, version, platform).is_file()
    }

    /// Write a verified binary into the cache with executable permission.
    pub fn store(
        &self,
        tool: Tool,
        version: &str,
        platform: &Platform,
        bytes: &[u8],
    ) -> Result<PathBuf> {
        let target = self.binary_path(tool, version, platform);
        let dir = target
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.root.clone());

        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create cache directory {:?}", dir))?;

        let mut tmp = NamedTempFile::new_in(&dir)
            .with_context(|| format!("Failed to create temporary file in {:?}", dir))?;
        tmp.write_all(bytes)?;
        tmp.flush()?;
        set_executable(tmp.path())?;
        tmp.persist(&target)
            .with_context(|| format!("Failed to move binary into {:?}", target))?;

        debug!("Cached {} {} at {}", tool, version, target.display());
        Ok(target)
    }
}

#[cfg(unix)]
fn set_executable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn linux() -> Platform {
        Platform::new("linux", "amd64")
    }

    #[test]
    fn binary_path_layout() {
        let cache = ToolCache::new("/cache");
        assert_eq!(
            cache.binary_path(Tool::SupportBundle, "0.123.9", &linux()),
            PathBuf::from("/cache/support-bundle/0.123.9/linux-amd64/support-bundle")
        );
        assert_eq!(
            cache.binary_path(Tool::Helm, "3.14.4", &Platform::new("windows", "arm64")),
            PathBuf::from("/cache/helm/3.14.4/windows-arm64/helm.exe")
        );
    }

    #[test]
    fn store_then_cached() {
        let temp = TempDir::new().unwrap();
        let cache = ToolCache::new(temp.path());
        assert!(!cache.is_cached(Tool::Helm, "3.14.4", &linux()));

        let path = cache
            .store(Tool::Helm, "3.14.4", &linux(), b"#!/bin/sh\n")
            .unwrap();
        assert!(cache.is_cached(Tool::Helm, "3.14.4", &linux()));
        assert_eq!(fs::read(&path).unwrap(), b"#!/bin/sh\n");
        assert!(!cache.is_cached(Tool::Helm, "3.15.0", &linux()));
    }

    #[cfg(unix)]
    #[test]
    fn stored_binary_is_executable() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let cache = ToolCache::new(temp.path());
        let path = cache.store(Tool::Kots, "1.0.0", &linux(), b"bin").unwrap();
        let mode = fs::metadata(path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[test]
    fn directory_at_binary_path_is_not_cached() {
        let temp = TempDir::new().unwrap();
        let cache = ToolCache::new(temp.path());
        fs::create_dir_all(cache.binary_path(Tool::Helm, "1.0.0", &linux())).unwrap();
        assert!(!cache.is_cached(Tool::Helm, "1.0.0", &linux()));
    }
}
