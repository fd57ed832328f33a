//! In-memory extraction of a single file from release archives.
//!
//! Entries are matched by path suffix so that archives with a leading
//! directory (`linux-amd64/helm`) and flat archives (`preflight`) are
//! handled the same way.

use std::io::{Cursor, Read};

use flate2::read::GzDecoder;
use tar::Archive;

use crate::error::{LintError, Result};

/// Container format of a release archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    TarGz,
    Zip,
}

impl ArchiveFormat {
    /// Extract the first regular entry whose path ends with `entry`.
    pub fn extract(&self, data: &[u8], entry: &str) -> Result<Vec<u8>> {
        match self {
            Self::TarGz => extract_from_tar_gz(data, entry),
            Self::Zip => extract_from_zip(data, entry),
        }
    }
}

fn archive_error(e: impl std::fmt::Display) -> LintError {
    LintError::Archive {
        message: e.to_string(),
    }
}

fn not_found(entry: &str) -> LintError {
    LintError::ArchiveEntryNotFound {
        entry: entry.to_string(),
    }
}

/// Extract one file from gzip-compressed tar bytes.
pub fn extract_from_tar_gz(data: &[u8], entry: &str) -> Result<Vec<u8>> {
    let gz = GzDecoder::new(Cursor::new(data));
    let mut archive = Archive::new(gz);

    for file in archive.entries().map_err(archive_error)? {
        let mut file = file.map_err(archive_error)?;
        if !file.header().entry_type().is_file() {
            continue;
        }
        let name = file
            .path()
            .map_err(archive_error)?
            .to_string_lossy()
            .replace('\\', "/");
        if name.ends_with(entry) {
            let mut bytes = Vec::new();
            file.read_to_end(&mut bytes).map_err(archive_error)?;
            return Ok(bytes);
        }
    }

    Err(not_found(entry))
}

/// Extract one file from zip bytes.
pub fn extract_from_zip(data: &[u8], entry: &str) -> Result<Vec<u8>> {
    let mut archive = zip::ZipArchive::new(Cursor::new(data)).map_err(archive_error)?;

    for i in 0..archive.len() {
        let mut file = archive.by_index(i).map_err(archive_error)?;
        if file.is_dir() {
            continue;
        }
        if file.name().replace('\\', "/").ends_with(entry) {
            let mut bytes = Vec::new();
            file.read_to_end(&mut bytes).map_err(archive_error)?;
            return Ok(bytes);
        }
    }

    Err(not_found(entry))
}
