//! SHA-256 verification against published checksum artifacts.
//!
//! Two formats are understood: a sidecar holding one `<hex> [filename]`
//! line, and a manifest of `<hex>  <filename>` lines.

use sha2::{Digest, Sha256};

use crate::error::{LintError, Result};

/// Lowercase hex SHA-256 of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Digest from a single-entry sidecar file.
pub fn parse_sidecar(content: &str) -> Option<String> {
    content
        .split_whitespace()
        .next()
        .map(|digest| digest.to_lowercase())
}

/// Digest for `filename` from a multi-entry manifest.
pub fn find_in_manifest(content: &str, filename: &str) -> Option<String> {
    content.lines().find_map(|line| {
        let mut fields = line.split_whitespace();
        let digest = fields.next()?;
        let name = fields.next()?.trim_start_matches('*');
        (name == filename).then(|| digest.to_lowercase())
    })
}

/// Fail unless `bytes` hashes to `expected`.
pub fn verify_checksum(bytes: &[u8], expected: &str, file: &str) -> Result<()> {
    let actual = sha256_hex(bytes);
    if actual.eq_ignore_ascii_case(expected.trim()) {
        Ok(())
    } else {
        Err(LintError::ChecksumMismatch {
            file: file.to_string(),
            expected: expected.trim().to_lowercase(),
            actual,
        })
    }
}
