//! Operating system and architecture naming.
//!
//! Distribution archives and cache directories use `darwin`, `linux`,
//! `windows` and `amd64`, `arm64` rather than Rust's target names.

use std::fmt;

/// An `(os, arch)` pair in distribution naming.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Platform {
    pub os: String,
    pub arch: String,
}

impl Platform {
    pub fn new(os: &str, arch: &str) -> Self {
        Self {
            os: os.to_string(),
            arch: arch.to_string(),
        }
    }

    /// The platform this binary was built for.
    pub fn current() -> Self {
        Self::from_rust(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Map Rust `OS`/`ARCH` constants to distribution names.
    pub fn from_rust(os: &str, arch: &str) -> Self {
        let os = match os {
            "macos" => "darwin",
            other => other,
        };
        let arch = match arch {
            "x86_64" => "amd64",
            "aarch64" => "arm64",
            "x86" => "386",
            other => other,
        };
        Self::new(os, arch)
    }

    pub fn is_windows(&self) -> bool {
        self.os == "windows"
    }

    pub fn is_darwin(&self) -> bool {
        self.os == "darwin"
    }

    pub fn exe_suffix(&self) -> &'static str {
        if self.is_windows() {
            ".exe"
        } else {
            ""
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.os, self.arch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_rust_names() {
        assert_eq!(
            Platform::from_rust("macos", "aarch64"),
            Platform::new("darwin", "arm64")
        );
        assert_eq!(
            Platform::from_rust("linux", "x86_64"),
            Platform::new("linux", "amd64")
        );
    }

    #[test]
    fn displays_as_os_dash_arch() {
        assert_eq!(Platform::new("linux", "arm64").to_string(), "linux-arm64");
    }
}
