//! Lexical path helpers for anchoring config-relative paths.
//!
//! Paths and glob patterns from a config file are joined onto the directory
//! containing that file and cleaned without touching the filesystem, so
//! patterns that do not match anything yet still resolve.

use std::path::{Component, Path, PathBuf};

/// Normalize `.` and `..` components without following symlinks.
pub fn clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(
                    out.components().next_back(),
                    Some(Component::Normal(_))
                ) && out.pop();
                if !popped && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Anchor `value` at `base_dir` unless it is already absolute.
pub fn resolve_against(base_dir: &Path, value: &str) -> String {
    let path = Path::new(value);
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    };
    clean(&joined).to_string_lossy().into_owned()
}

/// Make `path` absolute against the current directory.
pub fn absolutize(path: &Path) -> std::io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(clean(path))
    } else {
        Ok(clean(&std::env::current_dir()?.join(path)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_removes_dot_segments() {
        assert_eq!(clean(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
        assert_eq!(clean(Path::new("./charts/app")), PathBuf::from("charts/app"));
    }

    #[test]
    fn clean_keeps_leading_parent_for_relative() {
        assert_eq!(clean(Path::new("../x/../../y")), PathBuf::from("../../y"));
        assert_eq!(clean(Path::new("a/..")), PathBuf::from("."));
    }

    #[test]
    fn clean_stops_at_root() {
        assert_eq!(clean(Path::new("/../etc")), PathBuf::from("/etc"));
    }

    #[test]
    fn resolve_against_joins_relative() {
        let base = Path::new("/proj/sub");
        assert_eq!(resolve_against(base, "./charts/*"), "/proj/sub/charts/*");
        assert_eq!(resolve_against(base, "../shared/**"), "/proj/shared/**");
    }

    #[test]
    fn resolve_against_keeps_absolute() {
        assert_eq!(
            resolve_against(Path::new("/proj"), "/opt/charts/app"),
            "/opt/charts/app"
        );
    }
}
