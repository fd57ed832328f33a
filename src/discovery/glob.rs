//! Glob expansion with recursive `**` and brace alternation.
//!
//! A pattern is split into a literal base directory and a glob tail. The
//! base is walked with `walkdir` and each entry's path relative to the base
//! is matched against the tail with `globset`, with `*` confined to a
//! single segment.

use std::path::{Component, Path, PathBuf};

use globset::{GlobBuilder, GlobMatcher};
use tracing::debug;
use walkdir::WalkDir;

use crate::config::paths::{absolutize, clean};
use crate::discovery::gitignore::GitignoreChecker;
use crate::error::{LintError, Result};

/// Options for [`expand`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpandOptions<'a> {
    /// Only return regular files.
    pub files_only: bool,
    /// Drop paths excluded by these ignore rules.
    pub gitignore: Option<&'a GitignoreChecker>,
}

/// Whether `path` contains any glob metacharacter.
pub fn contains_glob(path: &str) -> bool {
    path.contains(['*', '?', '[', '{'])
}

/// Check glob syntax (unclosed classes or alternations).
pub fn validate_syntax(pattern: &str) -> Result<()> {
    compile(pattern).map(|_| ())
}

/// Check syntax and reject patterns that climb out of their starting root.
pub fn validate_pattern(pattern: &str) -> Result<()> {
    validate_syntax(pattern)?;

    let cleaned = clean(Path::new(pattern));
    if matches!(cleaned.components().next(), Some(Component::ParentDir)) {
        return Err(LintError::PathTraversal {
            pattern: pattern.to_string(),
        });
    }
    Ok(())
}

/// Whether any segment of `path` starts with a dot (`.` and `..` excluded).
pub fn is_hidden_path(path: &Path) -> bool {
    path.components().any(|c| match c {
        Component::Normal(name) => name.to_string_lossy().starts_with('.'),
        _ => false,
    })
}

fn compile(pattern: &str) -> Result<GlobMatcher> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .backslash_escape(true)
        .empty_alternates(true)
        .build()
        .map(|glob| glob.compile_matcher())
        .map_err(|e| LintError::InvalidGlob {
            pattern: pattern.to_string(),
            message: e.kind().to_string(),
        })
}

/// Split a pattern into its literal leading directory and the glob tail.
fn split_pattern(pattern: &Path) -> (PathBuf, Vec<String>) {
    let mut base = PathBuf::new();
    let mut tail = Vec::new();
    for component in pattern.components() {
        let text = component.as_os_str().to_string_lossy();
        if tail.is_empty() && !contains_glob(&text) {
            base.push(component.as_os_str());
        } else {
            tail.push(text.into_owned());
        }
    }
    if base.as_os_str().is_empty() {
        base.push(".");
    }
    (base, tail)
}

/// Expand `pattern` into a sorted list of absolute paths.
///
/// Paths with a hidden segment below the pattern's literal base are never
/// returned. A pattern without wildcards yields the path itself if it
/// exists.
///
/// # Errors
///
/// Returns `InvalidGlob` or `PathTraversal` if the pattern fails
/// [`validate_pattern`].
pub fn expand(pattern: &str, options: ExpandOptions<'_>) -> Result<Vec<PathBuf>> {
    validate_pattern(pattern)?;

    let (base, tail) = split_pattern(&clean(Path::new(pattern)));
    let base = absolutize(&base)?;

    if tail.is_empty() {
        let keep = base.exists()
            && (!options.files_only || base.is_file())
            && !options
                .gitignore
                .is_some_and(|checker| checker.should_ignore(&base));
        return Ok(if keep { vec![base] } else { Vec::new() });
    }

    if !base.is_dir() {
        return Ok(Vec::new());
    }

    let tail_pattern = tail.join("/");
    let matcher = compile(&tail_pattern)?;

    let mut walker = WalkDir::new(&base)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name();
    if !tail.iter().any(|segment| segment.contains("**")) {
        walker = walker.max_depth(tail.len());
    }

    let mut matches = Vec::new();
    let entries = walker.into_iter().filter_entry(|entry| {
        if entry.file_name().to_string_lossy().starts_with('.') {
            return false;
        }
        match options.gitignore {
            Some(checker) if entry.file_type().is_dir() => !checker.should_ignore(entry.path()),
            _ => true,
        }
    });

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!("Skipping unreadable entry while expanding {}: {}", pattern, e);
                continue;
            }
        };
        if options.files_only && !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(&base) else {
            continue;
        };
        let relative = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        if !matcher.is_match(relative.as_str()) {
            continue;
        }
        if let Some(checker) = options.gitignore {
            if checker.should_ignore(entry.path()) {
                debug!("Ignoring {} (gitignore)", entry.path().display());
                continue;
            }
        }
        matches.push(entry.into_path());
    }

    matches.sort();
    matches.dedup();
    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "x").unwrap();
    }

    fn pattern(root: &Path, rel: &str) -> String {
        root.join(rel).to_string_lossy().into_owned()
    }

    fn names(root: &Path, paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| {
                p.strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[test]
    fn recursive_pattern_matches_own_level_and_nested() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "env/a.yaml");
        touch(temp.path(), "env/sub/b.yaml");
        touch(temp.path(), "other/c.yaml");

        let found = expand(
            &pattern(temp.path(), "./env/**/*.yaml"),
            ExpandOptions::default(),
        )
        .unwrap();
        assert_eq!(names(temp.path(), &found), vec!["env/a.yaml", "env/sub/b.yaml"]);
    }

    #[test]
    fn single_star_stays_in_segment() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "m/a.yaml");
        touch(temp.path(), "m/deep/b.yaml");

        let found = expand(&pattern(temp.path(), "m/*.yaml"), ExpandOptions::default()).unwrap();
        assert_eq!(names(temp.path(), &found), vec!["m/a.yaml"]);
    }

    #[test]
    fn braces_and_classes() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "m/a.yaml");
        touch(temp.path(), "m/b.yml");
        touch(temp.path(), "m/c.json");
        touch(temp.path(), "m/x1.txt");
        touch(temp.path(), "m/x2.txt");

        let found = expand(
            &pattern(temp.path(), "m/*.{yaml,yml}"),
            ExpandOptions::default(),
        )
        .unwrap();
        assert_eq!(names(temp.path(), &found), vec!["m/a.yaml", "m/b.yml"]);

        let found = expand(&pattern(temp.path(), "m/x[1].txt"), ExpandOptions::default()).unwrap();
        assert_eq!(names(temp.path(), &found), vec!["m/x1.txt"]);

        let found = expand(&pattern(temp.path(), "m/x?.txt"), ExpandOptions::default()).unwrap();
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn hidden_paths_are_excluded() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "m/a.yaml");
        touch(temp.path(), "m/.hidden.yaml");
        touch(temp.path(), "m/.git/config.yaml");

        let found = expand(&pattern(temp.path(), "m/**"), ExpandOptions::default()).unwrap();
        assert_eq!(names(temp.path(), &found), vec!["m/a.yaml"]);
    }

    #[test]
    fn files_only_skips_directories() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "charts/app/Chart.yaml");

        let all = expand(&pattern(temp.path(), "charts/*"), ExpandOptions::default()).unwrap();
        assert_eq!(names(temp.path(), &all), vec!["charts/app"]);

        let files = expand(
            &pattern(temp.path(), "charts/*"),
            ExpandOptions {
                files_only: true,
                gitignore: None,
            },
        )
        .unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn literal_path_returns_itself_when_present() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "one.yaml");

        let found = expand(&pattern(temp.path(), "one.yaml"), ExpandOptions::default()).unwrap();
        assert_eq!(found.len(), 1);
        let missing = expand(&pattern(temp.path(), "two.yaml"), ExpandOptions::default()).unwrap();
        assert!(missing.is_empty());
    }

    #[test]
    fn missing_base_is_empty() {
        let temp = TempDir::new().unwrap();
        let found = expand(&pattern(temp.path(), "nope/**"), ExpandOptions::default()).unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn rejects_invalid_syntax() {
        assert!(matches!(
            validate_pattern("charts/[abc"),
            Err(LintError::InvalidGlob { .. })
        ));
        assert!(matches!(
            validate_pattern("charts/{a,b"),
            Err(LintError::InvalidGlob { .. })
        ));
    }

    #[test]
    fn rejects_traversal() {
        assert!(matches!(
            validate_pattern("../../etc/*"),
            Err(LintError::PathTraversal { .. })
        ));
        assert!(matches!(
            validate_pattern("charts/../../x"),
            Err(LintError::PathTraversal { .. })
        ));
        assert!(validate_pattern("./charts/../manifests/*.yaml").is_ok());
        assert!(validate_pattern("/abs/../x/*").is_ok());
    }

    #[test]
    fn detects_hidden_segments() {
        assert!(is_hidden_path(Path::new("a/.git/b")));
        assert!(is_hidden_path(Path::new(".github")));
        assert!(!is_hidden_path(Path::new("./a/../b")));
    }

    #[test]
    fn contains_glob_checks_metacharacters() {
        assert!(contains_glob("a/*.yaml"));
        assert!(contains_glob("a/{b,c}"));
        assert!(contains_glob("a/b?"));
        assert!(contains_glob("a/[bc]"));
        assert!(!contains_glob("a/b/c.yaml"));
    }
}
