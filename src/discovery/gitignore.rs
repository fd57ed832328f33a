//! `.gitignore`-aware filtering for resource discovery.
//!
//! A [`GitignoreChecker`] is built for a base directory inside a git
//! repository. It loads `.git/info/exclude` and every `.gitignore` from the
//! repository root down to the base directory. Outside a repository there
//! is nothing to check and no checker is built.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use ignore::Match;
use tracing::debug;

use crate::config::paths::absolutize;
use crate::discovery::glob::contains_glob;
use crate::error::Result;

/// Ignore rules loaded for one base directory.
#[derive(Debug)]
pub struct GitignoreChecker {
    repo_root: PathBuf,
    /// Lowest precedence first.
    matchers: Vec<Gitignore>,
    /// Raw non-negated patterns, for explicit-bypass detection.
    patterns: Vec<String>,
}

/// Walk up from `start` to the nearest directory containing `.git`.
pub fn find_git_root(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(".git").exists() {
            return Some(current);
        }
        if !current.pop() {
            return None;
        }
    }
}

impl GitignoreChecker {
    /// Load ignore rules applying to `base_dir`.
    ///
    /// Returns `Ok(None)` when `base_dir` is not inside a git repository or
    /// no ignore files exist.
    pub fn new(base_dir: &Path) -> Result<Option<Self>> {
        let base_dir = absolutize(base_dir)?;
        let Some(repo_root) = find_git_root(&base_dir) else {
            debug!("{} is not in a git repository", base_dir.display());
            return Ok(None);
        };

        let mut matchers = Vec::new();
        let mut patterns = Vec::new();

        let exclude = repo_root.join(".git").join("info").join("exclude");
        if exclude.is_file() {
            matchers.push(build_matcher(&repo_root, &exclude)?);
            patterns.extend(read_patterns(&exclude));
        }

        for dir in dirs_from_root(&repo_root, &base_dir) {
            let file = dir.join(".gitignore");
            if file.is_file() {
                matchers.push(build_matcher(&dir, &file)?);
                patterns.extend(read_patterns(&file));
            }
        }

        if matchers.is_empty() {
            return Ok(None);
        }

        debug!(
            "Loaded {} ignore file(s) for repository {}",
            matchers.len(),
            repo_root.display()
        );
        Ok(Some(Self {
            repo_root,
            matchers,
            patterns,
        }))
    }

    pub fn repo_root(&self) -> &Path {
        &self.repo_root
    }

    /// Whether `path` or any of its parent directories is ignored.
    ///
    /// Paths outside the repository are never ignored.
    pub fn should_ignore(&self, path: &Path) -> bool {
        let Ok(path) = absolutize(path) else {
            return false;
        };
        if !path.starts_with(&self.repo_root) {
            return false;
        }

        let mut current = path.as_path();
        let mut is_dir = current.is_dir();
        loop {
            if current == self.repo_root {
                return false;
            }
            if self.is_ignored(current, is_dir) {
                return true;
            }
            match current.parent() {
                Some(parent) => {
                    current = parent;
                    is_dir = true;
                }
                None => return false,
            }
        }
    }

    /// Evaluate every applicable matcher; the last decisive one wins.
    fn is_ignored(&self, path: &Path, is_dir: bool) -> bool {
        let mut ignored = false;
        for matcher in &self.matchers {
            if !path.starts_with(matcher.path()) {
                continue;
            }
            match matcher.matched(path, is_dir) {
                Match::Ignore(_) => ignored = true,
                Match::Whitelist(_) => ignored = false,
                Match::None => {}
            }
        }
        ignored
    }

    /// Whether a configured resource pattern names an ignored path directly.
    ///
    /// A pattern such as `./vendor/**` when `vendor/` is ignored signals
    /// intent to lint ignored content, so filtering is skipped for it.
    pub fn path_matches_ignored_pattern(&self, config_path: &str) -> bool {
        let path = Path::new(config_path);
        let relative = match path.strip_prefix(&self.repo_root) {
            Ok(rel) => rel.to_path_buf(),
            Err(_) => crate::config::paths::clean(path),
        };
        let clean_path = relative.to_string_lossy().replace('\\', "/");
        let clean_path = clean_path.trim_start_matches("./");
        let parts: Vec<&str> = clean_path.split('/').filter(|p| !p.is_empty()).collect();

        self.patterns.iter().any(|pattern| {
            let pattern = pattern.trim_end_matches('/').trim_start_matches('/');
            if pattern.is_empty() {
                return false;
            }

            if parts.iter().any(|part| !contains_glob(part) && *part == pattern) {
                return true;
            }
            if (1..=parts.len()).any(|i| parts[..i].join("/") == pattern) {
                return true;
            }
            if clean_path == pattern || clean_path.starts_with(&format!("{}/", pattern)) {
                return true;
            }
            if contains_glob(pattern) {
                let literal = pattern.trim_end_matches('*');
                if !literal.is_empty() && clean_path.contains(literal) {
                    return true;
                }
            }
            false
        })
    }
}

fn build_matcher(root: &Path, file: &Path) -> Result<Gitignore> {
    let mut builder = GitignoreBuilder::new(root);
    if let Some(err) = builder.add(file) {
        debug!("Partially invalid ignore file {}: {}", file.display(), err);
    }
    let matcher = builder
        .build()
        .with_context(|| format!("Failed to load ignore rules from {}", file.display()))?;
    Ok(matcher)
}

fn read_patterns(file: &Path) -> Vec<String> {
    fs::read_to_string(file)
        .unwrap_or_default()
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with('!'))
        .map(String::from)
        .collect()
}

/// Directories from `root` down to `target`, inclusive.
fn dirs_from_root(root: &Path, target: &Path) -> Vec<PathBuf> {
    let mut dirs = vec![root.to_path_buf()];
    if let Ok(relative) = target.strip_prefix(root) {
        let mut current = root.to_path_buf();
        for component in relative.components() {
            current.push(component);
            dirs.push(current.clone());
        }
    }
    dirs
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn repo() -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join(".git").join("info")).unwrap();
        temp
    }

    fn touch(root: &Path, rel: &str) -> PathBuf {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "x").unwrap();
        path
    }

    #[test]
    fn no_repository_means_no_checker() {
        let temp = TempDir::new().unwrap();
        assert!(GitignoreChecker::new(temp.path()).unwrap().is_none());
    }

    #[test]
    fn repository_without_ignore_files_means_no_checker() {
        let temp = repo();
        assert!(GitignoreChecker::new(temp.path()).unwrap().is_none());
    }

    #[test]
    fn directory_pattern_excludes_descendants() {
        let temp = repo();
        fs::write(temp.path().join(".gitignore"), "vendor/\n").unwrap();
        let chart = touch(temp.path(), "vendor/chart/Chart.yaml");
        let kept = touch(temp.path(), "charts/app/Chart.yaml");

        let checker = GitignoreChecker::new(temp.path()).unwrap().unwrap();
        assert!(checker.should_ignore(&chart));
        assert!(checker.should_ignore(&temp.path().join("vendor")));
        assert!(!checker.should_ignore(&kept));
    }

    #[test]
    fn nested_gitignore_applies_below_its_directory() {
        let temp = repo();
        fs::write(temp.path().join(".gitignore"), "*.log\n").unwrap();
        let sub = temp.path().join("apps");
        fs::create_dir_all(&sub).unwrap();
        fs::write(sub.join(".gitignore"), "generated/\n").unwrap();
        let generated = touch(temp.path(), "apps/generated/x.yaml");
        let log = touch(temp.path(), "apps/run.log");
        let other = touch(temp.path(), "generated/y.yaml");

        let checker = GitignoreChecker::new(&sub).unwrap().unwrap();
        assert!(checker.should_ignore(&generated));
        assert!(checker.should_ignore(&log));
        assert!(!checker.should_ignore(&other));
    }

    #[test]
    fn info_exclude_is_loaded() {
        let temp = repo();
        fs::write(temp.path().join(".git/info/exclude"), "scratch/\n").unwrap();
        let file = touch(temp.path(), "scratch/a.yaml");

        let checker = GitignoreChecker::new(temp.path()).unwrap().unwrap();
        assert!(checker.should_ignore(&file));
    }

    #[test]
    fn negation_reincludes_file() {
        let temp = repo();
        fs::write(temp.path().join(".gitignore"), "*.yaml\n!keep.yaml\n").unwrap();
        let drop = touch(temp.path(), "m/drop.yaml");
        let keep = touch(temp.path(), "m/keep.yaml");

        let checker = GitignoreChecker::new(temp.path()).unwrap().unwrap();
        assert!(checker.should_ignore(&drop));
        assert!(!checker.should_ignore(&keep));
    }

    #[test]
    fn paths_outside_repo_are_not_ignored() {
        let temp = repo();
        fs::write(temp.path().join(".gitignore"), "*\n").unwrap();
        let outside = TempDir::new().unwrap();
        let file = touch(outside.path(), "a.yaml");

        let checker = GitignoreChecker::new(temp.path()).unwrap().unwrap();
        assert!(!checker.should_ignore(&file));
    }

    #[test]
    fn explicit_reference_bypasses_filtering() {
        let temp = repo();
        fs::write(temp.path().join(".gitignore"), "vendor/\n*.log\n").unwrap();
        let checker = GitignoreChecker::new(temp.path()).unwrap().unwrap();

        let explicit = temp.path().join("vendor/**").to_string_lossy().into_owned();
        assert!(checker.path_matches_ignored_pattern(&explicit));
        assert!(checker.path_matches_ignored_pattern("./vendor/chart"));
        assert!(!checker.path_matches_ignored_pattern("./**"));
        assert!(!checker.path_matches_ignored_pattern("./charts/*"));
        assert!(!checker.path_matches_ignored_pattern("./**/*.yaml"));
    }
}
