//! Gitignore-aware discovery of lintable resources.
//!
//! - Glob expansion with `**`, braces and classes in [`glob`]
//! - `.gitignore` rule loading and explicit bypass in [`gitignore`]
//! - Chart, preflight and support bundle discovery in [`resources`]
//!
//! # Example
//!
//! ```
//! use replicated_lint::discovery::{expand, ExpandOptions};
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! fs::create_dir_all(temp.path().join("env/sub")).unwrap();
//! fs::write(temp.path().join("env/a.yaml"), "a: 1").unwrap();
//! fs::write(temp.path().join("env/sub/b.yaml"), "b: 1").unwrap();
//!
//! let pattern = temp.path().join("env/**/*.yaml");
//! let found = expand(&pattern.to_string_lossy(), ExpandOptions::default()).unwrap();
//! assert_eq!(found.len(), 2);
//! ```

pub mod gitignore;
pub mod glob;
pub mod resources;

pub use gitignore::{find_git_root, GitignoreChecker};
pub use glob::{contains_glob, expand, is_hidden_path, validate_pattern, validate_syntax, ExpandOptions};
pub use resources::{
    content_has_kind, discover_chart_paths, discover_manifest_files, discover_preflight_paths,
    discover_support_bundle_paths, discover_support_bundles_from_manifests,
    discover_yaml_by_kind, has_kind, is_chart_directory, ResourceKind, CHART_MARKERS,
};
