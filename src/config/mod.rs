//! Project configuration discovery, merging and validation.
//!
//! This module handles all aspects of `.replicated` configuration:
//! - Schema definitions in [`schema`]
//! - Upward file discovery and loading in [`loader`]
//! - Per-field parent/child merging in [`merger`]
//! - Validation in [`validator`]
//! - Lexical path anchoring in [`paths`]
//!
//! # Example
//!
//! ```
//! use replicated_lint::config::resolve_config;
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! fs::write(temp.path().join(".replicated"), "appSlug: test\ncharts:\n  - path: ./chart\n").unwrap();
//!
//! let config = resolve_config(Some(temp.path())).unwrap();
//! assert_eq!(config.app_slug, "test");
//! assert!(std::path::Path::new(&config.charts[0].path).is_absolute());
//! ```
//!
//! # Discovery Order
//!
//! Files named `.replicated` (or `.replicated.yaml`) are collected from the
//! starting directory up to the filesystem root and merged outermost first,
//! so the config closest to the working directory has the final say.

pub mod loader;
pub mod merger;
pub mod paths;
pub mod schema;
pub mod validator;

pub use loader::{
    apply_defaults, find_config_files, find_project_root, load_config_file, parse_config,
    resolve_config, resolve_paths, CONFIG_FILE_NAMES,
};
pub use merger::{dedup_resources, merge, merge_configs};
pub use schema::{
    ChartEntry, LintSettings, LinterConfig, LintersConfig, PreflightEntry, ProjectConfig, LATEST,
};
pub use validator::{is_valid_version_spec, validate, validate_config, ValidationError};
