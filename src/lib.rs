//! Replicated lint - check Helm charts, preflight specs and release
//! manifests with the upstream linters.
//!
//! The crate resolves a hierarchical `.replicated` config, discovers the
//! resources it names, downloads and caches the linter binaries it needs,
//! runs them and folds their differing outputs into one report.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Config discovery, merging and validation
//! - [`discovery`] - Gitignore-aware glob expansion and resource probing
//! - [`error`] - Error types and result aliases
//! - [`lint`] - Linter invocation, output parsing and reporting
//! - [`tools`] - Linter binary resolution, download and caching
//! - [`ui`] - Terminal output
//! - [`validation`] - Chart to HelmChart manifest cross-checks
//!
//! # Example
//!
//! ```
//! use replicated_lint::lint::{extract_json, Severity};
//! use replicated_lint::tools::Tool;
//!
//! let output = "Linting...\n{\"results\": []}\ndone";
//! assert_eq!(extract_json(Tool::Preflight, output).unwrap(), "{\"results\": []}");
//! assert_eq!(Severity::Warning.to_string(), "WARNING");
//! ```

pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod lint;
pub mod tools;
pub mod ui;
pub mod validation;

pub use error::{LintError, Result};
