//! Running external linters and unifying what they report.
//!
//! # Overview
//!
//! - **Extraction** - locating the JSON body inside noisy tool output ([`extract_json`])
//! - **Parsers** - one per linter, each producing [`LintMessage`]s
//! - **Runner** - invoking a resolved binary against one resource
//! - **Output** - the [`LintReport`] model and its formatters
//!
//! # Example
//!
//! ```
//! use replicated_lint::lint::{parse_helm_output, Severity};
//!
//! let messages = parse_helm_output("[WARNING] templates/: object name does not conform");
//! assert_eq!(messages[0].severity, Severity::Warning);
//! assert_eq!(messages[0].path, "templates/");
//! ```

pub mod embedded_cluster;
pub mod extract;
pub mod helm;
pub mod kots;
pub mod message;
pub mod output;
pub mod runner;
pub mod troubleshoot;

pub use embedded_cluster::{extract_ec_version, is_embedded_cluster_config, parse_embedded_cluster_output};
pub use extract::{decode_json, extract_json};
pub use helm::parse_helm_output;
pub use kots::parse_kots_output;
pub use message::{LintMessage, LintResult, Severity, SeverityCounts};
pub use output::{
    HumanFormatter, JsonFormatter, LintFormatter, LintReport, LintSummary, LinterSection,
    OutputFormat, ReportMetadata, ResourceReport,
};
pub use runner::{
    is_preflight_v1beta3, lint_chart, lint_embedded_cluster, lint_kots, lint_preflight,
    lint_support_bundle, PreflightInput,
};
pub use troubleshoot::{parse_preflight_output, parse_support_bundle_output};
