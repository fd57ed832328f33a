//! Configuration validation rules.
//!
//! This module validates configuration for correctness:
//! - Chart and preflight entries must have a non-empty path
//! - Chart, preflight and manifest patterns must be valid glob syntax
//! - Tool versions must be `latest` or a semantic version

use crate::config::schema::{ProjectConfig, LATEST};
use crate::discovery::glob::{contains_glob, validate_syntax};
use crate::error::{LintError, Result};

/// Validation error with context.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Rule identifier
    pub rule: String,
    /// Human-readable error message
    pub message: String,
}

impl ValidationError {
    fn new(rule: &str, message: String) -> Self {
        Self {
            rule: rule.to_string(),
            message,
        }
    }
}

/// Validate a configuration and return all errors.
///
/// This function collects all validation errors rather than stopping
/// at the first one, allowing users to fix multiple issues at once.
pub fn validate_config(config: &ProjectConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    errors.extend(validate_charts(config));
    errors.extend(validate_preflights(config));
    errors.extend(validate_manifests(config));
    errors.extend(validate_tools(config));

    errors
}

fn validate_charts(config: &ProjectConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for (i, chart) in config.charts.iter().enumerate() {
        if chart.path.trim().is_empty() {
            errors.push(ValidationError::new(
                "empty-path",
                format!("charts[{}]: path is required", i),
            ));
        } else if let Some(err) = pattern_error("charts", i, &chart.path) {
            errors.push(err);
        }
    }
    errors
}

fn validate_preflights(config: &ProjectConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for (i, preflight) in config.preflights.iter().enumerate() {
        if preflight.path.trim().is_empty() {
            errors.push(ValidationError::new(
                "empty-path",
                format!("preflights[{}]: path is required", i),
            ));
        } else if let Some(err) = pattern_error("preflights", i, &preflight.path) {
            errors.push(err);
        }
    }
    errors
}

fn validate_manifests(config: &ProjectConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for (i, pattern) in config.manifests.iter().enumerate() {
        if pattern.trim().is_empty() {
            errors.push(ValidationError::new(
                "empty-path",
                format!("manifests[{}]: pattern cannot be empty", i),
            ));
        } else if let Some(err) = pattern_error("manifests", i, pattern) {
            errors.push(err);
        }
    }
    errors
}

fn pattern_error(field: &str, index: usize, pattern: &str) -> Option<ValidationError> {
    if !contains_glob(pattern) {
        return None;
    }
    validate_syntax(pattern).err().map(|e| {
        ValidationError::new(
            "invalid-glob",
            format!("{}[{}]: {}", field, index, e),
        )
    })
}

fn validate_tools(config: &ProjectConfig) -> Vec<ValidationError> {
    let Some(lint) = &config.repl_lint else {
        return Vec::new();
    };

    let mut errors = Vec::new();
    for (name, version) in &lint.tools {
        if !is_valid_version_spec(version) {
            errors.push(ValidationError::new(
                "invalid-version",
                format!(
                    "invalid version {:?} for tool {:?}: must be \"latest\" or a semantic version (e.g., 1.2.3)",
                    version, name
                ),
            ));
        }
    }
    errors
}

/// `latest` or a semantic version with an optional leading `v`.
pub fn is_valid_version_spec(version: &str) -> bool {
    version == LATEST || semver::Version::parse(version.trim_start_matches('v')).is_ok()
}

/// Validate and return Result (for convenience).
///
/// # Errors
///
/// Returns `ConfigValidation` if any validation rules fail.
pub fn validate(config: &ProjectConfig) -> Result<()> {
    let errors = validate_config(config);

    if errors.is_empty() {
        Ok(())
    } else {
        let messages: Vec<_> = errors.iter().map(|e| e.message.clone()).collect();
        Err(LintError::ConfigValidation {
            message: messages.join("; "),
        })
    }
}
