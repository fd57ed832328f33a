//! The normalized lint result model every linter parser produces.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Severity of a lint message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Warning => "WARNING",
            Self::Info => "INFO",
        }
    }

    /// Parse an exact `ERROR`, `WARNING` or `INFO` tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "ERROR" => Some(Self::Error),
            "WARNING" => Some(Self::Warning),
            "INFO" => Some(Self::Info),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One finding from a linter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LintMessage {
    pub severity: Severity,
    /// File the finding refers to; empty when the linter gave none.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub path: String,
    pub message: String,
}

impl LintMessage {
    pub fn new(severity: Severity, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Outcome of linting one resource.
///
/// `success` mirrors the linter's exit status, not the message list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct LintResult {
    pub success: bool,
    pub messages: Vec<LintMessage>,
}

impl LintResult {
    pub fn counts(&self) -> SeverityCounts {
        SeverityCounts::from_messages(&self.messages)
    }
}

/// Message totals per severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SeverityCounts {
    #[serde(rename = "error_count")]
    pub errors: usize,
    #[serde(rename = "warning_count")]
    pub warnings: usize,
    #[serde(rename = "info_count")]
    pub infos: usize,
}

impl SeverityCounts {
    pub fn from_messages(messages: &[LintMessage]) -> Self {
        messages.iter().fold(Self::default(), |mut counts, msg| {
            match msg.severity {
                Severity::Error => counts.errors += 1,
                Severity::Warning => counts.warnings += 1,
                Severity::Info => counts.infos += 1,
            }
            counts
        })
    }

    pub fn add(&mut self, other: SeverityCounts) {
        self.errors += other.errors;
        self.warnings += other.warnings;
        self.infos += other.infos;
    }
}
