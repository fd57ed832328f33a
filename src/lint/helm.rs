//! Parsing of `helm lint` text output.
//!
//! Helm prints findings as `[SEVERITY] path: message` or
//! `[SEVERITY] message`; headers and summary lines are ignored.

use std::sync::LazyLock;

use regex::Regex;

use crate::lint::message::{LintMessage, Severity};

static WITH_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[(INFO|WARNING|ERROR)\]\s+([^:]+):\s*(.+)$").expect("WITH_PATH must compile")
});

static WITHOUT_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[(INFO|WARNING|ERROR)\]\s+(.+)$").expect("WITHOUT_PATH must compile")
});

/// Extract every tagged finding from helm's output, in order.
pub fn parse_helm_output(output: &str) -> Vec<LintMessage> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            if let Some(caps) = WITH_PATH.captures(line) {
                let severity = Severity::from_tag(&caps[1])?;
                return Some(LintMessage::new(severity, caps[2].trim(), caps[3].trim()));
            }
            let caps = WITHOUT_PATH.captures(line)?;
            let severity = Severity::from_tag(&caps[1])?;
            Some(LintMessage::new(severity, "", caps[2].trim()))
        })
        .collect()
}
