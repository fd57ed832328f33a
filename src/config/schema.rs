//! Configuration schema for `.replicated` project files.
//!
//! Fields use the camelCase names of the on-disk format. Optional values
//! that take part in merging are modelled as `Option` so that "not set"
//! can be told apart from an explicit `false`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::tools::Tool;

/// Version token that resolves to the currently recommended release.
pub const LATEST: &str = "latest";

/// Root configuration structure for a `.replicated` file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    /// Vendor application ID.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub app_id: String,

    /// Vendor application slug.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub app_slug: String,

    /// Channel IDs a release is promoted to.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub promote_to_channel_ids: Vec<String>,

    /// Channel names a release is promoted to.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub promote_to_channel_names: Vec<String>,

    /// Helm charts in this project.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub charts: Vec<ChartEntry>,

    /// Preflight specs in this project.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub preflights: Vec<PreflightEntry>,

    /// Label applied to created releases.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub release_label: String,

    /// Glob patterns for KOTS manifests.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub manifests: Vec<String>,

    /// Lint settings.
    #[serde(rename = "repl-lint", default, skip_serializing_if = "Option::is_none")]
    pub repl_lint: Option<LintSettings>,
}

impl ProjectConfig {
    /// Lint settings, or defaults if the block is absent.
    pub fn lint_settings(&self) -> LintSettings {
        self.repl_lint.clone().unwrap_or_default()
    }
}

/// A chart reference (path may be a glob).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartEntry {
    #[serde(default)]
    pub path: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_version: Option<String>,
}

/// A preflight spec reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreflightEntry {
    #[serde(default)]
    pub path: String,

    /// Helm values file rendered into the preflight template.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values_path: Option<String>,
}

/// The `repl-lint` block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LintSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    #[serde(default)]
    pub linters: LintersConfig,

    /// Tool name to version spec (`latest` or semver).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tools: BTreeMap<String, String>,
}

impl LintSettings {
    /// Whether linting runs at all.
    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }

    /// Configured version spec for a tool, `latest` if unset.
    pub fn tool_version(&self, tool: Tool) -> &str {
        self.tools
            .get(tool.name())
            .map(String::as_str)
            .unwrap_or(LATEST)
    }
}

/// Per-linter settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LintersConfig {
    #[serde(default)]
    pub helm: LinterConfig,

    #[serde(default)]
    pub preflight: LinterConfig,

    #[serde(default)]
    pub support_bundle: LinterConfig,

    #[serde(default)]
    pub embedded_cluster: LinterConfig,

    #[serde(default)]
    pub kots: LinterConfig,
}

impl LintersConfig {
    pub fn get(&self, tool: Tool) -> &LinterConfig {
        match tool {
            Tool::Helm => &self.helm,
            Tool::Preflight => &self.preflight,
            Tool::SupportBundle => &self.support_bundle,
            Tool::EmbeddedCluster => &self.embedded_cluster,
            Tool::Kots => &self.kots,
        }
    }

    pub fn get_mut(&mut self, tool: Tool) -> &mut LinterConfig {
        match tool {
            Tool::Helm => &mut self.helm,
            Tool::Preflight => &mut self.preflight,
            Tool::SupportBundle => &mut self.support_bundle,
            Tool::EmbeddedCluster => &mut self.embedded_cluster,
            Tool::Kots => &mut self.kots,
        }
    }
}

/// Tri-state linter switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinterConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,

    /// Treat warnings as failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
}

impl LinterConfig {
    /// Whether the linter should run, falling back to the tool default.
    pub fn is_enabled(&self, tool: Tool) -> bool {
        !self.disabled.unwrap_or(!tool.enabled_by_default())
    }

    pub fn is_strict(&self) -> bool {
        self.strict.unwrap_or(false)
    }
}
