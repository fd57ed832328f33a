//! Parent-to-child merging of project configurations.
//!
//! Configs are ordered outermost first. Each field has its own policy:
//!
//! - Scalar strings: a non-empty child value replaces the parent
//! - Channel lists: a non-empty child list replaces the parent wholesale
//! - Charts, preflights and manifests: child entries are appended
//! - Linter switches: replaced only when the child set them
//! - Tool versions: replaced per key

use std::collections::HashSet;

use crate::config::schema::{LintSettings, LinterConfig, ProjectConfig};
use crate::tools::Tool;

/// Merge configs in order (later overrides earlier).
pub fn merge_configs(configs: &[ProjectConfig]) -> ProjectConfig {
    configs
        .iter()
        .fold(ProjectConfig::default(), |acc, config| merge(acc, config))
}

/// Merge a single child config onto its parent.
pub fn merge(mut parent: ProjectConfig, child: &ProjectConfig) -> ProjectConfig {
    replace_scalar(&mut parent.app_id, &child.app_id);
    replace_scalar(&mut parent.app_slug, &child.app_slug);
    replace_scalar(&mut parent.release_label, &child.release_label);

    replace_list(
        &mut parent.promote_to_channel_ids,
        &child.promote_to_channel_ids,
    );
    replace_list(
        &mut parent.promote_to_channel_names,
        &child.promote_to_channel_names,
    );

    parent.charts.extend(child.charts.iter().cloned());
    parent.preflights.extend(child.preflights.iter().cloned());
    parent.manifests.extend(child.manifests.iter().cloned());

    parent.repl_lint = match (parent.repl_lint.take(), &child.repl_lint) {
        (Some(base), Some(overlay)) => Some(merge_lint(base, overlay)),
        (None, Some(overlay)) => Some(overlay.clone()),
        (base, None) => base,
    };

    parent
}

fn replace_scalar(target: &mut String, value: &str) {
    if !value.is_empty() {
        *target = value.to_string();
    }
}

fn replace_list(target: &mut Vec<String>, value: &[String]) {
    if !value.is_empty() {
        *target = value.to_vec();
    }
}

fn merge_lint(mut base: LintSettings, overlay: &LintSettings) -> LintSettings {
    if overlay.version.is_some() {
        base.version = overlay.version;
    }
    if overlay.enabled.is_some() {
        base.enabled = overlay.enabled;
    }
    for tool in Tool::ALL {
        merge_linter(base.linters.get_mut(tool), overlay.linters.get(tool));
    }
    for (name, version) in &overlay.tools {
        base.tools.insert(name.clone(), version.clone());
    }
    base
}

fn merge_linter(base: &mut LinterConfig, overlay: &LinterConfig) {
    if overlay.disabled.is_some() {
        base.disabled = overlay.disabled;
    }
    if overlay.strict.is_some() {
        base.strict = overlay.strict;
    }
}

/// Drop chart, preflight and manifest entries whose path was already seen.
///
/// The first occurrence wins, so parent ordering is preserved.
pub fn dedup_resources(config: &mut ProjectConfig) {
    let mut seen = HashSet::new();
    config.charts.retain(|c| seen.insert(c.path.clone()));

    let mut seen = HashSet::new();
    config.preflights.retain(|p| seen.insert(p.path.clone()));

    let mut seen = HashSet::new();
    config.manifests.retain(|m| seen.insert(m.clone()));
}
