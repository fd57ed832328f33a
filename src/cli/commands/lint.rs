//! Lint command implementation.
//!
//! `replicated-lint lint` resolves the project config, discovers every
//! resource an enabled linter covers, resolves each linter binary once and
//! runs it per resource, then prints one report.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::cli::args::LintArgs;
use crate::config::schema::{LintSettings, LATEST};
use crate::config::{find_config_files, resolve_config, ProjectConfig};
use crate::discovery::{
    discover_chart_paths, discover_manifest_files, discover_preflight_paths,
    discover_support_bundles_from_manifests, is_chart_directory, GitignoreChecker,
};
use crate::error::{LintError, Result};
use crate::lint::output::{
    HumanFormatter, JsonFormatter, LintFormatter, LintReport, LinterSection, OutputFormat,
    ReportMetadata, ResourceReport,
};
use crate::lint::{
    extract_ec_version, is_embedded_cluster_config, lint_chart, lint_embedded_cluster, lint_kots,
    lint_preflight, lint_support_bundle, LintResult, PreflightInput,
};
use crate::tools::{compare_versions, Resolver, ResolverSettings, Tool};
use crate::ui::{OutputMode, UserInterface};
use crate::validation::{
    discover_helmchart_manifests, read_all_chart_metadata, read_chart_metadata,
    validate_chart_mapping, ManifestIndex,
};

use super::dispatcher::{Command, CommandResult};

/// One resource to hand to a linter.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Target {
    Chart(PathBuf),
    Preflight {
        spec: PathBuf,
        values: Option<PathBuf>,
        chart_key: Option<String>,
    },
    SupportBundle(PathBuf),
    EmbeddedCluster(PathBuf),
    Kots(PathBuf),
}

impl Target {
    fn path(&self) -> &Path {
        match self {
            Self::Chart(path)
            | Self::SupportBundle(path)
            | Self::EmbeddedCluster(path)
            | Self::Kots(path) => path,
            Self::Preflight { spec, .. } => spec,
        }
    }
}

/// The lint command implementation.
pub struct LintCommand {
    project_root: PathBuf,
    config_path: Option<PathBuf>,
    args: LintArgs,
    settings: ResolverSettings,
}

impl LintCommand {
    /// Create a new lint command.
    pub fn new(project_root: &Path, config_path: Option<&Path>, args: LintArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            config_path: config_path.map(Path::to_path_buf),
            args,
            settings: ResolverSettings::default(),
        }
    }

    /// Use non-default cache, URLs or timeouts for tool resolution.
    pub fn with_resolver_settings(mut self, settings: ResolverSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Get the command arguments.
    pub fn args(&self) -> &LintArgs {
        &self.args
    }

    fn load_config(&self) -> Result<ProjectConfig> {
        let start = self.config_path.as_deref().unwrap_or(&self.project_root);
        resolve_config(Some(start))
    }

    fn config_file(&self) -> Option<PathBuf> {
        self.config_path
            .clone()
            .or_else(|| find_config_files(&self.project_root).pop())
    }

    /// Path as shown in the report, relative to the project when possible.
    fn display_path(&self, path: &Path) -> String {
        match path.strip_prefix(&self.project_root) {
            Ok(rel) if rel.as_os_str().is_empty() => ".".to_string(),
            Ok(rel) => format!("./{}", rel.display()),
            Err(_) => path.display().to_string(),
        }
    }

    fn discover_charts(
        &self,
        config: &ProjectConfig,
        gitignore: Option<&GitignoreChecker>,
    ) -> Result<Vec<PathBuf>> {
        let mut seen = HashSet::new();
        let mut charts = Vec::new();
        for entry in &config.charts {
            for dir in discover_chart_paths(&entry.path, gitignore)? {
                if seen.insert(dir.clone()) {
                    charts.push(dir);
                }
            }
        }
        Ok(charts)
    }

    fn discover_preflights(
        &self,
        config: &ProjectConfig,
        gitignore: Option<&GitignoreChecker>,
    ) -> Result<Vec<Target>> {
        let mut targets = Vec::new();
        for entry in &config.preflights {
            let values = entry.values_path.as_deref().map(PathBuf::from);
            let chart_key = match values.as_deref().and_then(Path::parent) {
                Some(dir) if is_chart_directory(dir) => Some(read_chart_metadata(dir)?.key()),
                _ => None,
            };
            for spec in discover_preflight_paths(&entry.path, gitignore)? {
                targets.push(Target::Preflight {
                    spec,
                    values: values.clone(),
                    chart_key: chart_key.clone(),
                });
            }
        }
        Ok(targets)
    }

    fn discover_embedded_cluster_configs(
        &self,
        config: &ProjectConfig,
        gitignore: Option<&GitignoreChecker>,
    ) -> Result<Vec<PathBuf>> {
        let mut configs = Vec::new();
        for path in discover_manifest_files(&config.manifests, gitignore)? {
            match fs::read_to_string(&path) {
                Ok(content) if is_embedded_cluster_config(&content) => configs.push(path),
                Ok(_) => {}
                Err(e) => debug!("Skipping unreadable manifest {}: {}", path.display(), e),
            }
        }
        Ok(configs)
    }

    fn discover_kots_dirs(
        &self,
        config: &ProjectConfig,
        gitignore: Option<&GitignoreChecker>,
    ) -> Result<Vec<PathBuf>> {
        let mut seen = HashSet::new();
        Ok(discover_manifest_files(&config.manifests, gitignore)?
            .into_iter()
            .filter_map(|file| file.parent().map(Path::to_path_buf))
            .filter(|dir| seen.insert(dir.clone()))
            .collect())
    }

    /// Resources for one linter, in lint order.
    fn targets(
        &self,
        tool: Tool,
        config: &ProjectConfig,
        charts: &[PathBuf],
        gitignore: Option<&GitignoreChecker>,
    ) -> Result<Vec<Target>> {
        Ok(match tool {
            Tool::Helm => charts.iter().cloned().map(Target::Chart).collect(),
            Tool::Preflight => self.discover_preflights(config, gitignore)?,
            Tool::SupportBundle => {
                discover_support_bundles_from_manifests(&config.manifests, gitignore)?
                    .into_iter()
                    .map(Target::SupportBundle)
                    .collect()
            }
            Tool::EmbeddedCluster => self
                .discover_embedded_cluster_configs(config, gitignore)?
                .into_iter()
                .map(Target::EmbeddedCluster)
                .collect(),
            Tool::Kots => self
                .discover_kots_dirs(config, gitignore)?
                .into_iter()
                .map(Target::Kots)
                .collect(),
        })
    }

    /// Configured version spec, with embedded cluster's `latest` pinned
    /// to the version its config declares.
    fn version_spec(&self, tool: Tool, settings: &LintSettings, targets: &[Target]) -> Result<String> {
        let spec = settings.tool_version(tool);
        if tool != Tool::EmbeddedCluster || spec != LATEST {
            return Ok(spec.to_string());
        }
        match targets.first() {
            Some(target) => extract_ec_version(target.path()),
            None => Ok(spec.to_string()),
        }
    }

    /// Locate the binary for `tool`, recording the version used.
    fn binary(
        &self,
        resolver: &Resolver,
        tool: Tool,
        spec: &str,
        report: &mut LintReport,
    ) -> Result<PathBuf> {
        if resolver.override_path(tool).is_some() {
            report
                .metadata
                .tool_versions
                .insert(tool.name().to_string(), "local".to_string());
            return resolver.locate(tool, spec);
        }

        let version = resolver.resolve_version(tool, spec)?;
        report
            .metadata
            .tool_versions
            .insert(tool.name().to_string(), version.clone());

        // Cached pins resolve without network access.
        if spec != LATEST && !resolver.cache().is_cached(tool, &version, resolver.platform()) {
            self.check_outdated(resolver, tool, &version, report);
        }
        resolver.resolve(tool, &version)
    }

    fn check_outdated(&self, resolver: &Resolver, tool: Tool, version: &str, report: &mut LintReport) {
        match resolver.latest_version(tool) {
            Ok(recommended) if compare_versions(version, &recommended) => {
                warn!("{} {} is older than recommended {}", tool, version, recommended);
                report.warnings.push(format!(
                    "{} {} is outdated; {} is recommended. Update the version in .replicated",
                    tool, version, recommended
                ));
            }
            Ok(_) => {}
            Err(e) => debug!("Skipping version check for {}: {}", tool, e),
        }
    }

    fn lint_target(
        &self,
        binary: &Path,
        target: &Target,
        manifests: &ManifestIndex,
    ) -> Result<LintResult> {
        match target {
            Target::Chart(dir) => lint_chart(binary, dir),
            Target::Preflight {
                spec,
                values,
                chart_key,
            } => lint_preflight(
                binary,
                PreflightInput {
                    spec_path: spec,
                    values_path: values.as_deref(),
                    chart_key: chart_key.as_deref(),
                },
                manifests,
            ),
            Target::SupportBundle(spec) => lint_support_bundle(binary, spec),
            Target::EmbeddedCluster(config) => lint_embedded_cluster(binary, config),
            Target::Kots(dir) => lint_kots(binary, dir),
        }
    }

    /// Discover, resolve and run one linter into a report section.
    #[allow(clippy::too_many_arguments)]
    fn run_linter(
        &self,
        tool: Tool,
        config: &ProjectConfig,
        settings: &LintSettings,
        charts: &[PathBuf],
        manifests: &ManifestIndex,
        resolver: &Resolver,
        gitignore: Option<&GitignoreChecker>,
        report: &mut LintReport,
    ) -> Result<LinterSection> {
        let linter = settings.linters.get(tool);
        let mut section = LinterSection::new(tool, linter.is_enabled(tool));
        if !section.enabled {
            debug!("{} linting is disabled", tool);
            return Ok(section);
        }

        let targets = self.targets(tool, config, charts, gitignore)?;
        if targets.is_empty() {
            return Ok(section);
        }
        let strict = self.args.strict || linter.is_strict();

        let binary = self
            .version_spec(tool, settings, &targets)
            .and_then(|spec| self.binary(resolver, tool, &spec, report));
        let binary = match binary {
            Ok(binary) => binary,
            Err(e) => {
                warn!("Could not resolve {}: {}", tool, e);
                section.resources = targets
                    .iter()
                    .map(|t| ResourceReport::from_error(self.display_path(t.path()), &e))
                    .collect();
                return Ok(section);
            }
        };

        for target in &targets {
            let path = self.display_path(target.path());
            let resource = match self.lint_target(&binary, target, manifests) {
                Ok(result) => ResourceReport::from_result(path, result, strict),
                Err(e) => ResourceReport::from_error(path, &e),
            };
            section.resources.push(resource);
        }
        Ok(section)
    }

    /// Run every linter and collect the report.
    pub fn build_report(&self) -> Result<LintReport> {
        let config = self.load_config()?;
        let settings = config.lint_settings();

        let mut report = LintReport::new(ReportMetadata {
            config_file: self.config_file().map(|p| p.display().to_string()),
            cli_version: env!("CARGO_PKG_VERSION").to_string(),
            ..Default::default()
        });
        if !settings.is_enabled() {
            report.sections = Tool::ALL
                .iter()
                .map(|tool| LinterSection::new(*tool, false))
                .collect();
            return Ok(report);
        }

        let gitignore = GitignoreChecker::new(&self.project_root)?;
        let gitignore = gitignore.as_ref();
        let enabled = |tool: Tool| settings.linters.get(tool).is_enabled(tool);

        let charts = if enabled(Tool::Helm) {
            self.discover_charts(&config, gitignore)?
        } else {
            Vec::new()
        };

        let manifests = if !config.manifests.is_empty()
            && (enabled(Tool::Helm) || enabled(Tool::Preflight))
        {
            discover_helmchart_manifests(&config.manifests, gitignore)?
        } else {
            ManifestIndex::new()
        };

        if !charts.is_empty() && !config.manifests.is_empty() {
            let metadata = read_all_chart_metadata(&charts)?;
            for warning in validate_chart_mapping(&metadata, &manifests)? {
                report.warnings.push(warning.message);
            }
        }

        let resolver = Resolver::new(self.settings.clone())?;
        for tool in Tool::ALL {
            let section = self.run_linter(
                tool,
                &config,
                &settings,
                &charts,
                &manifests,
                &resolver,
                gitignore,
                &mut report,
            )?;
            report.sections.push(section);
        }
        Ok(report)
    }

    /// Render a report in the selected format.
    fn format_output(&self, report: &LintReport, use_color: bool) -> std::io::Result<String> {
        let mut output = Vec::new();
        match self.args.format {
            OutputFormat::Json => JsonFormatter::new().format(report, &mut output)?,
            OutputFormat::Human => HumanFormatter::new(use_color).format(report, &mut output)?,
        }
        Ok(String::from_utf8_lossy(&output).into_owned())
    }
}

/// One status line per linter for verbose output.
fn section_status(section: &LinterSection, report: &LintReport) -> String {
    if !section.enabled {
        return format!("{}: disabled", section.tool);
    }
    if section.resources.is_empty() {
        return format!("{}: nothing to lint", section.tool);
    }
    let version = report
        .metadata
        .tool_versions
        .get(section.tool.name())
        .map(String::as_str)
        .unwrap_or("unresolved");
    format!(
        "{} {}: {} linted, {} failed",
        section.tool,
        version,
        section.resources.len(),
        section.failed()
    )
}

impl Command for LintCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let report = match self.build_report() {
            Ok(report) => report,
            Err(LintError::ConfigParse { path, message }) => {
                ui.error(&format!("Parse error in {}: {}", path.display(), message));
                return Ok(CommandResult::failure(2));
            }
            Err(e) => return Err(e),
        };

        if ui.output_mode() == OutputMode::Verbose {
            for section in &report.sections {
                ui.message(&section_status(section, &report));
            }
        }
        // Human output already lists warnings.
        if self.args.format == OutputFormat::Json {
            for warning in &report.warnings {
                ui.warning(warning);
            }
        }

        let output = self.format_output(&report, ui.uses_color())?;
        ui.write_output(&output);

        if report.is_success() {
            ui.success("linting passed");
            Ok(CommandResult::success())
        } else {
            ui.error("linting failed");
            Ok(CommandResult::failure(1))
        }
    }
}
