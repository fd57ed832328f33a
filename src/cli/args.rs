//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::lint::OutputFormat;

/// Lint Replicated application resources with their upstream linters.
#[derive(Debug, Parser)]
#[command(name = "replicated-lint")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a config file (skips upward discovery)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to project directory (overrides current directory)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Show a status line per linter
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Print only the report and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Lint charts, preflight specs and manifests (default if no command specified)
    Lint(LintArgs),
}

/// Arguments for the `lint` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct LintArgs {
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,

    /// Treat warnings as errors for every linter
    #[arg(long)]
    pub strict: bool,
}
