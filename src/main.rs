//! Replicated lint CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use replicated_lint::cli::{Cli, CommandDispatcher};
use replicated_lint::config::paths::clean;
use replicated_lint::ui::{OutputMode, TerminalUI, UserInterface};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging.
///
/// Log level is controlled by:
/// 1. `--debug` flag sets level to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. `--quiet` lowers the default to WARN
/// 4. Default is INFO
fn init_tracing(debug: bool, quiet: bool) {
    let filter = if debug {
        EnvFilter::new("replicated_lint=debug")
    } else {
        let default = if quiet {
            "replicated_lint=warn"
        } else {
            "replicated_lint=info"
        };
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug, cli.quiet);

    tracing::debug!("replicated-lint starting with args: {:?}", cli);

    let output_mode = if cli.quiet {
        OutputMode::Quiet
    } else if cli.verbose {
        OutputMode::Verbose
    } else {
        OutputMode::Normal
    };

    let cwd = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("Error: cannot determine working directory: {}", e);
            return ExitCode::from(1);
        }
    };
    let project_root = match &cli.project {
        Some(path) => clean(&cwd.join(path)),
        None => cwd,
    };

    let mut ui = TerminalUI::new(output_mode, cli.no_color);
    let dispatcher = CommandDispatcher::new(project_root);

    match dispatcher.dispatch(&cli, &mut ui) {
        Ok(result) => ExitCode::from(result.exit_code as u8),
        Err(e) => {
            ui.error(&format!("Error: {}", e));
            ExitCode::from(1)
        }
    }
}
