//! User interface components.
//!
//! This module provides:
//! - [`UserInterface`] trait for UI abstraction
//! - [`TerminalUI`] writing to the real terminal
//! - [`MockUI`] capturing output for tests
//!
//! Reports go to stdout; status lines, warnings and errors go to stderr
//! so `--format json` output stays machine-readable.
//!
//! # Example
//!
//! ```
//! use replicated_lint::ui::{MockUI, UserInterface};
//!
//! let mut ui = MockUI::new();
//! ui.warning("helm 3.12.0 is outdated");
//! assert!(ui.has_warning("outdated"));
//! ```

pub mod mock;
pub mod output;
pub mod terminal;
pub mod theme;

pub use mock::MockUI;
pub use output::OutputMode;
pub use terminal::TerminalUI;
pub use theme::{should_use_colors, LintTheme};

/// Trait for user interface interactions.
///
/// This trait allows mocking the UI in tests.
pub trait UserInterface {
    /// Get the current output mode.
    fn output_mode(&self) -> OutputMode;

    /// Display a status message.
    fn message(&mut self, msg: &str);

    /// Display a success message.
    fn success(&mut self, msg: &str);

    /// Display a warning message.
    fn warning(&mut self, msg: &str);

    /// Display an error message. Shown in every mode.
    fn error(&mut self, msg: &str);

    /// Write command output verbatim to stdout.
    fn write_output(&mut self, text: &str);

    /// Whether styled output should carry ANSI colors.
    fn uses_color(&self) -> bool;
}
