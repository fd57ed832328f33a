//! Terminal UI.

use std::io::Write;

use console::Term;

use super::{should_use_colors, LintTheme, OutputMode, UserInterface};

/// Terminal UI implementation.
pub struct TerminalUI {
    out: Term,
    err: Term,
    theme: LintTheme,
    color: bool,
    mode: OutputMode,
}

impl TerminalUI {
    /// Create a terminal UI; `no_color` forces plain output.
    pub fn new(mode: OutputMode, no_color: bool) -> Self {
        let color = !no_color && should_use_colors();
        Self {
            out: Term::stdout(),
            err: Term::stderr(),
            theme: if color {
                LintTheme::new()
            } else {
                LintTheme::plain()
            },
            color,
            mode,
        }
    }
}

impl UserInterface for TerminalUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.err, "{}", msg).ok();
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.err, "{}", self.theme.format_success(msg)).ok();
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.err, "{}", self.theme.format_warning(msg)).ok();
        }
    }

    fn error(&mut self, msg: &str) {
        writeln!(self.err, "{}", self.theme.format_error(msg)).ok();
    }

    fn write_output(&mut self, text: &str) {
        write!(self.out, "{}", text).ok();
        self.out.flush().ok();
    }

    fn uses_color(&self) -> bool {
        self.color
    }
}
