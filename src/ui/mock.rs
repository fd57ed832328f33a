//! Mock UI implementation for testing.
//!
//! `MockUI` implements the `UserInterface` trait and captures all
//! interactions for later assertion.
//!
//! # Example
//!
//! ```
//! use replicated_lint::ui::{MockUI, UserInterface};
//!
//! let mut ui = MockUI::new();
//! ui.message("Resolving helm");
//! ui.write_output("==> Linting chart: ./charts/web\n");
//!
//! assert!(ui.has_message("Resolving"));
//! assert!(ui.output().contains("Linting chart"));
//! ```

use super::{OutputMode, UserInterface};

/// Captures UI interactions.
#[derive(Debug, Default)]
pub struct MockUI {
    mode: OutputMode,
    messages: Vec<String>,
    successes: Vec<String>,
    warnings: Vec<String>,
    errors: Vec<String>,
    output: String,
}

impl MockUI {
    /// Create a new MockUI with Normal output mode.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mode: OutputMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn successes(&self) -> &[String] {
        &self.successes
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Everything passed to `write_output`, concatenated.
    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn has_message(&self, msg: &str) -> bool {
        self.messages.iter().any(|m| m.contains(msg))
    }

    pub fn has_success(&self, msg: &str) -> bool {
        self.successes.iter().any(|m| m.contains(msg))
    }

    pub fn has_warning(&self, msg: &str) -> bool {
        self.warnings.iter().any(|m| m.contains(msg))
    }

    pub fn has_error(&self, msg: &str) -> bool {
        self.errors.iter().any(|m| m.contains(msg))
    }
}

impl UserInterface for MockUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        self.messages.push(msg.to_string());
    }

    fn success(&mut self, msg: &str) {
        self.successes.push(msg.to_string());
    }

    fn warning(&mut self, msg: &str) {
        self.warnings.push(msg.to_string());
    }

    fn error(&mut self, msg: &str) {
        self.errors.push(msg.to_string());
    }

    fn write_output(&mut self, text: &str) {
        self.output.push_str(text);
    }

    fn uses_color(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_each_channel() {
        let mut ui = MockUI::new();
        ui.message("m");
        ui.success("s");
        ui.warning("w");
        ui.error("e");
        assert_eq!(ui.messages(), ["m"]);
        assert_eq!(ui.successes(), ["s"]);
        assert_eq!(ui.warnings(), ["w"]);
        assert_eq!(ui.errors(), ["e"]);
    }

    #[test]
    fn output_accumulates() {
        let mut ui = MockUI::new();
        ui.write_output("a");
        ui.write_output("b\n");
        assert_eq!(ui.output(), "ab\n");
    }

    #[test]
    fn mode_is_reported() {
        assert_eq!(MockUI::new().output_mode(), OutputMode::Normal);
        assert_eq!(
            MockUI::with_mode(OutputMode::Verbose).output_mode(),
            OutputMode::Verbose
        );
    }
}
