//! Output mode.

/// Output verbosity mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Status messages plus one line per linter.
    Verbose,
    /// Status messages and the report.
    #[default]
    Normal,
    /// The report and errors only.
    Quiet,
}

impl OutputMode {
    /// Check if this mode shows status messages.
    pub fn shows_status(&self) -> bool {
        !matches!(self, Self::Quiet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_hides_status() {
        assert!(OutputMode::Verbose.shows_status());
        assert!(OutputMode::Normal.shows_status());
        assert!(!OutputMode::Quiet.shows_status());
    }
}
