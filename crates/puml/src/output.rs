//! Colored status output on stderr.
//!
//! stdout carries only generated markup, so everything here goes to stderr.

use std::fmt::Display;

use console::{Style, Term};

/// Status reporter for CLI commands.
pub(crate) struct Output {
    term: Term,
    green: Style,
    yellow: Style,
    red: Style,
    dim: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            green: Style::new().green(),
            yellow: Style::new().yellow(),
            red: Style::new().red(),
            dim: Style::new().dim(),
        }
    }

    /// Report a finished batch (green).
    pub(crate) fn rendered(&self, count: usize) {
        let msg = format!("Rendered {count} diagrams");
        let _ = self.term.write_line(&self.green.apply_to(msg).to_string());
    }

    /// Report a diagram that failed to render (yellow label, dimmed cause).
    pub(crate) fn diagram_failed(&self, label: &str, error: &impl Display) {
        let line = format!(
            "{} {}",
            self.yellow.apply_to(format!("{label}:")),
            self.dim.apply_to(error)
        );
        let _ = self.term.write_line(&line);
    }

    /// Print an error message (red).
    pub(crate) fn error(&self, msg: &str) {
        let _ = self.term.write_line(&self.red.apply_to(msg).to_string());
    }
}
