//! Colored terminal output utilities.

use std::path::Path;

use console::{Style, Term};
use mdpage_builder::{BuildReporter, size_kb};

/// Terminal output formatter.
///
/// Progress goes to stdout; warnings and errors go to stderr.
pub(crate) struct Output {
    out: Term,
    err: Term,
    green: Style,
    yellow: Style,
    red: Style,
}

impl Output {
    /// Create a new output formatter.
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            out: Term::stdout(),
            err: Term::stderr(),
            green: Style::new().green(),
            yellow: Style::new().yellow(),
            red: Style::new().red(),
        }
    }

    /// Print an info message.
    pub(crate) fn info(&self, msg: &str) {
        let _ = self.out.write_line(msg);
    }

    /// Print a success message (green).
    pub(crate) fn success(&self, msg: &str) {
        let _ = self.out.write_line(&self.green.apply_to(msg).to_string());
    }

    /// Print a warning message (yellow).
    pub(crate) fn warn(&self, msg: &str) {
        let _ = self.err.write_line(&self.yellow.apply_to(msg).to_string());
    }

    /// Print an error message (red).
    pub(crate) fn error(&self, msg: &str) {
        let _ = self.err.write_line(&self.red.apply_to(msg).to_string());
    }
}

impl BuildReporter for Output {
    fn diagram_rendering(&self, number: usize) {
        self.info(&format!("Generating SVG for Mermaid block {number}..."));
    }

    fn diagrams_processed(&self, count: usize) {
        self.info(&format!("Processed {count} Mermaid block(s)"));
    }

    fn warning(&self, message: &str) {
        self.warn(&format!("Warning: {message}"));
    }

    fn page_written(&self, path: &Path, bytes: usize) {
        self.success(&format!(
            "HTML saved to {}; {} KB",
            path.display(),
            size_kb(bytes)
        ));
    }
}
