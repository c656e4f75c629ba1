//! The console text an invocation produces.

use chrono::NaiveTime;
use refbuild_diagnostics::{error_summary, Diagnostic, DiagnosticRenderer, PlainRenderer};
use refbuild_vfs::Vfs;

/// Formats a virtual clock reading as a wall-clock stamp such as `12:00:05 AM`.
///
/// The clock counts seconds from midnight of the scenario's first day.
pub fn timestamp(ticks: u64) -> String {
    let seconds = u32::try_from(ticks % 86_400).unwrap_or_default();
    NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0)
        .unwrap_or_default()
        .format("%-I:%M:%S %p")
        .to_string()
}

/// Accumulates status lines and rendered diagnostics for one invocation.
#[derive(Debug)]
pub struct Console {
    text: String,
    renderer: PlainRenderer,
    error_count: usize,
}

impl Console {
    /// Creates an empty console rendering paths relative to `current_directory`.
    pub fn new(current_directory: &str) -> Self {
        Self {
            text: String::new(),
            renderer: PlainRenderer::new(current_directory),
            error_count: 0,
        }
    }

    /// Appends a timestamped status line followed by a blank line.
    pub fn status(&mut self, ticks: u64, message: &str) {
        self.text
            .push_str(&format!("[{}] {message}\n\n", timestamp(ticks)));
    }

    /// Renders diagnostics and counts the errors among them.
    pub fn report(&mut self, fs: &Vfs, diagnostics: &[Diagnostic]) {
        for diag in diagnostics {
            if diag.is_error() {
                self.error_count += 1;
            }
            self.text.push_str(&self.renderer.render(diag, fs));
        }
    }

    /// Returns the number of errors reported so far.
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    /// Appends the `Found N errors.` summary, if any error was reported, and
    /// returns the finished text.
    pub fn finish(mut self) -> String {
        if let Some(summary) = error_summary(self.error_count) {
            self.text.push_str(&format!("\n{summary}\n\n"));
        }
        self.text
    }

    /// Returns the text so far.
    pub fn text(&self) -> &str {
        &self.text
    }
}
