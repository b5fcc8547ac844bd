//! Terminal presentation for a collection run.
//!
//! Per-step progress goes through [`TerminalReporter`]. The command handler
//! and `main` use [`OutputContext`] directly for the run banner, the closing
//! summary and the fatal error line.

pub mod reporter;
pub mod styles;

use console::Term;
use owo_colors::OwoColorize as _;
pub use reporter::TerminalReporter;
pub use styles::Styles;

/// Width of the key column in the run summary.
const KEY_WIDTH: usize = 8;

/// Styling and verbosity shared by everything the collector prints.
pub struct OutputContext {
    pub styles: Styles,
    /// Only errors, warnings and the archive path are printed.
    pub quiet: bool,
}

impl OutputContext {
    /// Colors are used on a terminal unless `--no-color` or `NO_COLOR` is set.
    #[must_use]
    pub fn new(no_color: bool, quiet: bool) -> Self {
        let mut styles = Styles::default();
        if !no_color && std::env::var_os("NO_COLOR").is_none() && Term::stdout().is_term() {
            styles.colorize();
        }
        Self { styles, quiet }
    }

    /// Run banner or summary title.
    pub fn header(&self, title: &str) {
        if !self.quiet {
            println!("  {}", title.style(self.styles.header));
        }
    }

    /// One `key  value` line of the run summary.
    pub fn kv(&self, key: &str, value: &str) {
        if !self.quiet {
            let key = format!("{key:<KEY_WIDTH$}");
            println!("  {}  {value}", key.style(self.styles.dim));
        }
    }

    /// Summary-level warning. Warnings raised during the run go through the reporter.
    pub fn warn(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", "⚠".style(self.styles.warning));
        }
    }

    /// The error that ended the run. Printed to stderr, even when quiet.
    pub fn error(&self, err: &anyhow::Error) {
        eprintln!("  {} Error: {err:#}", "✗".style(self.styles.error));
    }
}
