//! Console output for found buckets.

use async_trait::async_trait;
use bp_error::Result;
use bp_traits::{Diagnostic, ResultSink};
use bp_types::CheckResult;
use console::{Style, style};
use std::io::{self, Write};

/// Prints one line per found bucket.
///
/// ```text
/// Bucket: R/W example-backups (us-east-1)
/// ```
///
/// `R` and `W` are green when allowed and red when denied.
pub struct ConsoleSink {
    out: Box<dyn Write + Send>,
    colored: bool,
    show_diagnostics: bool,
}

impl ConsoleSink {
    /// Print to stdout, coloured when stdout is a terminal.
    pub fn stdout() -> Self {
        Self {
            out: Box::new(io::stdout()),
            colored: console::colors_enabled(),
            show_diagnostics: false,
        }
    }

    /// Print to any writer without colours (for testing or piping).
    pub fn with_writer(out: Box<dyn Write + Send>) -> Self {
        Self {
            out,
            colored: false,
            show_diagnostics: false,
        }
    }

    /// Also print abandoned probes.
    pub fn with_diagnostics(mut self, show: bool) -> Self {
        self.show_diagnostics = show;
        self
    }

    fn permission(&self, flag: &str, allowed: bool) -> String {
        if !self.colored {
            return flag.to_string();
        }
        let paint = if allowed {
            Style::new().green().bold()
        } else {
            Style::new().red()
        };
        paint.force_styling(true).apply_to(flag).to_string()
    }

    /// Format the line for `result`.
    pub fn format_line(&self, result: &CheckResult) -> String {
        format!(
            "Bucket: {}/{} {} ({})",
            self.permission("R", result.listable),
            self.permission("W", result.writable),
            result.name,
            result.region
        )
    }
}

#[async_trait]
impl ResultSink for ConsoleSink {
    async fn report(&mut self, result: &CheckResult) -> Result<()> {
        let line = self.format_line(result);
        writeln!(self.out, "{line}")?;
        Ok(())
    }

    async fn diagnostic(&mut self, diagnostic: &Diagnostic) -> Result<()> {
        if !self.show_diagnostics {
            return Ok(());
        }
        if self.colored {
            writeln!(self.out, "{}", style(diagnostic).yellow().force_styling(true))?;
        } else {
            writeln!(self.out, "{diagnostic}")?;
        }
        Ok(())
    }

    async fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}
