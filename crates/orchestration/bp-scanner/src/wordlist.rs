//! Line-oriented word sources.

use bp_error::ConfigError;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::warn;

/// A lazily read wordlist.
///
/// Yields one trimmed word per non-blank line. Lines that are not valid
/// UTF-8 are skipped. An I/O error ends the iteration early; it is logged
/// rather than propagated because it happens long after pre-flight checks
/// have passed.
pub struct Wordlist {
    /// Name used in log messages
    label: String,

    /// Underlying reader
    reader: Box<dyn BufRead + Send>,

    /// Reusable line buffer
    line: Vec<u8>,

    /// Lines read so far
    lineno: u64,

    /// Whether the reader has been exhausted
    done: bool,
}

impl Wordlist {
    /// Open a wordlist file.
    ///
    /// Failing to open the file is a configuration error.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| ConfigError::Unreadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Ok(Self::with_reader(
            path.display().to_string(),
            Box::new(BufReader::new(file)),
        ))
    }

    /// Create a wordlist over any reader (for testing or piping).
    pub fn with_reader(label: impl Into<String>, reader: Box<dyn BufRead + Send>) -> Self {
        Self {
            label: label.into(),
            reader,
            line: Vec::new(),
            lineno: 0,
            done: false,
        }
    }

    /// Create a wordlist from in-memory text.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self::with_reader(
            "<memory>",
            Box::new(std::io::Cursor::new(text.into().into_bytes())),
        )
    }

    /// Name of the source.
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl Iterator for Wordlist {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        while !self.done {
            self.line.clear();
            match self.reader.read_until(b'\n', &mut self.line) {
                Ok(0) => self.done = true,
                Ok(_) => {
                    self.lineno += 1;
                    match std::str::from_utf8(&self.line) {
                        Ok(line) => {
                            let word = line.trim();
                            if !word.is_empty() {
                                return Some(word.to_string());
                            }
                        }
                        Err(_) => {
                            warn!(
                                source = %self.label,
                                line = self.lineno,
                                "Skipping line that is not valid UTF-8"
                            );
                        }
                    }
                }
                Err(e) => {
                    warn!(source = %self.label, error = %e, "Stopped reading wordlist");
                    self.done = true;
                }
            }
        }
        None
    }
}

impl std::fmt::Debug for Wordlist {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wordlist")
            .field("label", &self.label)
            .field("done", &self.done)
            .finish()
    }
}
