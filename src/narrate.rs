//! Narration sink for the round's user-facing progress lines.
//!
//! The protocol reports through [`Narrator::emit`] and never knows how
//! many destinations sit behind it. [`TeeNarrator`] writes to stdout
//! and optionally duplicates every line into a log file; emission is
//! line-atomic per destination so concurrent submitters do not
//! interleave.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use parking_lot::Mutex;

/// Sink for formatted narration lines.
pub trait Narrator: Send + Sync {
    /// Emits one complete line (without a trailing newline).
    fn emit(&self, line: &str);
}

/// Console narrator with an optional file tee.
#[derive(Debug, Default)]
pub struct TeeNarrator {
    file: Option<Mutex<BufWriter<File>>>,
}

impl TeeNarrator {
    /// Console-only narrator.
    #[must_use]
    pub fn console() -> Self {
        Self { file: None }
    }

    /// Console narrator that also duplicates every line into `path`,
    /// truncating any existing file.
    ///
    /// # Errors
    /// Returns the I/O error from creating the file.
    pub fn with_file(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            file: Some(Mutex::new(BufWriter::new(file))),
        })
    }
}

impl Narrator for TeeNarrator {
    fn emit(&self, line: &str) {
        {
            let mut out = io::stdout().lock();
            let _ = writeln!(out, "{line}");
            let _ = out.flush();
        }
        if let Some(file) = &self.file {
            let mut file = file.lock();
            let _ = writeln!(file, "{line}");
            // Flush per line so the log survives an abrupt SIGINT exit.
            let _ = file.flush();
        }
    }
}

/// Narrator that drops every line. Used by tests that only care about
/// protocol results.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNarrator;

impl Narrator for NullNarrator {
    fn emit(&self, _line: &str) {}
}
