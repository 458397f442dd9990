// ============================================================
// Layer 6 — Loss Logger
// ============================================================
// Records the training loss of every iteration.
//
// Output format, one line per iteration:
//
//   Loss[0]: 4.605170
//   Loss[1]: 4.581203
//   ...
//
// The file is truncated when the logger is created, so each
// run starts a fresh log, and flushed after every line so the
// log can be tailed while training runs.
//
// Reference: Rust Book §12 (I/O and File Handling)

use anyhow::{Context, Result};
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

/// Format one log line
pub fn format_loss(iteration: usize, loss: f64) -> String {
    format!("Loss[{iteration}]: {loss:.6}")
}

pub struct LossLogger {
    path:   PathBuf,
    writer: BufWriter<File>,
}

impl LossLogger {
    /// Create (or truncate) the log file, creating parent directories.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Cannot create log directory '{}'", parent.display()))?;
        }
        let file = File::create(&path)
            .with_context(|| format!("Cannot create loss log '{}'", path.display()))?;

        tracing::debug!("Writing loss log to '{}'", path.display());
        Ok(Self { path, writer: BufWriter::new(file) })
    }

    /// Append and flush one line; returns the line for echoing.
    pub fn log(&mut self, iteration: usize, loss: f64) -> Result<String> {
        let line = format_loss(iteration, loss);
        writeln!(self.writer, "{line}")
            .and_then(|_| self.writer.flush())
            .with_context(|| format!("Cannot write loss log '{}'", self.path.display()))?;
        Ok(line)
    }
}
