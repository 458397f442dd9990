// ============================================================
// Layer 4 — Corpus Loader
// ============================================================
// Reads the newline-delimited review corpus.
//
// File contract:
//   - surrounding whitespace of the whole file is ignored
//   - one record per line
//   - the first 3 bytes of every line are a record prefix
//     (e.g. a rating and separator) and are dropped
//
// The prefix is cut on bytes, not characters. If the cut
// lands inside a multi-byte character the broken bytes are
// replaced with U+FFFD rather than failing the whole run.
//
// Reference: Rust Book §12 (I/O and File Handling)

use anyhow::{Context, Result};
use std::{fs, path::PathBuf};

use crate::domain::traits::RecordSource;

/// Width of the per-line record prefix, in bytes
pub const RECORD_PREFIX_BYTES: usize = 3;

pub struct CorpusLoader {
    path: PathBuf,
}

impl CorpusLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RecordSource for CorpusLoader {
    fn load_records(&self) -> Result<Vec<String>> {
        let bytes = fs::read(&self.path)
            .with_context(|| format!("Cannot read corpus '{}'", self.path.display()))?;

        let records = split_records(&bytes);
        tracing::debug!(
            "Read {} records ({} bytes) from '{}'",
            records.len(),
            bytes.len(),
            self.path.display()
        );
        Ok(records)
    }
}

/// Split raw corpus bytes into records with the prefix removed.
pub fn split_records(bytes: &[u8]) -> Vec<String> {
    let body = bytes.trim_ascii();
    if body.is_empty() {
        return Vec::new();
    }
    body.split(|&b| b == b'\n')
        .map(|line| {
            let rest = line.get(RECORD_PREFIX_BYTES..).unwrap_or_default();
            String::from_utf8_lossy(rest).into_owned()
        })
        .collect()
}
