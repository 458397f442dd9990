// ============================================================
// Layer 4 — Record Preprocessor
// ============================================================
// Removes markup the scraper left inside review records
// before they are encoded:
//
//   1. the \x05 control byte
//   2. literal "<STR>" start markers
//
// Everything else, including newlines inside a record and
// non-ASCII characters, is kept as-is so the vocabulary sees
// the text exactly as written.
//
// Reference: Rust Book §8 (Strings in Rust)

const CONTROL_MARKER: char = '\u{05}';
const START_MARKER: &str = "<STR>";

pub struct Preprocessor;

impl Preprocessor {
    /// Create a new Preprocessor instance
    pub fn new() -> Self {
        Self
    }

    /// Clean a single record
    pub fn clean(&self, record: &str) -> String {
        record.replace(CONTROL_MARKER, "").replace(START_MARKER, "")
    }

    /// Clean every record, keeping order
    pub fn clean_all(&self, records: &[String]) -> Vec<String> {
        records.iter().map(|r| self.clean(r)).collect()
    }
}

/// Implement Default so Preprocessor can be created with Preprocessor::default()
impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}
