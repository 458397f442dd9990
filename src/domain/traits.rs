// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The seams the rest of the crate is written against:
//
//   RecordSource — anything that yields raw text records
//   Encoding     — anything that turns a numeric row back
//                  into a dense network input vector
//
// The WindowedBatcher only sees `dyn Encoding`, so a
// character vocabulary and a pass-through feature block
// can be batched side by side.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)
//            Rust Book §17 (Trait Objects)

use anyhow::Result;

use crate::domain::error::CharnetError;

// ─── RecordSource ─────────────────────────────────────────────────────────────
/// Any component that can load raw text records.
///
/// Implementations:
///   - CorpusLoader → newline-delimited file with a 3-byte record prefix
pub trait RecordSource {
    /// Load every record, in file order.
    fn load_records(&self) -> Result<Vec<String>>;
}

// ─── Encoding ─────────────────────────────────────────────────────────────────
/// Converts one row of a NumberSequence into the dense vector
/// the network consumes.
///
/// Implementations:
///   - OneHotEncoding  → one index in, one-hot vector out
///   - IdentityEncoding → dense features passed through
pub trait Encoding {
    /// Width of the dense vector produced by `convert_representation`
    fn vocab_size(&self) -> usize;

    /// Width of the numeric rows this encoding accepts
    fn input_width(&self) -> usize;

    /// Expand a numeric row (of `input_width()` values) into a
    /// vector of `vocab_size()` values.
    fn convert_representation(&self, row: &[f32]) -> Result<Vec<f32>, CharnetError>;
}
