// ============================================================
// Layer 3 — Domain Errors
// ============================================================
// Typed failures raised by the pure domain and data code.
// The application layer wraps these in anyhow::Error with
// extra context (which record, which file) before they
// reach the user.
//
// Reference: Rust Book §9 (Error Handling)
//            thiserror crate documentation

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CharnetError {
    /// A character in the corpus is not part of the vocabulary
    #[error("unknown character {character:?} at position {position}")]
    UnknownCharacter { character: char, position: usize },

    /// A numeric value cannot be used as a vocabulary index
    #[error("index {index} is outside the vocabulary of size {vocab_size}")]
    IndexOutOfRange { index: i64, vocab_size: usize },

    /// The corpus is too short to fill a single batch of windows
    #[error("corpus has to be longer than {required} characters (got {available})")]
    InsufficientData { required: usize, available: usize },

    /// Parallel sequences or their encodings do not line up
    #[error("misaligned sequences: {0}")]
    Misaligned(String),

    /// Batch size or sequence length is unusable
    #[error("invalid batch shape: {0}")]
    InvalidShape(String),

    /// Every probability was zero, negative or not finite
    #[error("cannot sample from an empty or degenerate distribution")]
    EmptyDistribution,
}
