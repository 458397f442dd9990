// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from the raw corpus file to device tensors.
//
// The pipeline flows in this order:
//
//   corpus file
//       │
//       ▼
//   CorpusLoader      → reads lines, drops the 3-byte prefix
//       │
//       ▼
//   Preprocessor      → strips \x05 and <STR> markup
//       │
//       ▼
//   OneHotEncoding    → characters to indices (domain layer)
//       │
//       ▼
//   WindowedBatcher   → fixed windows, one-hot (X, y) pairs
//       │
//       ▼
//   CharBatcher       → Burn tensors on the training device
//
// Reference: Burn Book §4 (Datasets and Batchers)
//            Rust Book §13 (Iterators and Closures)

/// Reads the newline-delimited review corpus
pub mod loader;

/// Cleans markup out of raw records
pub mod preprocessor;

/// Cyclic fixed-window batching over encoded sequences
pub mod windowed;

/// Converts window batches into Burn tensors
pub mod batcher;
