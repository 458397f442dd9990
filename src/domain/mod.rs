// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Pure Rust types describing what the trainer works on:
// characters, their vocabulary, and numeric sequences.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs, enums, and traits
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// Typed failures of the domain and data layers
pub mod error;

// Character vocabulary and dense pass-through encodings
pub mod encoding;

// CharacterSequence and NumberSequence
pub mod sequence;

// Core abstractions (traits) that other layers implement
pub mod traits;
