// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Everything that touches the filesystem on behalf of the
// other layers:
//
//   checkpoint.rs     — CharRnn weights via Burn's
//                       CompactRecorder, plus the model config
//                       as JSON so loads can check architecture
//
//   encoding_store.rs — the character vocabulary as JSON,
//                       optionally built from the corpus
//
//   loss_log.rs       — the per-iteration "Loss[i]: x" log
//
// Reference: Rust Book §7 (Modules)
//            Rust Book §9 (Error Handling with anyhow)
//            Burn Book §5 (Checkpointing)

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Character vocabulary persistence
pub mod encoding_store;

/// Per-iteration loss log
pub mod loss_log;
