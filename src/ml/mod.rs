// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// Burn-specific code lives here and in the tensor batcher;
// the domain layer never sees a tensor.
//
// What's in this layer:
//
//   model.rs   — CharRnn: stacked LSTM layers over one-hot
//                characters, linear head to vocabulary
//                logits, softmax distribution, CE loss
//
//   trainer.rs — RMSProp training loop with per-iteration
//                loss logging and periodic checkpoints
//
//   sampler.rs — autoregressive character generation from a
//                single-example copy of the trained model
//
// Training runs on Autodiff<Wgpu>. After training,
// `model.valid()` yields the same parameters on plain Wgpu,
// which is the inference copy the sampler uses.
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)
//            Hochreiter & Schmidhuber (1997) LSTM

/// Stacked LSTM character model
pub mod model;

/// RMSProp training loop
pub mod trainer;

/// Character sampling from a trained model
pub mod sampler;

pub type InferBackend = burn::backend::Wgpu;
pub type TrainBackend = burn::backend::Autodiff<InferBackend>;
