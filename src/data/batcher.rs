// ============================================================
// Layer 4 — Tensor Batcher
// ============================================================
// Moves a host-side WindowBatch onto a Burn device.
//
// The WindowBatch buffers are already time-major, so this is
// a straight copy plus a shape:
//
//   inputs  Vec<f32> → Tensor [steps, batch, input_dim]
//   targets Vec<f32> → Tensor [steps, batch, target_dim]
//
// B is the Burn Backend (e.g. Wgpu, NdArray) — generic so the
// same batcher feeds the autodiff training model and the
// plain inference model.
//
// Reference: Burn Book §4 (Batcher)

use burn::{prelude::*, tensor::TensorData};

use crate::data::windowed::WindowBatch;

// ─── CharBatch ────────────────────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct CharBatch<B: Backend> {
    /// One-hot inputs — shape: [steps, batch_size, input_dim]
    pub inputs: Tensor<B, 3>,

    /// One-hot next-character targets — shape: [steps, batch_size, target_dim]
    pub targets: Tensor<B, 3>,
}

impl<B: Backend> CharBatch<B> {
    /// Target class per (step, item), flattened to [steps * batch_size]
    pub fn target_indices(&self) -> Tensor<B, 1, Int> {
        let [steps, batch_size, _] = self.targets.dims();
        self.targets.clone().argmax(2).reshape([steps * batch_size])
    }
}

// ─── CharBatcher ──────────────────────────────────────────────────────────────
/// Holds the target device so tensors are created on the correct GPU/CPU.
#[derive(Clone, Debug)]
pub struct CharBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> CharBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }

    pub fn batch(&self, window: WindowBatch) -> CharBatch<B> {
        let WindowBatch { inputs, targets, steps, batch_size, input_dim, target_dim } = window;

        let inputs = Tensor::<B, 3>::from_data(
            TensorData::new(inputs, [steps, batch_size, input_dim]),
            &self.device,
        );
        let targets = Tensor::<B, 3>::from_data(
            TensorData::new(targets, [steps, batch_size, target_dim]),
            &self.device,
        );

        CharBatch { inputs, targets }
    }
}
