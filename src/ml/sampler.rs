// ============================================================
// Layer 5 — Sampler
// ============================================================
// Autoregressive generation from a single-example copy of the
// network:
//
//   start token ──► model ──► distribution ──► draw index
//        ▲                                          │
//        └──────────── one-hot of the draw ◄────────┘
//
// The recurrent state is carried from step to step, so every
// step feeds only the previous character. The start token is
// not part of the returned text.
//
// When sampling text, the start and stop tokens are masked out
// of every distribution, so `length` draws decode to exactly
// `length` characters.
use anyhow::{anyhow, Result};
use burn::{prelude::*, tensor::activation::softmax, tensor::TensorData};
use rand::{distributions::WeightedIndex, Rng};

use crate::domain::encoding::OneHotEncoding;
use crate::domain::error::CharnetError;
use crate::domain::sequence::NumberSequence;
use crate::ml::model::{CharRnn, RnnState};

/// Draw an index with probability proportional to `probs[i]`.
pub fn sample_index<R: Rng>(probs: &[f32], rng: &mut R) -> Result<usize, CharnetError> {
    // NaN or negative weights make the distribution meaningless
    if probs.iter().any(|p| !p.is_finite() || *p < 0.0) {
        return Err(CharnetError::EmptyDistribution);
    }
    let dist = WeightedIndex::new(probs).map_err(|_| CharnetError::EmptyDistribution)?;
    Ok(rng.sample(dist))
}

pub struct Sampler<'a, B: Backend> {
    model:       &'a CharRnn<B>,
    device:      B::Device,
    temperature: f64,
}

impl<'a, B: Backend> Sampler<'a, B> {
    pub fn new(model: &'a CharRnn<B>, device: B::Device) -> Self {
        Self { model, device, temperature: 1.0 }
    }

    /// Divide logits by `temperature` before the softmax (1.0 = unchanged)
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Draw `length` indices, feeding `start` first. Indices in
    /// `masked` get zero probability.
    pub fn sample_indices<R: Rng>(
        &self,
        start:  usize,
        length: usize,
        masked: &[usize],
        rng:    &mut R,
    ) -> Result<Vec<usize>> {
        let vocab_size = self.model.vocab_size;
        if let Some(&index) = std::iter::once(&start).chain(masked).find(|&&i| i >= vocab_size) {
            return Err(CharnetError::IndexOutOfRange { index: index as i64, vocab_size }.into());
        }
        if self.temperature.is_nan() || self.temperature <= 0.0 {
            return Err(anyhow!("temperature must be positive, got {}", self.temperature));
        }

        let mut state: Option<RnnState<B>> = None;
        let mut current = start;
        let mut drawn   = Vec::with_capacity(length);

        for _ in 0..length {
            let mut one_hot = vec![0.0f32; vocab_size];
            one_hot[current] = 1.0;
            let x = Tensor::<B, 3>::from_data(
                TensorData::new(one_hot, [1, 1, vocab_size]),
                &self.device,
            );

            let (logits, next) = self.model.forward(x, state.take());
            let mut probs: Vec<f32> = softmax(logits.div_scalar(self.temperature), 2)
                .into_data()
                .to_vec()
                .map_err(|e| anyhow!("Cannot read output distribution: {e:?}"))?;

            for &i in masked {
                probs[i] = 0.0;
            }
            current = sample_index(&probs, rng)?;
            drawn.push(current);
            state = Some(next);
        }

        Ok(drawn)
    }

    /// Generate `length` characters from the start token.
    /// Without a start token in the vocabulary, index 0 seeds the run.
    pub fn sample<R: Rng>(
        &self,
        encoding: &OneHotEncoding,
        length:   usize,
        rng:      &mut R,
    ) -> Result<String> {
        let start = encoding.start_token().unwrap_or(0);
        let special: Vec<usize> = encoding
            .start_token()
            .into_iter()
            .chain(encoding.stop_token())
            .collect();
        let drawn = self.sample_indices(start, length, &special, rng)?;
        Ok(NumberSequence::from_indices(drawn).decode(encoding)?.to_string())
    }
}
