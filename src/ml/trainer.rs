// ============================================================
// Layer 5 — Training Loop
// ============================================================
// A fixed number of RMSProp steps over the cyclic batch
// stream. Each iteration:
//
//   1. pull the next window batch and move it to the device
//   2. forward + cross-entropy against the next characters
//   3. backward, RMSProp update
//   4. write "Loss[i]: x" to the log file and stdout
//
// The LSTM state is stateful by default: the final state of
// one batch seeds the next, detached so gradients stop at the
// batch boundary.
//
// Snapshots are written every `checkpoint_every` iterations
// (0 disables them); the final parameters are always saved.
//
// Reference: Burn Book §5, Tieleman & Hinton (2012) RMSProp

use anyhow::{Context, Result};
use burn::{
    optim::{GradientsParams, Optimizer, RmsPropConfig},
    prelude::*,
    tensor::backend::AutodiffBackend,
};
use serde::{Deserialize, Serialize};

use crate::data::{batcher::CharBatcher, windowed::WindowedBatcher};
use crate::infra::{checkpoint::CheckpointManager, loss_log::LossLogger};
use crate::ml::model::{detach_state, CharRnn, CharRnnConfig, RnnState};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainerSettings {
    pub iterations:       usize,
    pub step_size:        f64,
    pub checkpoint_every: usize,
    pub stateful:         bool,
}

pub struct TrainOutcome<B: AutodiffBackend> {
    pub model:  CharRnn<B>,
    pub losses: Vec<f64>,
}

pub fn train_generator<B: AutodiffBackend>(
    mut model:    CharRnn<B>,
    model_cfg:    &CharRnnConfig,
    batcher:      &mut WindowedBatcher,
    settings:     &TrainerSettings,
    loss_log:     &mut LossLogger,
    ckpt_manager: &CheckpointManager,
    device:       &B::Device,
) -> Result<TrainOutcome<B>> {
    let tensors   = CharBatcher::<B>::new(device.clone());
    let mut optim = RmsPropConfig::new().init();

    let mut state: Option<RnnState<B>> = None;
    let mut losses = Vec::with_capacity(settings.iterations);

    tracing::info!(
        "Training for {} iterations (step size {}, {} batches per pass)",
        settings.iterations,
        settings.step_size,
        batcher.num_batches()
    );

    for iteration in 0..settings.iterations {
        let window = batcher
            .next_batch()
            .with_context(|| format!("Cannot build batch for iteration {iteration}"))?;
        let batch   = tensors.batch(window);
        let targets = batch.target_indices();

        let (loss, next_state) = model.forward_loss(batch.inputs, targets, state.take());
        let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();

        // Backward pass + RMSProp update
        let grads = loss.backward();
        let grads = GradientsParams::from_grads(grads, &model);
        model = optim.step(settings.step_size, model, grads);

        if settings.stateful {
            state = Some(detach_state(next_state));
        }

        println!("{}", loss_log.log(iteration, loss_val)?);
        losses.push(loss_val);

        let done = iteration + 1;
        if settings.checkpoint_every > 0
            && done % settings.checkpoint_every == 0
            && done < settings.iterations
        {
            let path = ckpt_manager.save_snapshot(&model, model_cfg, done)?;
            tracing::info!("Snapshot after {} iterations: '{}'", done, path.display());
        }
    }

    let path = ckpt_manager.save_model(&model, model_cfg)?;
    tracing::info!("Trained parameters saved to '{}'", path.display());

    Ok(TrainOutcome { model, losses })
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{Autodiff, NdArray};
    use std::fs;

    use crate::data::windowed::BatcherConfig;
    use crate::domain::encoding::OneHotEncoding;
    use crate::domain::sequence::CharacterSequence;

    type TestBackend = Autodiff<NdArray>;

    fn corpus_batcher(enc: &OneHotEncoding) -> WindowedBatcher {
        let text = "abcabdabcabeabcabd".repeat(6);
        let seq  = CharacterSequence::from_string(&text).encode(enc).unwrap();
        let cfg  = BatcherConfig { batch_size: 2, sequence_length: 5, cache_batches: false };
        WindowedBatcher::new(&[seq], vec![Box::new(enc.clone())], &cfg).unwrap()
    }

    #[test]
    fn test_training_logs_every_iteration_and_saves() {
        let dir = tempfile::tempdir().unwrap();
        let enc = OneHotEncoding::build(["abcde"], false, false);
        let mut batcher = corpus_batcher(&enc);

        let device    = Default::default();
        let model_cfg = CharRnnConfig::new(enc.len(), 8, 2);
        let model: CharRnn<TestBackend> = model_cfg.init(&device);

        let settings = TrainerSettings {
            iterations:       4,
            step_size:        1e-2,
            checkpoint_every: 2,
            stateful:         true,
        };
        let log_path = dir.path().join("loss").join("log.txt");
        let mut log  = LossLogger::create(&log_path).unwrap();
        let ckpt     = CheckpointManager::new(dir.path().join("models").join("current"));

        let outcome = train_generator(
            model, &model_cfg, &mut batcher, &settings, &mut log, &ckpt, &device,
        )
        .unwrap();

        assert_eq!(outcome.losses.len(), 4);
        assert!(outcome.losses.iter().all(|l| l.is_finite() && *l > 0.0));

        let text = fs::read_to_string(&log_path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("Loss[0]: "));
        assert!(lines[3].starts_with("Loss[3]: "));

        assert!(ckpt.exists());
        assert!(dir.path().join("models").join("current-iter2.mpk").exists());
        // no snapshot for the final iteration, the final save covers it
        assert!(!dir.path().join("models").join("current-iter4.mpk").exists());
    }

    #[test]
    fn test_repeated_steps_reduce_loss_on_a_single_batch() {
        let dir = tempfile::tempdir().unwrap();
        let enc = OneHotEncoding::build(["abcde"], false, false);

        // one batch only, so every step sees the same data
        let seq = CharacterSequence::from_string("abcabcab").encode(&enc).unwrap();
        let cfg = BatcherConfig { batch_size: 1, sequence_length: 4, cache_batches: true };
        let mut batcher = WindowedBatcher::new(&[seq], vec![Box::new(enc.clone())], &cfg).unwrap();

        let device    = Default::default();
        let model_cfg = CharRnnConfig::new(enc.len(), 16, 1);
        let model: CharRnn<TestBackend> = model_cfg.init(&device);

        let settings = TrainerSettings {
            iterations:       40,
            step_size:        5e-3,
            checkpoint_every: 0,
            stateful:         false,
        };
        let mut log = LossLogger::create(dir.path().join("log.txt")).unwrap();
        let ckpt    = CheckpointManager::new(dir.path().join("model"));

        let outcome = train_generator(
            model, &model_cfg, &mut batcher, &settings, &mut log, &ckpt, &device,
        )
        .unwrap();

        let first = outcome.losses[0];
        let last  = *outcome.losses.last().unwrap();
        assert!(last < first, "loss did not drop: {first} -> {last}");
    }
}
