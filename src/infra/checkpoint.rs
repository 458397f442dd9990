// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores CharRnn parameters using Burn's
// CompactRecorder.
//
// One manager owns one checkpoint *base path*. For a base of
// models/generative/generative-model-current it writes:
//
//   generative-model-current.mpk          ← final weights
//   generative-model-current.json         ← CharRnnConfig
//   generative-model-current-iter500.mpk
//   generative-model-current-iter500.json ← periodic snapshots
//
// The config is written next to every weight file so that a
// load can refuse a checkpoint of a different architecture
// with a readable error instead of a recorder failure.
//
// Extensions are appended to the base, never substituted, so
// dotted bases such as generative-model-0.0.renamed keep their
// full name. The recorder is handed the complete weights path;
// its own set_extension call then leaves it unchanged.
//
// Reference: Burn Book §5 (Records and Checkpointing)
//            Rust Book §9 (Error Handling)

use anyhow::{bail, Context, Result};
use std::{
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
};
use burn::{
    prelude::*,
    record::{CompactRecorder, FileRecorder, Recorder},
};

use crate::ml::model::{CharRnn, CharRnnConfig};
use crate::ml::InferBackend;

const CONFIG_EXTENSION: &str = "json";

/// Extension CompactRecorder gives its files. It does not depend
/// on the backend, so the inference backend stands in for all.
fn weights_extension() -> &'static str {
    <CompactRecorder as FileRecorder<InferBackend>>::file_extension()
}

/// `base` + "." + `extension`, keeping any dots already in `base`
fn append_extension(base: &Path, extension: &str) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}

pub struct CheckpointManager {
    base: PathBuf,
}

impl CheckpointManager {
    /// Create a manager for `base`, creating its parent directory.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        let base = base.into();
        if let Some(parent) = base.parent() {
            // create_dir_all creates parent directories too, like `mkdir -p`
            fs::create_dir_all(parent).ok();
        }
        Self { base }
    }

    /// Path of the final weight file
    pub fn weights_path(&self) -> PathBuf {
        append_extension(&self.base, weights_extension())
    }

    /// True when final weights have been written at this base
    pub fn exists(&self) -> bool {
        self.weights_path().exists()
    }

    /// Save the final parameters at the base path.
    pub fn save_model<B: Backend>(&self, model: &CharRnn<B>, cfg: &CharRnnConfig) -> Result<PathBuf> {
        save_at(&self.base, model, cfg)
    }

    /// Save an intermediate snapshot tagged with the iteration count.
    pub fn save_snapshot<B: Backend>(
        &self,
        model:     &CharRnn<B>,
        cfg:       &CharRnnConfig,
        iteration: usize,
    ) -> Result<PathBuf> {
        save_at(&self.snapshot_base(iteration), model, cfg)
    }

    fn snapshot_base(&self, iteration: usize) -> PathBuf {
        let stem = self
            .base
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.base.with_file_name(format!("{stem}-iter{iteration}"))
    }

    /// Read the architecture saved next to the final weights.
    pub fn load_config(&self) -> Result<CharRnnConfig> {
        let path = append_extension(&self.base, CONFIG_EXTENSION);
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read model config '{}'", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Malformed model config '{}'", path.display()))
    }

    /// Load the final parameters into `model`.
    ///
    /// `expected` is the architecture `model` was built with; the saved
    /// config must match it.
    pub fn load_model<B: Backend>(
        &self,
        model:    CharRnn<B>,
        expected: &CharRnnConfig,
        device:   &B::Device,
    ) -> Result<CharRnn<B>> {
        let saved = self.load_config()?;
        if !saved.matches(expected) {
            bail!(
                "Checkpoint '{}' was trained with vocab={} hidden={} layers={}, \
                 but the model is vocab={} hidden={} layers={}",
                self.base.display(),
                saved.vocab_size, saved.hidden_size, saved.num_layers,
                expected.vocab_size, expected.hidden_size, expected.num_layers,
            );
        }

        tracing::info!("Loading parameters from '{}'", self.weights_path().display());

        let record = CompactRecorder::new()
            .load(self.weights_path(), device)
            .with_context(|| {
                format!("Cannot load checkpoint '{}'", self.weights_path().display())
            })?;

        // load_record() returns a new model with the loaded weights
        Ok(model.load_record(record))
    }
}

fn save_at<B: Backend>(base: &Path, model: &CharRnn<B>, cfg: &CharRnnConfig) -> Result<PathBuf> {
    let weights = append_extension(base, weights_extension());
    CompactRecorder::new()
        .record(model.clone().into_record(), weights.clone())
        .with_context(|| format!("Failed to save checkpoint to '{}'", weights.display()))?;

    let cfg_path = append_extension(base, CONFIG_EXTENSION);
    fs::write(&cfg_path, serde_json::to_string_pretty(cfg)?)
        .with_context(|| format!("Cannot write model config '{}'", cfg_path.display()))?;

    tracing::debug!("Saved checkpoint '{}'", weights.display());
    Ok(weights)
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn outputs(model: &CharRnn<TestBackend>, device: &<TestBackend as Backend>::Device) -> Vec<f32> {
        let x = Tensor::<TestBackend, 3>::ones([2, 1, 4], device);
        model.forward(x, None).0.into_data().to_vec().unwrap()
    }

    #[test]
    fn test_save_then_load_restores_parameters() {
        let dir    = tempfile::tempdir().unwrap();
        let device = Default::default();
        let cfg    = CharRnnConfig::new(4, 6, 2);

        let trained: CharRnn<TestBackend> = cfg.init(&device);
        let ckpt = CheckpointManager::new(dir.path().join("nested").join("model"));
        let path = ckpt.save_model(&trained, &cfg).unwrap();
        assert!(path.exists());
        assert!(ckpt.exists());

        let fresh: CharRnn<TestBackend> = cfg.init(&device);
        let loaded = ckpt.load_model(fresh, &cfg, &device).unwrap();

        // CompactRecorder stores half precision
        for (a, b) in outputs(&trained, &device).iter().zip(outputs(&loaded, &device)) {
            assert!((a - b).abs() < 1e-2, "{a} vs {b}");
        }
    }

    #[test]
    fn test_architecture_mismatch_is_rejected() {
        let dir    = tempfile::tempdir().unwrap();
        let device = Default::default();
        let cfg    = CharRnnConfig::new(4, 6, 2);

        let model: CharRnn<TestBackend> = cfg.init(&device);
        let ckpt = CheckpointManager::new(dir.path().join("model"));
        ckpt.save_model(&model, &cfg).unwrap();

        let other = CharRnnConfig::new(4, 6, 1);
        let fresh: CharRnn<TestBackend> = other.init(&device);
        let err = ckpt.load_model(fresh, &other, &device).unwrap_err();
        assert!(err.to_string().contains("layers=2"));
    }

    #[test]
    fn test_snapshots_are_named_by_iteration() {
        let dir    = tempfile::tempdir().unwrap();
        let device = Default::default();
        let cfg    = CharRnnConfig::new(3, 4, 1);

        let model: CharRnn<TestBackend> = cfg.init(&device);
        let ckpt = CheckpointManager::new(dir.path().join("gen"));
        let path = ckpt.save_snapshot(&model, &cfg, 250).unwrap();

        assert_eq!(path, dir.path().join("gen-iter250.mpk"));
        assert!(path.exists());
        assert!(dir.path().join("gen-iter250.json").exists());
        assert!(!ckpt.exists());
    }

    #[test]
    fn test_dotted_base_keeps_snapshots_apart() {
        let dir    = tempfile::tempdir().unwrap();
        let device = Default::default();
        let cfg    = CharRnnConfig::new(3, 4, 1);

        let model: CharRnn<TestBackend> = cfg.init(&device);
        let ckpt = CheckpointManager::new(dir.path().join("generative-model-0.0.renamed"));
        let snapshot = ckpt.save_snapshot(&model, &cfg, 500).unwrap();
        let last     = ckpt.save_model(&model, &cfg).unwrap();

        assert_ne!(snapshot, last);
        assert_eq!(last, dir.path().join("generative-model-0.0.renamed.mpk"));
        assert_eq!(snapshot, dir.path().join("generative-model-0.0.renamed-iter500.mpk"));
        assert!(snapshot.exists());
        assert!(last.exists());
        assert!(dir.path().join("generative-model-0.0.renamed.json").exists());

        let fresh: CharRnn<TestBackend> = cfg.init(&device);
        assert!(ckpt.load_model(fresh, &cfg, &device).is_ok());
    }

    #[test]
    fn test_missing_checkpoint_is_an_error() {
        let dir    = tempfile::tempdir().unwrap();
        let device = Default::default();
        let cfg    = CharRnnConfig::new(3, 4, 1);

        let model: CharRnn<TestBackend> = cfg.init(&device);
        let ckpt = CheckpointManager::new(dir.path().join("absent"));
        assert!(!ckpt.exists());
        assert!(ckpt.load_model(model, &cfg, &device).is_err());
    }
}
