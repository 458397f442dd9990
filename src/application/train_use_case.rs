// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates a full training run in order:
//
//   Step 1: Read corpus records       (Layer 4 - data)
//   Step 2: Clean the records         (Layer 4 - data)
//   Step 3: Load / build vocabulary   (Layer 6 - infra)
//   Step 4: Encode and concatenate    (Layer 3 - domain)
//   Step 5: Build the windowed batcher(Layer 4 - data)
//   Step 6: Build model, load prior   (Layer 5 / 6)
//   Step 7: Run the training loop     (Layer 5 - ml)
//   Step 8: Swap into inference copy  (Layer 5 - ml)
//   Step 9: Draw a sample             (Layer 5 - ml)
//
// Reference: Rust Book §13 (Iterators and Closures)
//            Burn Book §5 (Training)

use anyhow::{bail, Context, Result};
use burn::{module::AutodiffModule, tensor::backend::Backend};
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::data::{
    loader::CorpusLoader,
    preprocessor::Preprocessor,
    windowed::{BatcherConfig, WindowedBatcher},
};
use crate::domain::{
    encoding::OneHotEncoding,
    sequence::{CharacterSequence, NumberSequence},
    traits::RecordSource,
};
use crate::infra::{
    checkpoint::CheckpointManager,
    encoding_store::EncodingStore,
    loss_log::LossLogger,
};
use crate::ml::{
    model::{CharRnn, CharRnnConfig},
    sampler::Sampler,
    trainer::{train_generator, TrainerSettings},
    TrainBackend,
};

// ─── Training Configuration ──────────────────────────────────────────────────
// Everything a run needs. Serialisable so it can be logged or
// stored next to the checkpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub reviews:           String,
    pub log:               String,
    pub encoding:          String,
    pub build_encoding:    bool,
    pub init_checkpoint:   String,
    pub fresh:             bool,
    pub output_checkpoint: String,
    pub iterations:        usize,
    pub step_size:         f64,
    pub batch_size:        usize,
    pub sequence_length:   usize,
    pub hidden_size:       usize,
    pub num_layers:        usize,
    pub checkpoint_every:  usize,
    pub sample_length:     usize,
    pub temperature:       f64,
    pub seed:              u64,
    pub stateful:          bool,
    pub cache_batches:     bool,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            reviews:           String::new(),
            log:               "loss/generator_loss_current.txt".to_string(),
            encoding:          "data/charnet-encoding.json".to_string(),
            build_encoding:    false,
            init_checkpoint:   "models/generative/generative-model-0.0.renamed".to_string(),
            fresh:             false,
            output_checkpoint: "models/generative/generative-model-current".to_string(),
            iterations:        1000,
            step_size:         1e-3,
            batch_size:        100,
            sequence_length:   200,
            hidden_size:       1024,
            num_layers:        2,
            checkpoint_every:  0,
            sample_length:     200,
            temperature:       1.0,
            seed:              1337,
            stateful:          true,
            cache_batches:     false,
        }
    }
}

impl TrainConfig {
    pub fn batcher(&self) -> BatcherConfig {
        BatcherConfig {
            batch_size:      self.batch_size,
            sequence_length: self.sequence_length,
            cache_batches:   self.cache_batches,
        }
    }

    pub fn trainer(&self) -> TrainerSettings {
        TrainerSettings {
            iterations:       self.iterations,
            step_size:        self.step_size,
            checkpoint_every: self.checkpoint_every,
            stateful:         self.stateful,
        }
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Run the pipeline end to end on the default GPU backend.
    /// Returns the generated sample (empty when sample_length is 0).
    pub fn execute(&self) -> Result<String> {
        let device = burn::backend::wgpu::WgpuDevice::default();
        tracing::info!("Using WGPU device: {:?}", device);
        self.execute_on::<TrainBackend>(device)
    }

    /// Run the pipeline on any autodiff backend.
    pub fn execute_on<B>(&self, device: B::Device) -> Result<String>
    where
        B: burn::tensor::backend::AutodiffBackend,
    {
        let cfg = &self.config;
        B::seed(cfg.seed);

        // ── Step 1-2: Read and clean the corpus ──────────────────────────────
        tracing::debug!("Reading corpus '{}'", cfg.reviews);
        let raw     = CorpusLoader::new(&cfg.reviews).load_records()?;
        let records = Preprocessor::new().clean_all(&raw);
        tracing::info!("Read {} records", records.len());

        // ── Step 3: Vocabulary ───────────────────────────────────────────────
        let encoding = EncodingStore::new(&cfg.encoding).load_or_build(&records, cfg.build_encoding)?;

        // ── Step 4: Encode every record, then join them ──────────────────────
        tracing::debug!("Converting to indices");
        let sequence = encode_corpus(&records, &encoding)?;
        tracing::info!("Corpus is {} characters long", sequence.len());

        // ── Step 5: Batcher ──────────────────────────────────────────────────
        let mut batcher = WindowedBatcher::new(
            std::slice::from_ref(&sequence),
            vec![Box::new(encoding.clone())],
            &cfg.batcher(),
        )
        .context("Cannot batch the corpus")?;

        // ── Step 6: Model, warm-started from the prior checkpoint ────────────
        let model_cfg = CharRnnConfig::new(encoding.len(), cfg.hidden_size, cfg.num_layers);
        let model: CharRnn<B> = model_cfg.init(&device);

        let model = if cfg.fresh {
            tracing::info!("Starting from fresh weights");
            model
        } else {
            let prior = CheckpointManager::new(&cfg.init_checkpoint);
            if !prior.exists() {
                bail!(
                    "Initial checkpoint '{}' does not exist (pass --fresh to start from new weights)",
                    prior.weights_path().display()
                );
            }
            tracing::debug!("Loading prior model");
            prior.load_model(model, &model_cfg, &device)?
        };

        // ── Step 7: Train ────────────────────────────────────────────────────
        let mut loss_log = LossLogger::create(&cfg.log)?;
        let output       = CheckpointManager::new(&cfg.output_checkpoint);
        let outcome = train_generator(
            model,
            &model_cfg,
            &mut batcher,
            &cfg.trainer(),
            &mut loss_log,
            &output,
            &device,
        )?;

        // ── Step 8: Hot-swap into the single-example inference copy ─────────
        let inference = outcome.model.valid();

        // ── Step 9: Sample ───────────────────────────────────────────────────
        if cfg.sample_length == 0 {
            return Ok(String::new());
        }
        let mut rng = StdRng::seed_from_u64(cfg.seed);
        sample_text::<B::InnerBackend>(&inference, device, &encoding, cfg, &mut rng)
    }
}

/// Encode each record and concatenate the results, naming the
/// record that holds an unknown character.
pub fn encode_corpus(records: &[String], encoding: &OneHotEncoding) -> Result<NumberSequence> {
    let parts = records
        .iter()
        .enumerate()
        .map(|(i, r)| {
            CharacterSequence::from_string(r)
                .encode(encoding)
                .with_context(|| format!("Cannot encode record {}", i + 1))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(NumberSequence::concat(&parts)?)
}

fn sample_text<B: Backend>(
    model:    &CharRnn<B>,
    device:   B::Device,
    encoding: &OneHotEncoding,
    cfg:      &TrainConfig,
    rng:      &mut StdRng,
) -> Result<String> {
    Sampler::new(model, device)
        .with_temperature(cfg.temperature)
        .sample(encoding, cfg.sample_length, rng)
}
