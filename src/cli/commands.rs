// ============================================================
// Layer 1 — CLI Arguments
// ============================================================
// The corpus path and every configurable flag of a training
// run.
//
// clap's derive macros automatically generate:
//   - help text (--help)
//   - error messages for missing args
//   - type conversion (string → usize, f64, etc.)
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::Args;
use crate::application::train_use_case::TrainConfig;

/// All arguments for a training run.
/// Each field becomes a --flag on the command line.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Review corpus: one record per line, each with a 3-byte prefix
    pub reviews: String,

    /// File that receives one "Loss[i]: x" line per iteration
    #[arg(long, default_value = "loss/generator_loss_current.txt")]
    pub log: String,

    /// Character vocabulary (JSON)
    #[arg(long, default_value = "data/charnet-encoding.json")]
    pub encoding: String,

    /// Build the vocabulary from the corpus if the encoding file is missing
    #[arg(long)]
    pub build_encoding: bool,

    /// Checkpoint to warm-start from (must exist unless --fresh is given)
    #[arg(long, default_value = "models/generative/generative-model-0.0.renamed")]
    pub init_checkpoint: String,

    /// Start from newly initialised weights instead of the initial checkpoint
    #[arg(long)]
    pub fresh: bool,

    /// Where the trained parameters are written
    #[arg(long, default_value = "models/generative/generative-model-current")]
    pub output_checkpoint: String,

    /// Number of RMSProp steps
    #[arg(long, default_value_t = 1000)]
    pub iterations: usize,

    /// RMSProp learning rate
    #[arg(long, default_value_t = 1e-3)]
    pub step_size: f64,

    /// Parallel windows per batch
    #[arg(long, default_value_t = 100)]
    pub batch_size: usize,

    /// Time steps per window
    #[arg(long, default_value_t = 200)]
    pub sequence_length: usize,

    /// Width of each LSTM layer
    #[arg(long, default_value_t = 1024)]
    pub hidden_size: usize,

    /// Number of stacked LSTM layers
    #[arg(long, default_value_t = 2)]
    pub num_layers: usize,

    /// Write an extra snapshot every N iterations (0 = only at the end)
    #[arg(long, default_value_t = 0)]
    pub checkpoint_every: usize,

    /// Characters to generate after training (0 = skip sampling)
    #[arg(long, default_value_t = 200)]
    pub sample_length: usize,

    /// Softmax temperature used when sampling
    #[arg(long, default_value_t = 1.0)]
    pub temperature: f64,

    /// Seed for weight initialisation and sampling
    #[arg(long, default_value_t = 1337)]
    pub seed: u64,

    /// Reset the LSTM state for every batch instead of carrying it over
    #[arg(long)]
    pub stateless: bool,

    /// Keep assembled batches in memory instead of rebuilding them each pass
    #[arg(long)]
    pub cache_batches: bool,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            reviews:           a.reviews,
            log:               a.log,
            encoding:          a.encoding,
            build_encoding:    a.build_encoding,
            init_checkpoint:   a.init_checkpoint,
            fresh:             a.fresh,
            output_checkpoint: a.output_checkpoint,
            iterations:        a.iterations,
            step_size:         a.step_size,
            batch_size:        a.batch_size,
            sequence_length:   a.sequence_length,
            hidden_size:       a.hidden_size,
            num_layers:        a.num_layers,
            checkpoint_every:  a.checkpoint_every,
            sample_length:     a.sample_length,
            temperature:       a.temperature,
            seed:              a.seed,
            stateful:          !a.stateless,
            cache_batches:     a.cache_batches,
        }
    }
}
