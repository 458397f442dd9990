// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// This is the entry point for all user interaction.
// It uses the `clap` crate to parse command line arguments.
// All work is delegated to Layer 2 (application).
//
//   charnet-train <reviews> [--log <path>] [flags...]
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::TrainArgs;

use crate::application::train_use_case::TrainUseCase;

/// clap reads the fields and generates the argument parsing
/// code via the Parser derive macro.
#[derive(Parser, Debug)]
#[command(
    name = "charnet-train",
    version = "0.1.0",
    about = "Train a character-level LSTM on a review corpus, then sample from it."
)]
pub struct Cli {
    #[command(flatten)]
    pub args: TrainArgs,
}

impl Cli {
    /// Hand the arguments to the training use case and print the sample.
    pub fn run(self) -> Result<()> {
        tracing::info!("Starting training on corpus: {}", self.args.reviews);

        let use_case = TrainUseCase::new(self.args.into());
        let sample   = use_case.execute()?;

        println!("Training complete. Checkpoint saved.");
        if !sample.is_empty() {
            println!("\nSample:\n{}", sample);
        }
        Ok(())
    }
}
