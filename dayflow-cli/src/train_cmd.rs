use anyhow::{bail, Context, Result};
use dayflow_core::{FileModelStore, LearnedAdjustment, TrainOutcome, MIN_TRAINING_SAMPLES};
use std::path::PathBuf;

use crate::config::Config;
use crate::state::load_input;

pub fn run(cfg: &Config, input: Option<PathBuf>) -> Result<()> {
    if !cfg.model.enabled {
        bail!("The focus model is disabled ([model] enabled = false in config.toml)");
    }
    let (_, snapshot) = load_input(input)?;
    let model_path = cfg.model_path()?;

    let mut learned = LearnedAdjustment::open(FileModelStore::new(&model_path));
    let outcome = learned
        .train(&snapshot.tasks, &snapshot.executions, &snapshot.energy_profile())
        .with_context(|| format!("saving focus model to {}", model_path.display()))?;

    match outcome {
        TrainOutcome::Trained { samples } => {
            println!("Trained focus model on {samples} sessions -> {}", model_path.display());
        }
        TrainOutcome::Skipped { usable } => {
            println!(
                "Not enough history to train ({} sessions, {usable} with a focus rating; need {MIN_TRAINING_SAMPLES}).",
                snapshot.executions.len()
            );
            if learned.snapshot().is_some() {
                println!("Keeping the previously trained model.");
            }
        }
    }
    Ok(())
}
