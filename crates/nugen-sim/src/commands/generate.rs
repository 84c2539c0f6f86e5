use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Args;
use tracing::info;

use nugen_evgen::{
    generate_batch, write_events_jsonl, AlgorithmCatalogue, RunConfig, RunSummary,
};

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// YAML run configuration.
    #[arg(long)]
    pub config: PathBuf,
    /// Output directory for the summary, events and a copy of the configuration.
    #[arg(long)]
    pub out: PathBuf,
    /// Override the number of events.
    #[arg(long)]
    pub events: Option<u64>,
    /// Override the master seed.
    #[arg(long)]
    pub seed: Option<u64>,
    /// Override the number of worker threads.
    #[arg(long)]
    pub workers: Option<usize>,
}

/// Applies command line overrides on top of the file configuration.
pub fn resolve_config(args: &GenerateArgs) -> Result<RunConfig, Box<dyn Error>> {
    let mut config = RunConfig::load(&args.config)?;
    if let Some(events) = args.events {
        config.events = events;
    }
    if let Some(seed) = args.seed {
        config.seed.master_seed = seed;
        config.seed.label = None;
    }
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    config.validate()?;
    Ok(config)
}

pub fn run(args: &GenerateArgs) -> Result<RunSummary, Box<dyn Error>> {
    let config = resolve_config(args)?;
    fs::create_dir_all(&args.out)?;

    let output = generate_batch(&config, &AlgorithmCatalogue::builtin())?;
    let summary = RunSummary::from_batch(&config, &output)?;
    summary.write(&args.out.join(&config.output.summary_file))?;
    if config.output.write_events {
        write_events_jsonl(&args.out.join(&config.output.events_file), &output.events)?;
    }
    fs::copy(&args.config, args.out.join("config.yaml"))?;

    info!(
        events = summary.events_generated,
        attempts = summary.stats.attempts,
        out = %args.out.display(),
        "generation finished"
    );
    Ok(summary)
}
