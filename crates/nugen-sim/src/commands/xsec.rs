use std::error::Error;
use std::path::PathBuf;

use clap::Args;

use nugen_evgen::{AlgorithmCatalogue, ChannelXSec, EventGenerator, RunConfig};

#[derive(Args, Debug, Clone)]
pub struct XsecArgs {
    /// YAML run configuration.
    #[arg(long)]
    pub config: PathBuf,
}

/// Integrates every enabled interaction and prints the table as JSON.
pub fn run(args: &XsecArgs) -> Result<Vec<ChannelXSec>, Box<dyn Error>> {
    let config = RunConfig::load(&args.config)?;
    let generator = EventGenerator::build(&config, &AlgorithmCatalogue::builtin())?;
    let table = generator.selector().channel_xsecs();
    println!("{}", serde_json::to_string_pretty(&table)?);
    Ok(table)
}
