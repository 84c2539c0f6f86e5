use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use tracing::info;

use nugen_evgen::{AlgorithmCatalogue, EventGenerator, RunConfig};

#[derive(Args, Debug, Clone)]
pub struct CheckConfigArgs {
    /// YAML run configuration.
    #[arg(long)]
    pub config: PathBuf,
}

/// Builds every pipeline without generating events. Returns the stage
/// names per channel.
pub fn run(args: &CheckConfigArgs) -> Result<Vec<(String, Vec<String>)>, Box<dyn Error>> {
    let config = RunConfig::load(&args.config)?;
    let generator = EventGenerator::build(&config, &AlgorithmCatalogue::builtin())?;
    let mut layout = Vec::new();
    for (channel, pipeline) in generator.registry().iter() {
        let stages: Vec<String> = pipeline
            .pipeline
            .stage_names()
            .into_iter()
            .map(str::to_string)
            .collect();
        info!(channel = channel.as_str(), stages = %stages.join(" -> "), "pipeline ok");
        println!("{}: {}", channel.as_str(), stages.join(" -> "));
        layout.push((channel.as_str().to_string(), stages));
    }
    Ok(layout)
}
