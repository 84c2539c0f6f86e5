use std::error::Error;

use clap::{Parser, Subcommand};

use nugen_sim::commands::{check_config, generate, xsec};
use nugen_sim::init_tracing;

#[derive(Parser)]
#[command(name = "nugen", about = "Neutrino interaction event generator")]
struct Cli {
    /// Log at debug level regardless of RUST_LOG.
    #[arg(long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate events and write a run summary.
    Generate(generate::GenerateArgs),
    /// Print integrated cross sections for every enabled interaction.
    Xsec(xsec::XsecArgs),
    /// Build every pipeline from a configuration without generating.
    CheckConfig(check_config::CheckConfigArgs),
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Command::Generate(args) => generate::run(&args).map(|_| ()),
        Command::Xsec(args) => xsec::run(&args).map(|_| ()),
        Command::CheckConfig(args) => check_config::run(&args).map(|_| ()),
    }
}
