//! Binary entry point: set up logging, parse arguments, run the command.

use clap::Parser as _;

mod cli;

fn main() -> anyhow::Result<()> {
    scour::logging::init()?;
    let cli = cli::Cli::parse();
    cli::run(cli)
}
