//! Entry point for the `compose-addons` command.

use clap::Parser;

use compose_addons_cli::cli::Cli;
use compose_addons_cli::{logging, run};

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    logging::init(cli.verbose)?;
    run(&cli).map_err(color_eyre::eyre::Report::from)
}
