pub mod handlers;

use crate::presentation::cli::Cli;
use clap::Parser;
use crs_core::error::Result;

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    handlers::handle_batch(cli.inputs, cli.exclude, cli.target_path, cli.out_dir)?;
    Ok(())
}
