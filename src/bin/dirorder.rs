//! dirorder CLI Binary
//!
//! Command-line interface for the directory order engine.

use anyhow::Context;
use clap::Parser;
use dirorder::logging::init_logging;
use dirorder::tooling::cli::{Cli, CliContext};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let context = CliContext::new(&cli).context("Error initializing workspace")?;
    init_logging(Some(&context.config().logging)).context("Error initializing logging")?;

    let output = context.execute(&cli.command).await?;
    println!("{}", output);
    Ok(())
}
