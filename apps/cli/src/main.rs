//! Prelytics CLI: pre-sales intelligence reports for a target organization.
//!
//! Gathers company, financial, operational, competitor and product signals,
//! lays them out as one sectioned report and parses it into structured JSON.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
