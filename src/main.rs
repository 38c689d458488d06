mod auth;
mod cli;
mod config;
mod credentials;
mod dashboard;
mod debounce;
mod error;
mod insights;
mod output;
mod providers;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    output::init_chart();

    output::print_banner();

    let cli = Cli::parse();
    info!("Starting travis-build-times");
    cli.execute().await?;

    Ok(())
}
