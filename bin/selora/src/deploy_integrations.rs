//! deploy-integrations deploys a new router generation and swaps it in on the
//! swap executor recorded by deploy-core.

use anyhow::Result;
use clap::Parser;

use selora::{cli::Cli, config::AppConfig, summary};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;

    // Initialize the logger.
    tracing_subscriber::fmt()
        .with_max_level(config.level()?)
        .init();

    let deployer = config.deployer()?;
    let outcome = deployer.deploy_integrations(&cli.network).await?;

    println!("{}", summary::render(&outcome));

    Ok(())
}
