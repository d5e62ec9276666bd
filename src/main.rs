//! IncomeLens - Main Entry Point
//!
//! Trains an income classifier from a CSV dataset and serves single-row
//! predictions over HTTP.

use clap::Parser;
use incomelens::cli::{cmd_serve, cmd_train, Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "incomelens=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train {
            csv,
            target,
            positive_label,
            test_size,
            seed,
            threshold,
            artifacts,
        } => {
            cmd_train(
                &csv,
                &target,
                &positive_label,
                test_size,
                seed,
                threshold,
                &artifacts,
            )?;
        }
        Commands::Serve {
            host,
            port,
            artifacts,
        } => {
            cmd_serve(&host, port, &artifacts).await?;
        }
    }

    Ok(())
}
