mod commands;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "datavol",
    about = "Rebuild Docker data volumes whose test data archives changed"
)]
#[command(version)]
struct Cli {
    /// Read environment variables from this file instead of ./.env
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild and push stale data volumes, then write the volume list (default)
    Run,
    /// Show which data volumes would be rebuilt without touching Docker
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match &cli.env_file {
        Some(path) => {
            dotenvy::from_path(path)
                .with_context(|| format!("failed to load env file {}", path.display()))?;
        }
        None => {
            // A missing ./.env is normal in CI.
            let _ = dotenvy::dotenv();
        }
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => commands::run().await?,
        Commands::Check => commands::check().await?,
    }

    Ok(())
}
