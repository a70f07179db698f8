use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use opstack::cli::commands::{handle_demo, handle_index, handle_query, handle_status};
use opstack::cli::{Cli, Commands};
use opstack::models::{Config, OutputFormat};

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "opstack=debug" } else { "opstack=warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match cli.config {
        Some(ref path) => Config::load_from(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => Config::load().context("failed to load config")?,
    };
    let format = cli.format.unwrap_or(config.search.default_format);

    tokio::select! {
        result = run_command(cli.command, &config, format) => result,
        _ = shutdown_signal() => {
            eprintln!("\nReceived shutdown signal, aborting.");
            anyhow::bail!("interrupted")
        }
    }
}

async fn run_command(
    command: Option<Commands>,
    config: &Config,
    format: OutputFormat,
) -> Result<()> {
    match command.unwrap_or(Commands::Demo) {
        Commands::Demo => handle_demo(config, format).await,
        Commands::Index(args) => handle_index(args, config, format).await,
        Commands::Query(args) => handle_query(args, config, format).await,
        Commands::Status => handle_status(config, format).await,
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
