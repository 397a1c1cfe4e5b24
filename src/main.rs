use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use waveplot::{ServerConfig, server};

/// Real-time waveform synthesis server.
#[derive(Parser, Debug)]
#[command(name = "waveplot", version, about)]
struct Cli {
    /// TOML config file (defaults to waveplot.toml in the user config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "HOST")]
    host: Option<String>,

    /// Port to bind
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,
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
    let config = ServerConfig::load(cli.config.as_deref())
        .and_then(|c| c.with_overrides(cli.host, cli.port))
        .context("failed to resolve configuration")?;

    tracing::info!(
        "waveplot {} rendering {} samples per update",
        waveplot::VERSION,
        config.sampling.sample_count()
    );

    server::serve(&config, shutdown_signal())
        .await
        .context("server error")?;
    tracing::info!("Shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}
