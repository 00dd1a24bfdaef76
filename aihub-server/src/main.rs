//! # AI Solutions Hub server
//!
//! Loads the provider configuration from a file or the environment, builds
//! the fallback chain and serves the HTTP API until Ctrl+C or SIGTERM.

use aihub_core::config::{load_from_path, HubConfig};
use aihub_core::http::HttpClient;
use aihub_core::providers::RoutingBuilder;
use aihub_server::{app, AppState};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// AI Solutions Hub - multi-provider text generation with ordered fallback
#[derive(Parser)]
#[command(name = "aihub-server")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to a YAML or JSON configuration file (default: environment only)
    #[arg(short, long, env = "AIHUB_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Bind address (overrides configuration)
    #[arg(long)]
    host: Option<String>,

    /// Bind port (overrides configuration)
    #[arg(long)]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "AIHUB_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before clap reads env-backed arguments
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    let config = match &cli.config {
        Some(path) => load_from_path(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => HubConfig::from_env().context("Failed to load configuration from environment")?,
    };

    let http = HttpClient::from_config(&config.connection).context("Failed to create HTTP client")?;
    let router =
        RoutingBuilder::from_config(&config, &http).context("Failed to build fallback chain")?;
    info!("Fallback chain: {}", router.providers().join(" -> "));

    let shutdown = CancellationToken::new();
    let state = AppState::new(Arc::new(router)).with_shutdown(shutdown.clone());

    let host = cli.host.unwrap_or(config.server.host);
    let port = cli.port.unwrap_or(config.server.port);
    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("AI Solutions Hub listening on {}", addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            shutdown.cancel();
        })
        .await
        .context("HTTP server failed")?;

    info!("Server shut down");

    Ok(())
}

fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}
