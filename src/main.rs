//! Origin relay
//!
//! A CORS-enabling fetch relay built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http::server ──▶ http::params ──▶ fetch::FetchClient ──▶ Upstream
//!                         │                                 │
//!                         │                           cache::SharedCache
//!                         ▼                                 │
//!     ◀────────────── http::response ◀── translate ◀────────┘
//!     Client Response
//!
//!     Cross-cutting: config, observability (logs + metrics), lifecycle
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use origin_relay::config::{load_config, validate_config, ConfigError, RelayConfig};
use origin_relay::fetch::FetchClient;
use origin_relay::http::HttpServer;
use origin_relay::lifecycle::{signals, Shutdown};
use origin_relay::observability::{logging, metrics};

#[derive(Parser, Debug)]
#[command(name = "origin-relay", version, about = "CORS-enabling fetch relay")]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => RelayConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
        validate_config(&config).map_err(ConfigError::Validation)?;
    }

    logging::init_logging(&config.observability);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "origin-relay starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        cache_entries = config.cache.max_entries,
        request_timeout_secs = config.timeouts.request_secs,
        user_agent = %config.upstream.user_agent(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let fetcher = Arc::new(FetchClient::from_config(&config)?);

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        signals::wait_for_signal().await;
        signal_shutdown.trigger();
    });

    HttpServer::new(config, fetcher)
        .run(listener, server_shutdown)
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
