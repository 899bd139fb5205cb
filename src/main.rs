//! Steam profile relay.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client GET /?steamid=...
//!     ──────────────────────────▶ ┌───────────┐   ┌──────────────┐   ┌───────────┐
//!                                 │   http    │──▶│  identifier  │──▶│ transport │
//!                                 │  server   │   │  validation  │   │  builder  │
//!                                 └───────────┘   └──────────────┘   └─────┬─────┘
//!                                       ▲                                  │
//!                                       │                                  ▼
//!     JSON profile / error        ┌───────────┐   ┌──────────────┐   ┌───────────┐       ┌──────────┐
//!     ◀───────────────────────────│ response  │◀──│  normalizer  │◀──│  client   │──────▶│ upstream │
//!                                 └───────────┘   └──────────────┘   └───────────┘ proxy?│   API    │
//!                                                                                        └──────────┘
//!                 every stage ──▶ diagnostics (append-only log) + tracing
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use steam_relay::config::{loader, RelayConfig};
use steam_relay::http::HttpServer;
use steam_relay::lookup::RequestPipeline;
use steam_relay::observability::{logging, metrics, DiagnosticLogger};

#[derive(Parser)]
#[command(name = "steam-relay")]
#[command(about = "Relay for Steam profile lookups", long_about = None)]
struct Args {
    /// TOML configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => loader::load_config(path)?,
        None => loader::finalize(RelayConfig::default())?,
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
        config = loader::finalize(config)?;
    }

    logging::init_tracing(&config.observability.log_level);

    tracing::info!("steam-relay v{} starting", config.release.version);
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.endpoint,
        diagnostics_log = %config.diagnostics.log_path,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );
    if config.upstream.api_key.is_empty() {
        tracing::warn!(
            "No upstream API key configured; set upstream.api_key or {}",
            loader::API_KEY_ENV
        );
    }

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let logger = Arc::new(DiagnosticLogger::from_config(&config.diagnostics)?);
    let pipeline = Arc::new(RequestPipeline::new(&config, logger.clone())?);

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        "Listening for connections"
    );

    let server = HttpServer::new(config, pipeline, logger);
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
