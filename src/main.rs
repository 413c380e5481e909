//! Universal entry server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http server ──▶ assets ──▶ routes ──▶ adapter ──▶ portable handler
//!                     (layers)        (files /   (exact,    (context,      │
//!                                      dev)       catch-all) request)      │
//!     Client Response                                                      │
//!     ◀────────────── http server ◀──────────── reply ◀── adapter ◀────────┘
//!                                               (body normalized)
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use universal_entry::app::{self, TodoStore};
use universal_entry::config::load_config;
use universal_entry::lifecycle::{forward_signals, Shutdown};
use universal_entry::observability::{logging, metrics};
use universal_entry::EntryServer;

#[derive(Debug, Parser)]
#[command(name = "universal-entry", version, about = "Universal HTTP entry server")]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    logging::init_logging(&config.observability, config.mode);

    tracing::info!(
        bind_address = %config.server.bind_address(),
        mode = %config.mode,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        metrics::init_metrics(config.observability.metrics_address.parse()?)?;
    }

    let store = Arc::new(TodoStore::new());
    let server = EntryServer::new(config.clone(), app::routes(store))?;

    let listener = TcpListener::bind(config.server.bind_address()).await?;
    let port = listener.local_addr()?.port();
    tracing::info!(
        port,
        hmr_port = config.server.hmr_port,
        mode = %config.mode,
        "Server listening on http://localhost:{}",
        port
    );

    let shutdown = Shutdown::new();
    tokio::spawn(forward_signals(shutdown.clone()));
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
