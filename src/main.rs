//! Session relay server.
//!
//! ```text
//!   Browser ──▶ session-relay ──▶ upstream API (/api/v1/...)
//!           ◀── status, JSON, ◀──
//!               set-cookie (per route)
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use session_relay::config::{config_path, load_config};
use session_relay::lifecycle::{shutdown_on_signal, Shutdown};
use session_relay::observability::{logging, metrics};
use session_relay::HttpServer;

#[derive(Parser)]
#[command(name = "session-relay", version)]
#[command(about = "Cookie-forwarding relay in front of the backend API", long_about = None)]
struct Cli {
    /// TOML config file (also read from RELAY_CONFIG).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config_file = config_path(cli.config.as_deref());
    let mut config = load_config(config_file.as_deref())?;
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability);
    tracing::info!("session-relay v{} starting", env!("CARGO_PKG_VERSION"));

    match &config_file {
        Some(path) => tracing::info!(path = ?path, "Loaded configuration file"),
        None => tracing::info!("No configuration file, using built-in defaults"),
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.base_url,
        upstream_timeout_secs = config.timeouts.upstream_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics endpoint");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(config)?;

    let shutdown = Shutdown::new();
    tokio::spawn(shutdown_on_signal(shutdown.clone()));

    server.run(listener, shutdown.wait()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
