//! Syntax analysis relay.
//!
//! # Architecture Overview
//!
//! ```text
//!     Browser                ┌────────────────────────────────────────────┐
//!     POST / {document}      │                 RELAY                       │
//!     ───────────────────────┼─▶ request id ─▶ trace ─▶ cors ─▶ rate limit │
//!                            │                                   │        │
//!                            │                                   ▼        │
//!                            │                           relay handler    │
//!                            │                                   │        │
//!     ◀──────────────────────┼── mirrored status + JSON ◀── upstream ─────┼──▶ analyzeSyntax?key=…
//!                            └────────────────────────────────────────────┘
//! ```
//!
//! Exactly one upstream call per relayed request, no retries, and every
//! failure answered with a JSON error body.

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use syntax_relay::config::load_config;
use syntax_relay::lifecycle::{spawn_signal_listener, Shutdown};
use syntax_relay::observability::{logging, metrics};
use syntax_relay::HttpServer;

#[derive(Parser)]
#[command(name = "syntax-relay")]
#[command(about = "Relays JSON documents to a syntax analysis API", long_about = None)]
struct Cli {
    /// Optional TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // A missing .env file is fine; the environment may already be populated
    let _ = dotenvy::dotenv();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability);
    tracing::info!("syntax-relay v{} starting", env!("CARGO_PKG_VERSION"));
    config.log_startup();

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let shutdown = Shutdown::new();
    spawn_signal_listener(shutdown.clone());

    let server = HttpServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
