use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use syntax_relay::config::load_assets_config;
use syntax_relay::lifecycle::{spawn_signal_listener, Shutdown};
use syntax_relay::observability::logging;
use syntax_relay::AssetServer;

#[derive(Parser)]
#[command(name = "static-server")]
#[command(about = "Serves the pre-built frontend", long_about = None)]
struct Cli {
    /// Optional TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory to serve.
    #[arg(short, long)]
    root: Option<String>,

    /// Port to listen on (takes precedence over PORT).
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let _ = dotenvy::dotenv();

    let mut config = load_assets_config(cli.config.as_deref())?;
    if let Some(root) = cli.root {
        config.assets.root = root;
    }
    if let Some(port) = cli.port {
        config.assets.port = port;
    }

    logging::init_logging(&config.observability);
    config.assets.log_startup();

    let listener = TcpListener::bind(config.assets.bind_address()).await?;

    let shutdown = Shutdown::new();
    spawn_signal_listener(shutdown.clone());

    AssetServer::new(&config.assets)
        .run(listener, shutdown.subscribe())
        .await?;

    Ok(())
}
