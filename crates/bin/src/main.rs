//! Zappy game server binary.

use clap::Parser;
use server::{Config, Shutdown};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Parse and validate configuration before any socket is opened.
    let config = Config::parse();
    config.validate()?;

    info!("Zappy Server v{}", env!("CARGO_PKG_VERSION"));
    info!("  Port: {}", config.port);
    info!("  Map: {}x{}", config.width, config.height);
    info!("  Teams: {} (capacity {})", config.teams.join(", "), config.capacity);
    info!("  Frequency: {}", config.frequency);

    let shutdown = Shutdown::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("ctrl-c received, shutting down");
                shutdown.trigger();
            }
        });
    }

    server::run(config, shutdown).await
}
