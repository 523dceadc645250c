//! Shell Roulette Server
//!
//! Hosts one shared table over WebSocket.

use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use shell_roulette::{
    MAX_PLAYERS, VERSION,
    network::{GameServer, ServerConfig},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = ServerConfig::from_env();

    info!("Shell Roulette Server v{}", VERSION);
    info!("Seats: {}", MAX_PLAYERS);
    info!("Resolve delay: {:?}", config.resolve_delay);
    if config.reveal_shells {
        info!("Deck contents are revealed in snapshots");
    }
    if config.allow_debug_commands {
        info!("Debug commands enabled");
    }

    let server = Arc::new(GameServer::new(config));

    let signal_server = server.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal_server.shutdown();
        }
    });

    server.run().await?;

    // Give connection tasks a moment to send the shutdown notice
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    info!("Server stopped");
    Ok(())
}
