//! Telnet Chat Server - Entry Point
//!
//! Loads configuration, starts the ChatServer actor, and accepts connections.

use std::env;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use telnet_chat::config::CONFIG_ENV;
use telnet_chat::{handle_connection, ChatServer, Config};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Bind address from command line, optional TOML file from the environment
    let config = Config::load(env::var(CONFIG_ENV).ok(), env::args().nth(1))?;

    // Initialize logging with environment filter
    // Use RUST_LOG env var to control log level
    // e.g., RUST_LOG=debug or RUST_LOG=telnet_chat=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .init();

    // Start TCP listener
    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!("Telnet Chat Server listening on {}", config.bind_addr);

    // Start the registry actor
    let (registry, _actor) = ChatServer::spawn(config.command_buffer);
    let config = Arc::new(config);

    // Connection accept loop
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                info!("New connection from {}", addr);
                let registry = registry.clone();
                let config = Arc::clone(&config);

                // Spawn handler task for each connection
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, registry, config).await {
                        error!("Connection handler error: {}", e);
                    }
                });
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}
