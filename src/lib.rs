//! Telnet Chat Server Library
//!
//! A line-oriented chat server: clients connect over TCP, pick a unique
//! display name, then exchange broadcast and private messages.
//!
//! # Features
//! - Unique display names, released on quit or disconnect
//! - `list` of connected names in login order
//! - `broadcast <message>` to everyone else
//! - `@<name> <message>` private messages
//! - Per-peer send failures never disturb other clients
//!
//! # Architecture
//! Uses the Actor pattern with `mpsc` channels:
//! - `ChatServer` is the central actor owning the `ClientRegistry`
//! - Each connection runs a `Session` state machine in its own task
//! - Sessions reach the registry only through a `RegistryHandle`, so
//!   name checks and registration are serialized without locks
//!
//! # Example
//! ```ignore
//! use std::sync::Arc;
//! use tokio::net::TcpListener;
//! use telnet_chat::{handle_connection, ChatServer, Config};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Arc::new(Config::default());
//!     let listener = TcpListener::bind(&config.bind_addr).await.unwrap();
//!     let (registry, _actor) = ChatServer::spawn(config.command_buffer);
//!
//!     while let Ok((stream, _)) = listener.accept().await {
//!         tokio::spawn(handle_connection(stream, registry.clone(), config.clone()));
//!     }
//! }
//! ```

pub mod client;
pub mod codec;
pub mod command;
pub mod config;
pub mod error;
pub mod handler;
pub mod message;
pub mod registry;
pub mod server;
pub mod session;
pub mod types;

// Re-export main types for convenience
pub use client::{Client, Outbound};
pub use codec::TelnetLineCodec;
pub use command::Command;
pub use config::Config;
pub use error::{AppError, ConfigError, SendError};
pub use handler::{handle_connection, serve_stream};
pub use message::ServerMessage;
pub use registry::ClientRegistry;
pub use server::{ChatServer, RegistryHandle, ServerCommand};
pub use session::{Flow, Session};
pub use types::{ClientId, Phase};
