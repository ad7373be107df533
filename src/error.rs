//! Error types for the chat server
//!
//! Defines connection-level errors, message send errors and
//! configuration errors. Uses thiserror for ergonomic error definitions.
//!
//! Protocol misuse (bad private message syntax, taken names, unknown
//! recipients) is never an error here: it is answered with a response line.

use thiserror::Error;
use tokio_util::codec::LinesCodecError;

/// Connection-level errors
///
/// All of these are fatal for the one connection they occur on and
/// never for the server as a whole.
#[derive(Debug, Error)]
pub enum AppError {
    /// Line framing error (line too long, invalid UTF-8, socket failure)
    #[error("Codec error: {0}")]
    Codec(#[from] LinesCodecError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The registry actor is gone (server shutting down)
    #[error("Registry actor closed")]
    ServerClosed,

    /// Own outbound channel closed (writer task ended)
    #[error("Send error: {0}")]
    Send(#[from] SendError),
}

/// Message send errors
///
/// Occurs when attempting to send lines through closed channels.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SendError {
    /// The receiving end of the channel has been closed
    #[error("Channel closed")]
    ChannelClosed,
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid bind address '{0}'")]
    InvalidAddress(String),
}
