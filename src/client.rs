//! Client connection handle
//!
//! The cloneable output capability of one connection. The session owns
//! one copy; the registry keeps another purely for routing.

use tokio::sync::mpsc;

use crate::error::SendError;
use crate::message::ServerMessage;
use crate::types::ClientId;

/// Frame queued for a connection's writer task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// A protocol line (without terminator)
    Line(String),
    /// Flush pending lines and close the socket
    Close,
}

/// Handle to a connected client
///
/// Holds the client's unique ID and the sender half of its outbound
/// channel. Cloning is cheap; all clones feed the same writer task.
///
/// The channel is unbounded, so queueing never waits and never drops a
/// line for a client that is still connected. Only a closed writer side
/// makes a send fail.
#[derive(Debug, Clone)]
pub struct Client {
    /// Unique identifier for this connection
    pub id: ClientId,
    /// Server → Client line channel
    sender: mpsc::UnboundedSender<Outbound>,
}

impl Client {
    /// Create a new client handle with the given ID and sender channel
    pub fn new(id: ClientId, sender: mpsc::UnboundedSender<Outbound>) -> Self {
        Self { id, sender }
    }

    /// Send a line to this client
    ///
    /// Returns an error if the channel is closed (client disconnected).
    pub fn send(&self, line: impl Into<String>) -> Result<(), SendError> {
        self.sender
            .send(Outbound::Line(line.into()))
            .map_err(|_| SendError::ChannelClosed)
    }

    /// Send several lines in order
    pub fn send_all<I, S>(&self, lines: I) -> Result<(), SendError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        lines.into_iter().try_for_each(|line| self.send(line))
    }

    /// Render a server event and send its lines
    pub fn deliver(&self, msg: ServerMessage) -> Result<(), SendError> {
        self.send_all(msg.into_lines())
    }

    /// Ask the writer task to close the connection
    pub fn close(&self) -> Result<(), SendError> {
        self.sender
            .send(Outbound::Close)
            .map_err(|_| SendError::ChannelClosed)
    }

    /// Check whether the writer side has gone away
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}
