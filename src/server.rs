//! ChatServer Actor implementation
//!
//! The central actor that owns the `ClientRegistry`. Sessions never touch
//! the registry directly; they send `ServerCommand`s through a
//! `RegistryHandle`, and the actor applies them one at a time. That makes
//! the login check-then-register a single atomic step.

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::client::Client;
use crate::error::AppError;
use crate::registry::ClientRegistry;
use crate::types::ClientId;

/// Commands sent from sessions to the ChatServer actor
#[derive(Debug)]
pub enum ServerCommand {
    /// Query whether a name is held by an active session
    IsNameTaken {
        name: String,
        reply: oneshot::Sender<bool>,
    },
    /// Register `client` under `name` unless it is taken
    TryRegister {
        name: String,
        client: Client,
        reply: oneshot::Sender<bool>,
    },
    /// Release `name` if it is held by `client_id`
    Unregister {
        name: String,
        client_id: ClientId,
        reply: oneshot::Sender<bool>,
    },
    /// Snapshot of active names in registration order
    ListNames { reply: oneshot::Sender<Vec<String>> },
    /// Relay a broadcast to every active session except the sender
    Broadcast { sender: String, text: String },
    /// Relay a private message, or tell the sender the target is absent
    Private {
        sender: String,
        recipient: String,
        text: String,
    },
}

/// The main ChatServer actor
///
/// Owns the registry and processes commands from sessions in arrival order.
pub struct ChatServer {
    /// Active sessions by display name
    registry: ClientRegistry,
    /// Command receiver channel
    receiver: mpsc::Receiver<ServerCommand>,
}

impl ChatServer {
    /// Create a new ChatServer with the given command receiver
    pub fn new(receiver: mpsc::Receiver<ServerCommand>) -> Self {
        Self {
            registry: ClientRegistry::new(),
            receiver,
        }
    }

    /// Create the actor, spawn it, and return a handle to it
    pub fn spawn(buffer: usize) -> (RegistryHandle, JoinHandle<()>) {
        let (cmd_tx, cmd_rx) = mpsc::channel(buffer);
        let task = tokio::spawn(ChatServer::new(cmd_rx).run());
        (RegistryHandle::new(cmd_tx), task)
    }

    /// Run the ChatServer event loop
    ///
    /// Continuously receives and processes commands until all handles are dropped.
    pub async fn run(mut self) {
        info!("ChatServer started");

        while let Some(cmd) = self.receiver.recv().await {
            self.handle_command(cmd);
        }

        info!("ChatServer shutting down");
    }

    /// Process a single command
    ///
    /// A dropped reply receiver means the session went away mid-request;
    /// the registry change still stands.
    fn handle_command(&mut self, cmd: ServerCommand) {
        match cmd {
            ServerCommand::IsNameTaken { name, reply } => {
                let _ = reply.send(self.registry.is_name_taken(&name));
            }
            ServerCommand::TryRegister {
                name,
                client,
                reply,
            } => {
                let client_id = client.id;
                let accepted = self.registry.try_register(name.clone(), client);
                if accepted {
                    info!("Client {} registered as '{}'", client_id, name);
                } else {
                    debug!("Client {} rejected: '{}' is taken", client_id, name);
                }
                debug!("Active clients: {}", self.registry.len());
                let _ = reply.send(accepted);
            }
            ServerCommand::Unregister {
                name,
                client_id,
                reply,
            } => {
                let removed = self.registry.unregister(&name, client_id);
                if removed {
                    info!("Client {} released '{}'", client_id, name);
                    debug!("Active clients: {}", self.registry.len());
                }
                let _ = reply.send(removed);
            }
            ServerCommand::ListNames { reply } => {
                let _ = reply.send(self.registry.list_names());
            }
            ServerCommand::Broadcast { sender, text } => {
                let delivered = self.registry.broadcast(&sender, &text);
                debug!("Broadcast from '{}' reached {} peers", sender, delivered);
            }
            ServerCommand::Private {
                sender,
                recipient,
                text,
            } => {
                if !self.registry.send_private(&sender, &recipient, &text) {
                    debug!("Private message from '{}': '{}' not connected", sender, recipient);
                }
            }
        }
    }
}

/// Cloneable handle to the ChatServer actor
///
/// Each method sends one command; queries wait for the actor's reply.
/// Every method fails with `AppError::ServerClosed` once the actor is gone.
#[derive(Debug, Clone)]
pub struct RegistryHandle {
    cmd_tx: mpsc::Sender<ServerCommand>,
}

impl RegistryHandle {
    pub fn new(cmd_tx: mpsc::Sender<ServerCommand>) -> Self {
        Self { cmd_tx }
    }

    pub async fn is_name_taken(&self, name: &str) -> Result<bool, AppError> {
        let (reply, rx) = oneshot::channel();
        self.request(
            ServerCommand::IsNameTaken {
                name: name.to_string(),
                reply,
            },
            rx,
        )
        .await
    }

    /// Atomically check `name` and register `client` under it
    ///
    /// Returns false if another active session holds the name.
    pub async fn try_register(&self, name: &str, client: Client) -> Result<bool, AppError> {
        let (reply, rx) = oneshot::channel();
        self.request(
            ServerCommand::TryRegister {
                name: name.to_string(),
                client,
                reply,
            },
            rx,
        )
        .await
    }

    /// Release `name` if `client_id` holds it
    ///
    /// Completes only after the actor has applied the removal, so the name
    /// is free for new logins as soon as this returns.
    pub async fn unregister(&self, name: &str, client_id: ClientId) -> Result<bool, AppError> {
        let (reply, rx) = oneshot::channel();
        self.request(
            ServerCommand::Unregister {
                name: name.to_string(),
                client_id,
                reply,
            },
            rx,
        )
        .await
    }

    pub async fn list_names(&self) -> Result<Vec<String>, AppError> {
        let (reply, rx) = oneshot::channel();
        self.request(ServerCommand::ListNames { reply }, rx).await
    }

    pub async fn broadcast(&self, sender: &str, text: &str) -> Result<(), AppError> {
        self.notify(ServerCommand::Broadcast {
            sender: sender.to_string(),
            text: text.to_string(),
        })
        .await
    }

    pub async fn send_private(
        &self,
        sender: &str,
        recipient: &str,
        text: &str,
    ) -> Result<(), AppError> {
        self.notify(ServerCommand::Private {
            sender: sender.to_string(),
            recipient: recipient.to_string(),
            text: text.to_string(),
        })
        .await
    }

    async fn notify(&self, cmd: ServerCommand) -> Result<(), AppError> {
        self.cmd_tx
            .send(cmd)
            .await
            .map_err(|_| AppError::ServerClosed)
    }

    async fn request<T>(
        &self,
        cmd: ServerCommand,
        rx: oneshot::Receiver<T>,
    ) -> Result<T, AppError> {
        self.notify(cmd).await?;
        rx.await.map_err(|_| AppError::ServerClosed)
    }
}
