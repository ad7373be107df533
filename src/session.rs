//! Session protocol state machine
//!
//! One `Session` per connection. It owns the connection's phase and
//! display name, interprets each incoming line, answers on its own
//! `Client`, and goes through the `RegistryHandle` for anything that
//! touches other sessions.
//!
//! The session does no I/O of its own beyond queueing lines, so it can be
//! driven by the TCP handler or directly by tests.

use tracing::{debug, info};

use crate::client::Client;
use crate::command::Command;
use crate::error::AppError;
use crate::message::ServerMessage;
use crate::server::RegistryHandle;
use crate::types::{ClientId, Phase};

/// What the transport should do after a line has been handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep reading lines
    Continue,
    /// Stop reading; the session has asked for the connection to close
    Close,
}

/// Server-side state of one connected client
#[derive(Debug)]
pub struct Session {
    /// Own connection handle
    client: Client,
    /// Shared registry
    registry: RegistryHandle,
    /// Set once, when login succeeds
    display_name: Option<String>,
    phase: Phase,
    /// `quit` was processed; later lines are ignored
    closed: bool,
    /// Registry entry already released (quit or disconnect)
    released: bool,
}

impl Session {
    pub fn new(client: Client, registry: RegistryHandle) -> Self {
        Self {
            client,
            registry,
            display_name: None,
            phase: Phase::AwaitingName,
            closed: false,
            released: false,
        }
    }

    pub fn id(&self) -> ClientId {
        self.client.id
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Send the greeting
    pub async fn on_connect(&self) -> Result<(), AppError> {
        self.client.deliver(ServerMessage::Greeting)?;
        Ok(())
    }

    /// Handle one line from the client
    pub async fn on_line(&mut self, line: &str) -> Result<Flow, AppError> {
        if self.closed {
            return Ok(Flow::Close);
        }

        let line = line.trim();
        match self.phase {
            Phase::AwaitingName => self.handle_login(line).await,
            Phase::Active => self.handle_command(Command::parse(line)).await,
        }
    }

    /// Release the registry entry, if any
    ///
    /// Safe to call any number of times and in either phase; only the first
    /// call after a successful login touches the registry.
    pub async fn on_disconnect(&mut self) -> Result<(), AppError> {
        self.release().await
    }

    async fn handle_login(&mut self, name: &str) -> Result<Flow, AppError> {
        if !self.registry.try_register(name, self.client.clone()).await? {
            debug!("Client {} tried taken name '{}'", self.id(), name);
            self.client.deliver(ServerMessage::NameTaken)?;
            return Ok(Flow::Continue);
        }

        self.display_name = Some(name.to_string());
        self.phase = Phase::Active;
        info!("Client {} logged in as '{}'", self.id(), name);

        self.client.deliver(ServerMessage::LoginSuccess {
            name: name.to_string(),
        })?;
        Ok(Flow::Continue)
    }

    async fn handle_command(&mut self, command: Command) -> Result<Flow, AppError> {
        // Active implies a display name
        let name = self.display_name.as_deref().unwrap_or_default();
        debug!("'{}' sent {:?}", name, command);

        match command {
            Command::Quit => return self.quit().await,
            Command::List => {
                let names = self.registry.list_names().await?;
                self.client.deliver(ServerMessage::ClientList { names })?;
            }
            Command::Broadcast(text) => {
                self.registry.broadcast(name, &text).await?;
            }
            Command::Private { target, text } => {
                self.registry.send_private(name, &target, &text).await?;
            }
            Command::MalformedPrivate => {
                self.client.deliver(ServerMessage::InvalidPrivate)?;
            }
            Command::Unrecognized(text) => {
                self.client.deliver(ServerMessage::Echo { text })?;
            }
        }

        Ok(Flow::Continue)
    }

    async fn quit(&mut self) -> Result<Flow, AppError> {
        let name = self.display_name.clone().unwrap_or_default();
        self.client.deliver(ServerMessage::Goodbye { name: name.clone() })?;

        // Release before closing so the name is free once the peer sees EOF
        self.release().await?;
        if let Err(e) = self.client.close() {
            debug!("Close for {} failed: {}", self.id(), e);
        }
        self.closed = true;

        info!("'{}' quit", name);
        Ok(Flow::Close)
    }

    async fn release(&mut self) -> Result<(), AppError> {
        if self.released {
            return Ok(());
        }
        self.released = true;

        if let Some(name) = &self.display_name {
            self.registry.unregister(name, self.client.id).await?;
        }
        Ok(())
    }
}
