//! Server configuration
//!
//! Layered, lowest precedence first: built-in defaults, a TOML file named
//! by `TELNET_CHAT_CONFIG`, then a bind address given on the command line.

use std::net::SocketAddr;
use std::path::Path;

use serde::Deserialize;

use crate::codec::DEFAULT_MAX_LINE_LENGTH;
use crate::error::ConfigError;

/// Environment variable naming an optional TOML config file
pub const CONFIG_ENV: &str = "TELNET_CHAT_CONFIG";

/// Default server address
pub const DEFAULT_ADDR: &str = "127.0.0.1:8888";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Listen address (`host:port`)
    pub bind_addr: String,
    /// Capacity of the registry actor's command channel
    pub command_buffer: usize,
    /// Longest accepted incoming line, in bytes
    pub max_line_length: usize,
    /// Fallback tracing filter when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_ADDR.to_string(),
            command_buffer: 256,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            log_filter: "telnet_chat=info".to_string(),
        }
    }
}

impl Config {
    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// Build the effective config for the binary
    ///
    /// `config_path` is the value of `TELNET_CHAT_CONFIG`, `bind_override`
    /// the first command line argument.
    pub fn load(
        config_path: Option<String>,
        bind_override: Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = match config_path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        if let Some(addr) = bind_override {
            config.bind_addr = addr;
        }
        config.validate()?;
        Ok(config)
    }

    /// Reject a bind address that is not `ip:port`
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bind_addr
            .parse::<SocketAddr>()
            .map(|_| ())
            .map_err(|_| ConfigError::InvalidAddress(self.bind_addr.clone()))
    }
}
