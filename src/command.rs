//! Command parsing
//!
//! Turns one trimmed line from an active session into a `Command`.
//! Rules are applied in priority order: exact `quit`, exact `list`,
//! `broadcast ` prefix, `@` prefix, then anything else.

const BROADCAST_PREFIX: &str = "broadcast ";
const PRIVATE_PREFIX: char = '@';

/// Client → Server command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Disconnect
    Quit,
    /// List active names
    List,
    /// Send text to every other active session (may be empty)
    Broadcast(String),
    /// Send text to one named session
    Private { target: String, text: String },
    /// `@` prefix with no space separating target and text
    MalformedPrivate,
    /// Anything else, echoed back
    Unrecognized(String),
}

impl Command {
    /// Parse a trimmed line
    pub fn parse(line: &str) -> Self {
        match line {
            "quit" => return Command::Quit,
            "list" => return Command::List,
            _ => {}
        }

        if let Some(text) = line.strip_prefix(BROADCAST_PREFIX) {
            return Command::Broadcast(text.to_string());
        }

        if let Some(rest) = line.strip_prefix(PRIVATE_PREFIX) {
            return match rest.split_once(' ') {
                Some((target, text)) => Command::Private {
                    target: target.to_string(),
                    text: text.to_string(),
                },
                None => Command::MalformedPrivate,
            };
        }

        Command::Unrecognized(line.to_string())
    }
}
