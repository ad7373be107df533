//! Server → client line catalogue
//!
//! Every line the server can write is produced here, so the wire text
//! lives in one place. Each event renders to one or more lines.

/// Prompt written after most command responses
pub const PROMPT: &str = "Enter your command:";

/// Server → Client event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    /// Sent on connect, asks for a name
    Greeting,
    /// Requested name belongs to another active session
    NameTaken,
    /// Name accepted, followed by the help block and prompt
    LoginSuccess { name: String },
    /// Reply to `quit`
    Goodbye { name: String },
    /// Reply to `list`
    ClientList { names: Vec<String> },
    /// Broadcast relayed to a peer
    Broadcast { from: String, text: String },
    /// Private message relayed to its recipient
    Private { from: String, text: String },
    /// Private message target is not registered
    NotConnected { recipient: String },
    /// `@` command without a message part
    InvalidPrivate,
    /// Unrecognized command text
    Echo { text: String },
}

impl ServerMessage {
    /// Render this event as protocol lines (without terminators)
    pub fn into_lines(self) -> Vec<String> {
        match self {
            ServerMessage::Greeting => vec![
                "Welcome to the Telnet Server!".to_string(),
                "Please enter your username:".to_string(),
            ],
            ServerMessage::NameTaken => {
                vec!["Username is already taken. Please enter another username:".to_string()]
            }
            ServerMessage::LoginSuccess { name } => vec![
                format!("Welcome, {}!", name),
                "Type 'quit' to disconnect, 'list' to view connected clients,".to_string(),
                "'broadcast message' to send a broadcast message,".to_string(),
                "and '@username message' to send a private message.".to_string(),
                PROMPT.to_string(),
            ],
            ServerMessage::Goodbye { name } => vec![format!("Goodbye, {}!", name)],
            ServerMessage::ClientList { names } if names.is_empty() => {
                vec!["No other clients connected.".to_string()]
            }
            ServerMessage::ClientList { names } => {
                let mut lines = Vec::with_capacity(names.len() + 1);
                lines.push("Connected clients:".to_string());
                lines.extend(names);
                lines
            }
            ServerMessage::Broadcast { from, text } => vec![format!("<{}> {}", from, text)],
            ServerMessage::Private { from, text } => {
                vec![format!("(private from {}) {}", from, text)]
            }
            ServerMessage::NotConnected { recipient } => {
                vec![format!("User '{}' is not connected.", recipient)]
            }
            ServerMessage::InvalidPrivate => vec![
                "Invalid private message format. Usage: '@username message'".to_string(),
                PROMPT.to_string(),
            ],
            ServerMessage::Echo { text } => vec![format!("You entered: {}", text), PROMPT.to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greeting_lines() {
        assert_eq!(
            ServerMessage::Greeting.into_lines(),
            vec!["Welcome to the Telnet Server!", "Please enter your username:"]
        );
    }

    #[test]
    fn test_login_success_ends_with_prompt() {
        let lines = ServerMessage::LoginSuccess {
            name: "alice".to_string(),
        }
        .into_lines();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "Welcome, alice!");
        assert_eq!(lines[4], PROMPT);
    }

    #[test]
    fn test_client_list_empty_and_populated() {
        assert_eq!(
            ServerMessage::ClientList { names: vec![] }.into_lines(),
            vec!["No other clients connected."]
        );
        assert_eq!(
            ServerMessage::ClientList {
                names: vec!["alice".to_string(), "bob".to_string()]
            }
            .into_lines(),
            vec!["Connected clients:", "alice", "bob"]
        );
    }

    #[test]
    fn test_routed_message_formats() {
        let broadcast = ServerMessage::Broadcast {
            from: "alice".to_string(),
            text: "hi".to_string(),
        };
        assert_eq!(broadcast.into_lines(), vec!["<alice> hi"]);

        let private = ServerMessage::Private {
            from: "alice".to_string(),
            text: "hi".to_string(),
        };
        assert_eq!(private.into_lines(), vec!["(private from alice) hi"]);

        let missing = ServerMessage::NotConnected {
            recipient: "bob".to_string(),
        };
        assert_eq!(missing.into_lines(), vec!["User 'bob' is not connected."]);
    }

    #[test]
    fn test_echo_is_followed_by_prompt() {
        let lines = ServerMessage::Echo {
            text: "hello".to_string(),
        }
        .into_lines();
        assert_eq!(lines, vec!["You entered: hello", PROMPT]);
    }
}
