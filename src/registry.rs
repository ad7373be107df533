//! Client registry
//!
//! Maps display names to active client handles. Owns name uniqueness and
//! routing decisions; knows nothing about the command grammar.
//!
//! The registry itself is not synchronized. It is owned by the
//! `ChatServer` actor, which serializes every call.

use indexmap::IndexMap;
use tracing::debug;

use crate::client::Client;
use crate::message::ServerMessage;
use crate::types::ClientId;

/// Name → client mapping, in registration order
#[derive(Debug, Default)]
pub struct ClientRegistry {
    clients: IndexMap<String, Client>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// True iff an active session currently holds `name`
    pub fn is_name_taken(&self, name: &str) -> bool {
        self.clients.contains_key(name)
    }

    /// Insert `client` under `name`
    ///
    /// The caller must have checked `is_name_taken` in the same step;
    /// a taken name is left untouched.
    pub fn register(&mut self, name: String, client: Client) {
        debug_assert!(!self.is_name_taken(&name), "name '{}' registered twice", name);
        self.clients.entry(name).or_insert(client);
    }

    /// Check and register as one step
    ///
    /// Returns false, leaving the registry unchanged, if the name is taken.
    pub fn try_register(&mut self, name: String, client: Client) -> bool {
        if self.is_name_taken(&name) {
            return false;
        }
        self.register(name, client);
        true
    }

    /// Remove `name` if it is held by connection `id`
    ///
    /// Unknown names, and names since re-taken by another connection, are
    /// left alone. Returns whether an entry was removed.
    pub fn unregister(&mut self, name: &str, id: ClientId) -> bool {
        match self.clients.get(name) {
            Some(client) if client.id == id => {
                self.clients.shift_remove(name);
                true
            }
            _ => false,
        }
    }

    /// Snapshot of all active names, in registration order
    pub fn list_names(&self) -> Vec<String> {
        self.clients.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Deliver `<sender> text` to every active client except `sender`
    ///
    /// Queueing never waits. A peer whose connection is already closed
    /// misses the line, which is logged and skipped. Returns the number of
    /// peers the line was queued for.
    pub fn broadcast(&self, sender: &str, text: &str) -> usize {
        let mut delivered = 0;
        for (name, client) in self.clients.iter().filter(|(name, _)| name.as_str() != sender) {
            let msg = ServerMessage::Broadcast {
                from: sender.to_string(),
                text: text.to_string(),
            };
            match client.deliver(msg) {
                Ok(()) => delivered += 1,
                Err(e) => debug!("Broadcast to '{}' failed: {}", name, e),
            }
        }
        delivered
    }

    /// Deliver `(private from sender) text` to `recipient`
    ///
    /// If the recipient is not registered the sender is told so instead.
    /// If the sender is not registered either, nothing is sent.
    /// Returns whether the recipient was found.
    pub fn send_private(&self, sender: &str, recipient: &str, text: &str) -> bool {
        if let Some(client) = self.clients.get(recipient) {
            let msg = ServerMessage::Private {
                from: sender.to_string(),
                text: text.to_string(),
            };
            if let Err(e) = client.deliver(msg) {
                debug!("Private message to '{}' failed: {}", recipient, e);
            }
            return true;
        }

        let Some(origin) = self.clients.get(sender) else {
            debug!(
                "Sender '{}' no longer registered, dropping not-connected notice",
                sender
            );
            return false;
        };

        let msg = ServerMessage::NotConnected {
            recipient: recipient.to_string(),
        };
        if let Err(e) = origin.deliver(msg) {
            debug!("Not-connected notice to '{}' failed: {}", sender, e);
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;

    use super::*;
    use crate::client::Outbound;

    fn test_client() -> (Client, mpsc::UnboundedReceiver<Outbound>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Client::new(ClientId::new(), tx), rx)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<Outbound>) -> Vec<String> {
        let mut lines = Vec::new();
        while let Ok(frame) = rx.try_recv() {
            if let Outbound::Line(line) = frame {
                lines.push(line);
            }
        }
        lines
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = ClientRegistry::new();
        let (alice, _rx) = test_client();

        assert!(!registry.is_name_taken("alice"));
        registry.register("alice".to_string(), alice);
        assert!(registry.is_name_taken("alice"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_try_register_rejects_taken_name() {
        let mut registry = ClientRegistry::new();
        let (first, _rx1) = test_client();
        let (second, _rx2) = test_client();
        let first_id = first.id;

        assert!(registry.try_register("alice".to_string(), first));
        assert!(!registry.try_register("alice".to_string(), second));

        // Rejected attempt leaves the original holder in place
        assert_eq!(registry.len(), 1);
        assert!(!registry.unregister("alice", ClientId::new()));
        assert!(registry.unregister("alice", first_id));
    }

    #[test]
    fn test_unregister_is_idempotent() {
        let mut registry = ClientRegistry::new();
        let (alice, _rx) = test_client();
        let id = alice.id;
        registry.register("alice".to_string(), alice);

        assert!(registry.unregister("alice", id));
        assert!(!registry.unregister("alice", id));
        assert!(!registry.is_name_taken("alice"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_unregister_unknown_name_is_noop() {
        let mut registry = ClientRegistry::new();
        assert!(!registry.unregister("ghost", ClientId::new()));
    }

    #[test]
    fn test_stale_unregister_keeps_new_owner() {
        let mut registry = ClientRegistry::new();
        let (old, _rx1) = test_client();
        let (new, _rx2) = test_client();
        let old_id = old.id;

        registry.register("alice".to_string(), old);
        assert!(registry.unregister("alice", old_id));
        registry.register("alice".to_string(), new);

        // Late disconnect of the old connection must not evict the new one
        assert!(!registry.unregister("alice", old_id));
        assert!(registry.is_name_taken("alice"));
    }

    #[test]
    fn test_list_names_in_registration_order() {
        let mut registry = ClientRegistry::new();
        let (c, _rx1) = test_client();
        let (a, _rx2) = test_client();
        let (b, _rx3) = test_client();
        let a_id = a.id;

        registry.register("charlie".to_string(), c);
        registry.register("alice".to_string(), a);
        registry.register("bob".to_string(), b);
        assert_eq!(registry.list_names(), vec!["charlie", "alice", "bob"]);

        registry.unregister("alice", a_id);
        assert_eq!(registry.list_names(), vec!["charlie", "bob"]);
    }

    #[test]
    fn test_broadcast_skips_sender() {
        let mut registry = ClientRegistry::new();
        let (alice, mut alice_rx) = test_client();
        let (bob, mut bob_rx) = test_client();
        let (carol, mut carol_rx) = test_client();
        registry.register("alice".to_string(), alice);
        registry.register("bob".to_string(), bob);
        registry.register("carol".to_string(), carol);

        assert_eq!(registry.broadcast("alice", "hi"), 2);

        assert!(drain(&mut alice_rx).is_empty());
        assert_eq!(drain(&mut bob_rx), vec!["<alice> hi"]);
        assert_eq!(drain(&mut carol_rx), vec!["<alice> hi"]);
    }

    #[test]
    fn test_broadcast_without_peers_sends_nothing() {
        let mut registry = ClientRegistry::new();
        let (alice, mut alice_rx) = test_client();
        registry.register("alice".to_string(), alice);

        assert_eq!(registry.broadcast("alice", "anyone?"), 0);
        assert!(drain(&mut alice_rx).is_empty());
    }

    #[test]
    fn test_broadcast_continues_past_dead_peer() {
        let mut registry = ClientRegistry::new();
        let (alice, _alice_rx) = test_client();
        let (dead, dead_rx) = test_client();
        let (carol, mut carol_rx) = test_client();
        registry.register("alice".to_string(), alice);
        registry.register("dead".to_string(), dead);
        registry.register("carol".to_string(), carol);
        drop(dead_rx);

        assert_eq!(registry.broadcast("alice", "still here"), 1);
        assert_eq!(drain(&mut carol_rx), vec!["<alice> still here"]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_broadcast_burst_reaches_idle_peer() {
        let mut registry = ClientRegistry::new();
        let (alice, _alice_rx) = test_client();
        let (bob, mut bob_rx) = test_client();
        registry.register("alice".to_string(), alice);
        registry.register("bob".to_string(), bob);

        // Bob reads nothing until the whole burst has been fanned out
        for i in 0..1000 {
            assert_eq!(registry.broadcast("alice", &format!("m{}", i)), 1);
        }

        let lines = drain(&mut bob_rx);
        assert_eq!(lines.len(), 1000);
        assert_eq!(lines[0], "<alice> m0");
        assert_eq!(lines[999], "<alice> m999");
    }

    #[test]
    fn test_send_private_to_recipient_only() {
        let mut registry = ClientRegistry::new();
        let (alice, mut alice_rx) = test_client();
        let (bob, mut bob_rx) = test_client();
        let (carol, mut carol_rx) = test_client();
        registry.register("alice".to_string(), alice);
        registry.register("bob".to_string(), bob);
        registry.register("carol".to_string(), carol);

        assert!(registry.send_private("alice", "bob", "hi"));

        assert_eq!(drain(&mut bob_rx), vec!["(private from alice) hi"]);
        assert!(drain(&mut alice_rx).is_empty());
        assert!(drain(&mut carol_rx).is_empty());
    }

    #[test]
    fn test_send_private_to_absent_recipient_notifies_sender() {
        let mut registry = ClientRegistry::new();
        let (alice, mut alice_rx) = test_client();
        let (carol, mut carol_rx) = test_client();
        registry.register("alice".to_string(), alice);
        registry.register("carol".to_string(), carol);

        assert!(!registry.send_private("alice", "bob", "hi"));

        assert_eq!(drain(&mut alice_rx), vec!["User 'bob' is not connected."]);
        assert!(drain(&mut carol_rx).is_empty());
    }

    #[test]
    fn test_send_private_with_unregistered_sender_is_silent() {
        let mut registry = ClientRegistry::new();
        let (carol, mut carol_rx) = test_client();
        registry.register("carol".to_string(), carol);

        assert!(!registry.send_private("alice", "bob", "hi"));
        assert!(drain(&mut carol_rx).is_empty());
    }
}
