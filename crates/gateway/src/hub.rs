//! In-process fan-out hub for real-time chat events.
//!
//! Each connected user holds one broadcast channel; every open socket of
//! that user subscribes to it. Publishing an event means looking up the
//! channels of the recipient user IDs (the chat's members) and sending the
//! event to each. There is no delivery guarantee: a user without an open
//! socket, or one whose receiver lagged behind, simply misses the event and
//! re-syncs over REST.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};
use tracing::debug;

use crate::websocket::events::ChatServerEvent;

const CHANNEL_CAPACITY: usize = 256;

/// Registry of per-user broadcast channels
#[derive(Clone, Default)]
pub struct ChatHub {
    connections: Arc<RwLock<HashMap<i64, broadcast::Sender<ChatServerEvent>>>>,
}

impl ChatHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a new socket for a user, creating the user's channel on
    /// first connect
    pub async fn subscribe(&self, user_id: i64) -> broadcast::Receiver<ChatServerEvent> {
        let mut connections = self.connections.write().await;
        connections
            .entry(user_id)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Publish an event to every connected recipient, returning how many
    /// user channels received it
    pub async fn publish(&self, recipients: &[i64], event: &ChatServerEvent) -> usize {
        let connections = self.connections.read().await;

        let mut delivered = 0;
        for user_id in recipients {
            if let Some(sender) = connections.get(user_id) {
                if sender.send(event.clone()).is_ok() {
                    delivered += 1;
                }
            }
        }

        debug!(
            event = event.event_type_name(),
            recipients = recipients.len(),
            delivered = delivered,
            "published chat event"
        );

        delivered
    }

    /// Whether the user currently has at least one open socket
    pub async fn is_online(&self, user_id: i64) -> bool {
        let connections = self.connections.read().await;
        connections
            .get(&user_id)
            .map(|sender| sender.receiver_count() > 0)
            .unwrap_or(false)
    }

    /// Drop the user's channel once their last socket has closed
    pub async fn disconnect(&self, user_id: i64) {
        let mut connections = self.connections.write().await;
        if let Some(sender) = connections.get(&user_id) {
            if sender.receiver_count() == 0 {
                connections.remove(&user_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ping_event() -> ChatServerEvent {
        ChatServerEvent::UserTyping {
            chat_id: "c1".to_string(),
            user_id: "u1".to_string(),
            is_typing: true,
        }
    }

    #[tokio::test]
    async fn publish_reaches_only_connected_recipients() {
        let hub = ChatHub::new();

        let mut rx_alice = hub.subscribe(1).await;
        let _rx_bob = hub.subscribe(2).await;

        // User 3 has no socket; publishing to them is a no-op.
        let delivered = hub.publish(&[1, 3], &ping_event()).await;
        assert_eq!(delivered, 1);

        let received = rx_alice.recv().await.unwrap();
        assert_eq!(received.event_type_name(), "user_typing");
    }

    #[tokio::test]
    async fn all_sockets_of_a_user_receive_the_event() {
        let hub = ChatHub::new();

        let mut first = hub.subscribe(1).await;
        let mut second = hub.subscribe(1).await;

        hub.publish(&[1], &ping_event()).await;

        assert!(first.recv().await.is_ok());
        assert!(second.recv().await.is_ok());
    }

    #[tokio::test]
    async fn disconnect_keeps_channel_while_sockets_remain() {
        let hub = ChatHub::new();

        let rx_keep = hub.subscribe(1).await;
        {
            let rx_drop = hub.subscribe(1).await;
            drop(rx_drop);
        }

        hub.disconnect(1).await;
        assert!(hub.is_online(1).await);

        drop(rx_keep);
        hub.disconnect(1).await;
        assert!(!hub.is_online(1).await);
    }
}
