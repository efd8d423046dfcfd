//! Notification Bus — `spec.md` §4.8: per-user fan-out of bot-status and
//! trade events to however many WebSocket listeners that user currently has
//! open. Grounded on the teacher's `websocket_dashboard.rs` client registry
//! (a `HashMap<id, broadcast::Sender<String>>` behind a lock, disconnected
//! senders pruned lazily), generalized from one global channel to one
//! channel per user since events here are scoped to the user who owns them.

use crate::models::TradeLog;
use crate::network::Network;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::RwLock;
use tokio::sync::broadcast;
use tracing::debug;

const CHANNEL_CAPACITY: usize = 256;

/// Wire shape for `spec.md` §4.8: `{type:"bot_status",...}` /
/// `{type:"new_trade",...}`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum Event {
    #[serde(rename = "bot_status")]
    BotStatus { network: Network, #[serde(rename = "isRunning")] is_running: bool },
    #[serde(rename = "new_trade")]
    NewTrade { trade: TradeLog },
}

pub struct NotificationBus {
    listeners: RwLock<HashMap<String, broadcast::Sender<String>>>,
}

impl NotificationBus {
    pub fn new() -> Self {
        Self { listeners: RwLock::new(HashMap::new()) }
    }

    /// Registers a new listener for `user_id`, returning a receiver the
    /// caller's WebSocket handler pumps into the socket. If this is the
    /// user's first listener a channel is created; subsequent listeners for
    /// the same user subscribe to the existing one.
    pub fn subscribe(&self, user_id: &str) -> broadcast::Receiver<String> {
        let mut listeners = self.listeners.write().expect("notification bus lock poisoned");
        listeners.entry(user_id.to_string()).or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0).subscribe()
    }

    /// Best-effort: a user with no open listeners is a no-op, and a send
    /// into a channel nobody is receiving from is not an error (`spec.md`
    /// §4.8 "events are not persisted").
    pub async fn broadcast(&self, user_id: &str, event: Event) {
        let sender = {
            let listeners = self.listeners.read().expect("notification bus lock poisoned");
            listeners.get(user_id).cloned()
        };
        let Some(sender) = sender else {
            debug!("no listeners for {user_id}, dropping event");
            return;
        };

        let payload = match serde_json::to_string(&event) {
            Ok(json) => json,
            Err(e) => {
                debug!("failed to serialize notification: {e}");
                return;
            }
        };
        // Errors here just mean the last receiver dropped between the read
        // lock above and now; the channel is pruned on next disconnect.
        let _ = sender.send(payload);
    }
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn broadcast_reaches_a_subscribed_listener() {
        let bus = NotificationBus::new();
        let mut rx = bus.subscribe("alice");
        bus.broadcast("alice", Event::BotStatus { network: Network::Eth, is_running: true }).await;

        let received = rx.recv().await.unwrap();
        assert!(received.contains("\"type\":\"bot_status\""));
        assert!(received.contains("\"isRunning\":true"));
    }

    #[tokio::test]
    async fn broadcast_with_no_listeners_does_not_panic() {
        let bus = NotificationBus::new();
        bus.broadcast("nobody-subscribed", Event::BotStatus { network: Network::Sol, is_running: false }).await;
    }

    #[tokio::test]
    async fn broadcast_is_scoped_to_the_target_user() {
        let bus = NotificationBus::new();
        let mut alice_rx = bus.subscribe("alice");
        let _bob_rx = bus.subscribe("bob");

        bus.broadcast("bob", Event::BotStatus { network: Network::Bnb, is_running: true }).await;

        assert!(alice_rx.try_recv().is_err());
    }
}
