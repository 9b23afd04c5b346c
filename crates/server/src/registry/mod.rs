use std::collections::HashMap;

use tokio::sync::{mpsc, RwLock};

use crate::push::events::PushEvent;

pub type ChannelId = u64;

struct Channel {
    channel_id: ChannelId,
    tx: mpsc::UnboundedSender<String>,
}

/// user_id -> at most one live outbound push channel. The map never leaves
/// this module; all access goes through register/unregister/publish.
pub struct ConnectionRegistry {
    next_id: RwLock<u64>,
    channels: RwLock<HashMap<String, Channel>>,
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            next_id: RwLock::new(1),
            channels: RwLock::new(HashMap::new()),
        }
    }

    /// Register a channel for a user, replacing any existing one (last write
    /// wins). Dropping the evicted sender terminates the evicted stream.
    pub async fn register(&self, user_id: &str, tx: mpsc::UnboundedSender<String>) -> ChannelId {
        let channel_id = {
            let mut id = self.next_id.write().await;
            let current = *id;
            *id += 1;
            current
        };
        self.channels
            .write()
            .await
            .insert(user_id.to_string(), Channel { channel_id, tx });
        channel_id
    }

    /// Remove the user's entry only if it still carries `channel_id`, so a
    /// late teardown of an evicted stream never clobbers a newer
    /// registration. Returns whether an entry was removed.
    pub async fn unregister(&self, user_id: &str, channel_id: ChannelId) -> bool {
        let mut channels = self.channels.write().await;
        match channels.get(user_id) {
            Some(c) if c.channel_id == channel_id => {
                channels.remove(user_id);
                true
            }
            _ => false,
        }
    }

    /// Write an event to the user's channel if one is registered. Returns
    /// false when there is no channel or its receiver is gone; the event is
    /// dropped, not queued.
    pub async fn publish(&self, user_id: &str, event: &PushEvent) -> bool {
        let payload = match serde_json::to_string(event) {
            Ok(p) => p,
            Err(_) => return false,
        };

        let channels = self.channels.read().await;
        match channels.get(user_id) {
            Some(c) => c.tx.send(payload).is_ok(),
            None => false,
        }
    }

    pub async fn is_connected(&self, user_id: &str) -> bool {
        self.channels.read().await.contains_key(user_id)
    }
}
