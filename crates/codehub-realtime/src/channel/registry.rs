//! Channel registry: channel to subscribers, and the reverse index.

use std::collections::HashSet;

use dashmap::DashMap;

use codehub_core::types::ConnectionId;

use super::types::ChannelName;

/// Registry of all active channels.
#[derive(Debug, Default)]
pub struct ChannelRegistry {
    /// Channel → subscribed connections.
    channels: DashMap<ChannelName, HashSet<ConnectionId>>,
    /// Connection → joined channels.
    by_connection: DashMap<ConnectionId, HashSet<ChannelName>>,
}

impl ChannelRegistry {
    /// Creates a new channel registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes a connection. Returns `false` if it was already subscribed.
    pub fn subscribe(&self, channel: ChannelName, conn_id: ConnectionId) -> bool {
        let added = self.channels.entry(channel).or_default().insert(conn_id);
        self.by_connection.entry(conn_id).or_default().insert(channel);
        added
    }

    /// Unsubscribes a connection. Returns whether it was subscribed.
    pub fn unsubscribe(&self, channel: ChannelName, conn_id: ConnectionId) -> bool {
        let removed = self
            .channels
            .get_mut(&channel)
            .map(|mut subscribers| subscribers.remove(&conn_id))
            .unwrap_or(false);
        self.channels.remove_if(&channel, |_, subscribers| subscribers.is_empty());

        if let Some(mut joined) = self.by_connection.get_mut(&conn_id) {
            joined.remove(&channel);
        }
        self.by_connection
            .remove_if(&conn_id, |_, joined| joined.is_empty());
        removed
    }

    /// Unsubscribes a connection from every channel.
    pub fn unsubscribe_all(&self, conn_id: ConnectionId) {
        let Some((_, joined)) = self.by_connection.remove(&conn_id) else {
            return;
        };
        for channel in joined {
            if let Some(mut subscribers) = self.channels.get_mut(&channel) {
                subscribers.remove(&conn_id);
            }
            self.channels
                .remove_if(&channel, |_, subscribers| subscribers.is_empty());
        }
    }

    /// Whether a connection is subscribed to a channel.
    pub fn is_subscribed(&self, channel: ChannelName, conn_id: ConnectionId) -> bool {
        self.channels
            .get(&channel)
            .is_some_and(|subscribers| subscribers.contains(&conn_id))
    }

    /// Subscriber connection IDs of a channel.
    pub fn subscribers(&self, channel: ChannelName) -> Vec<ConnectionId> {
        self.channels
            .get(&channel)
            .map(|subscribers| subscribers.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Number of channels a connection has joined.
    pub fn subscription_count(&self, conn_id: ConnectionId) -> usize {
        self.by_connection
            .get(&conn_id)
            .map(|joined| joined.len())
            .unwrap_or(0)
    }

    /// Number of active channels.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }
}
