//! Individual WebSocket connection handle.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::{RwLock, mpsc};
use tracing::warn;

use codehub_core::types::{ConnectionId, UserId};

use crate::message::OutboundMessage;

/// A handle to a single WebSocket connection.
///
/// Holds the sender channel for pushing serialized messages to the client
/// plus metadata about the connected user. Permissions are never cached
/// here; every event is re-checked against the resolver.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID
    pub id: ConnectionId,
    /// User who owns this connection
    pub user_id: UserId,
    /// Username (cached for display)
    pub username: String,
    /// Sender for outbound messages
    sender: mpsc::Sender<String>,
    /// When the connection was established
    pub connected_at: DateTime<Utc>,
    /// Last activity timestamp
    last_activity: RwLock<DateTime<Utc>>,
    /// Last pong received
    last_pong: RwLock<DateTime<Utc>>,
    /// Whether the connection is still alive
    alive: AtomicBool,
}

impl ConnectionHandle {
    /// Create a new connection handle
    pub fn new(user_id: UserId, username: String, sender: mpsc::Sender<String>) -> Self {
        let now = Utc::now();
        Self {
            id: ConnectionId::new(),
            user_id,
            username,
            sender,
            connected_at: now,
            last_activity: RwLock::new(now),
            last_pong: RwLock::new(now),
            alive: AtomicBool::new(true),
        }
    }

    /// Queue a message for this connection. Returns `false` if it was
    /// dropped.
    pub fn send(&self, msg: &OutboundMessage) -> bool {
        self.send_raw(msg.to_json())
    }

    /// Queue an already serialized message.
    pub fn send_raw(&self, payload: String) -> bool {
        if !self.is_alive() {
            return false;
        }
        match self.sender.try_send(payload) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(conn_id = %self.id, "Send buffer full, dropping message");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.mark_dead();
                false
            }
        }
    }

    /// Check if connection is alive
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Mark connection as dead
    pub fn mark_dead(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }

    /// Update last activity timestamp
    pub async fn touch(&self) {
        *self.last_activity.write().await = Utc::now();
    }

    /// Last activity timestamp
    pub async fn last_activity(&self) -> DateTime<Utc> {
        *self.last_activity.read().await
    }

    /// Record a pong response
    pub async fn record_pong(&self) {
        *self.last_pong.write().await = Utc::now();
    }

    /// When the last pong arrived
    pub async fn last_pong(&self) -> DateTime<Utc> {
        *self.last_pong.read().await
    }
}
