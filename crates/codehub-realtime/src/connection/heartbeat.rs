//! Ping/pong heartbeat for WebSocket keepalive.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time;
use tracing::{debug, warn};

use codehub_core::config::RealtimeConfig;

use super::handle::ConnectionHandle;
use crate::message::OutboundMessage;

/// Heartbeat configuration
#[derive(Debug, Clone, Copy)]
pub struct HeartbeatConfig {
    /// Interval between pings
    pub ping_interval: Duration,
    /// Timeout before considering connection dead
    pub ping_timeout: Duration,
}

impl From<&RealtimeConfig> for HeartbeatConfig {
    fn from(config: &RealtimeConfig) -> Self {
        Self {
            ping_interval: Duration::from_secs(config.ping_interval_seconds),
            ping_timeout: Duration::from_secs(
                config.ping_interval_seconds + config.ping_timeout_seconds,
            ),
        }
    }
}

/// Run heartbeat loop for a connection.
///
/// Sends periodic pings and marks the connection dead once no pong has
/// arrived within the timeout. Returns when the connection is dead.
pub async fn run_heartbeat(handle: Arc<ConnectionHandle>, config: HeartbeatConfig) {
    let mut interval = time::interval(config.ping_interval);
    interval.tick().await;

    loop {
        interval.tick().await;

        if !handle.is_alive() {
            break;
        }

        let elapsed = Utc::now() - handle.last_pong().await;
        if let Ok(elapsed) = elapsed.to_std() {
            if elapsed > config.ping_timeout {
                warn!(conn_id = %handle.id, elapsed = ?elapsed, "Heartbeat timeout");
                handle.mark_dead();
                break;
            }
        }

        let ping = OutboundMessage::Ping {
            timestamp: Utc::now(),
        };
        if !handle.send(&ping) {
            debug!(conn_id = %handle.id, "Ping send failed, marking dead");
            handle.mark_dead();
            break;
        }
    }

    debug!(conn_id = %handle.id, "Heartbeat loop ended");
}
