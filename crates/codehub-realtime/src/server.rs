//! Top-level real-time engine that ties the subsystems together.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::info;

use codehub_core::config::RealtimeConfig;
use codehub_service::{ChatService, ServiceDeps};

use crate::channel::ChannelRegistry;
use crate::connection::{ConnectionManager, HeartbeatConfig};

/// Central real-time engine shared by every WebSocket task.
#[derive(Clone)]
pub struct RealtimeEngine {
    /// Connection manager.
    pub connections: Arc<ConnectionManager>,
    /// Channel registry.
    pub channels: Arc<ChannelRegistry>,
    /// Heartbeat timing for new connections.
    pub heartbeat: HeartbeatConfig,
    /// Shutdown signal sender.
    shutdown_tx: broadcast::Sender<()>,
}

impl std::fmt::Debug for RealtimeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeEngine").finish()
    }
}

impl RealtimeEngine {
    /// Creates a new real-time engine over the shared service deps.
    pub fn new(config: RealtimeConfig, deps: &ServiceDeps) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        let channels = Arc::new(ChannelRegistry::new());
        let connections = Arc::new(ConnectionManager::new(
            config.clone(),
            channels.clone(),
            deps.resolver.clone(),
            deps.roles.clone(),
            ChatService::new(deps),
        ));

        info!("Real-time engine initialized");

        Self {
            connections,
            channels,
            heartbeat: HeartbeatConfig::from(&config),
            shutdown_tx,
        }
    }

    /// Returns a shutdown receiver for graceful shutdown coordination.
    pub fn shutdown_receiver(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Signals every socket task to stop and drops all connections.
    pub fn shutdown(&self) {
        info!(
            connections = self.connections.connection_count(),
            "Shutting down real-time engine"
        );
        let _ = self.shutdown_tx.send(());
        self.connections.close_all();
    }
}
