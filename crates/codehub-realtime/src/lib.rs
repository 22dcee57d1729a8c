//! # codehub-realtime
//!
//! Real-time collaboration relay for CodeHub. Provides:
//!
//! - WebSocket connection tracking with per-user limits
//! - Project and document channels
//! - Code-change relay that re-checks write permission on every event
//! - Project chat, persisted before broadcast
//! - Ping/pong heartbeat

pub mod channel;
pub mod connection;
pub mod message;
pub mod server;

pub use channel::{ChannelName, ChannelRegistry};
pub use connection::{ConnectionHandle, ConnectionManager};
pub use message::{InboundMessage, OutboundMessage};
pub use server::RealtimeEngine;
