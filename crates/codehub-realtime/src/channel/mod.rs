//! Pub/sub channels.

pub mod registry;
pub mod types;

pub use registry::ChannelRegistry;
pub use types::ChannelName;
