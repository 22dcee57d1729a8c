//! WebSocket connection management: handles, pool, heartbeat, routing.

pub mod handle;
pub mod heartbeat;
pub mod manager;
pub mod pool;

pub use handle::ConnectionHandle;
pub use heartbeat::HeartbeatConfig;
pub use manager::ConnectionManager;
pub use pool::ConnectionPool;
