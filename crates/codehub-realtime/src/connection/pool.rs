//! Connection pool: all active connections indexed by ID and by user.

use std::sync::Arc;

use dashmap::DashMap;

use codehub_core::types::{ConnectionId, UserId};

use super::handle::ConnectionHandle;

/// Thread-safe pool of all active WebSocket connections.
#[derive(Debug, Default)]
pub struct ConnectionPool {
    /// User ID → connection handles (one user can have several tabs open).
    by_user: DashMap<UserId, Vec<Arc<ConnectionHandle>>>,
    /// Connection ID → connection handle.
    by_id: DashMap<ConnectionId, Arc<ConnectionHandle>>,
}

impl ConnectionPool {
    /// Creates a new empty connection pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a connection to the pool.
    pub fn add(&self, handle: Arc<ConnectionHandle>) {
        self.by_id.insert(handle.id, handle.clone());
        self.by_user.entry(handle.user_id).or_default().push(handle);
    }

    /// Removes a connection from the pool.
    pub fn remove(&self, conn_id: ConnectionId) -> Option<Arc<ConnectionHandle>> {
        let (_, handle) = self.by_id.remove(&conn_id)?;
        if let Some(mut connections) = self.by_user.get_mut(&handle.user_id) {
            connections.retain(|c| c.id != conn_id);
        }
        self.by_user
            .remove_if(&handle.user_id, |_, connections| connections.is_empty());
        Some(handle)
    }

    /// Gets a specific connection by ID.
    pub fn get(&self, conn_id: ConnectionId) -> Option<Arc<ConnectionHandle>> {
        self.by_id.get(&conn_id).map(|entry| entry.value().clone())
    }

    /// Gets all connections for a user, oldest first.
    pub fn user_connections(&self, user_id: UserId) -> Vec<Arc<ConnectionHandle>> {
        self.by_user
            .get(&user_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Returns all connection handles.
    pub fn all(&self) -> Vec<Arc<ConnectionHandle>> {
        self.by_id.iter().map(|entry| entry.value().clone()).collect()
    }

    /// Returns total number of active connections.
    pub fn connection_count(&self) -> usize {
        self.by_id.len()
    }

    /// Returns number of unique connected users.
    pub fn user_count(&self) -> usize {
        self.by_user.len()
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;

    use super::*;

    fn handle(user_id: UserId) -> Arc<ConnectionHandle> {
        let (tx, _rx) = mpsc::channel(4);
        Arc::new(ConnectionHandle::new(user_id, "u".into(), tx))
    }

    #[test]
    fn test_add_and_remove_by_user() {
        let pool = ConnectionPool::new();
        let user = UserId::new();
        let first = handle(user);
        let second = handle(user);
        pool.add(first.clone());
        pool.add(second.clone());

        assert_eq!(pool.connection_count(), 2);
        assert_eq!(pool.user_count(), 1);

        pool.remove(first.id);
        assert_eq!(pool.user_connections(user).len(), 1);
        pool.remove(second.id);
        assert_eq!(pool.user_count(), 0);
        assert!(pool.remove(second.id).is_none());
    }
}
