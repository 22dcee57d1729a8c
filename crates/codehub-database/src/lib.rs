//! # codehub-database
//!
//! Persistence for CodeHub. Each entity has a repository trait in
//! [`repositories`] with a PostgreSQL implementation next to it; the
//! [`memory`] module implements every trait over process-local tables.
//! Callers depend on the traits only, bundled in [`Repositories`].

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
pub use memory::MemoryDatabase;
pub use repositories::Repositories;
