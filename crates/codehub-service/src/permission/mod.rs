//! Override management, cascades, and permission introspection.

pub mod service;

pub use service::{CascadeOperation, GrantOverrideRequest, PermissionService, RetryCascadeRequest};
