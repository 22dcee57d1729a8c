//! # codehub-auth
//!
//! Authorization engine for CodeHub projects.
//!
//! ## Modules
//!
//! - `role` — effective project role per user (owner, membership, public)
//! - `tree` — folder/document hierarchy walks and structural checks
//! - `acl` — override store, pure decision policy, and the permission resolver
//! - `cascade` — subtree-wide grant, revoke, and removal
//! - `rbac` — project-level capabilities (manage members, overrides, project)
//! - `jwt` — validation of externally issued bearer tokens

pub mod acl;
pub mod cascade;
pub mod jwt;
pub mod rbac;
pub mod role;
pub mod tree;

pub use acl::{
    AccessHints, DecisionSource, EditCapability, OverrideStore, PermissionResolver, Resolution,
};
pub use cascade::{CascadeEngine, CascadeReport};
pub use jwt::{Claims, JwtDecoder};
pub use rbac::{ProjectCapability, RbacEnforcer};
pub use role::{ProjectAccess, RoleStore};
pub use tree::{ResourceTree, Subtree, TreeResource};
