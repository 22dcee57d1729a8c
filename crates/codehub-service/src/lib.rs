//! # codehub-service
//!
//! Use-case layer for CodeHub. Each service combines the repositories with
//! the authorization engine from `codehub-auth`: every folder or document
//! operation asks the [`PermissionResolver`](codehub_auth::PermissionResolver)
//! first, every project-level operation goes through the
//! [`RbacEnforcer`](codehub_auth::RbacEnforcer).
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time, usually via [`ServiceDeps`].

pub mod chat;
pub mod context;
pub mod deps;
pub mod document;
pub mod folder;
pub mod membership;
pub mod naming;
pub mod permission;
pub mod project;

pub use chat::ChatService;
pub use context::RequestContext;
pub use deps::ServiceDeps;
pub use document::DocumentService;
pub use folder::{FolderService, TreeService};
pub use membership::{InvitationService, MembershipService};
pub use permission::PermissionService;
pub use project::ProjectService;
