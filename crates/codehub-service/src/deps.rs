//! The shared building blocks every service is constructed from.

use std::sync::Arc;

use codehub_auth::{
    CascadeEngine, OverrideStore, PermissionResolver, RbacEnforcer, ResourceTree, RoleStore,
};
use codehub_database::Repositories;

/// Repositories plus the authorization engine wired on top of them.
///
/// Cloning is cheap; every field is reference counted or `Copy`.
#[derive(Debug, Clone)]
pub struct ServiceDeps {
    /// Raw repositories.
    pub repos: Repositories,
    /// Effective project roles.
    pub roles: RoleStore,
    /// Hierarchy walks and structural checks.
    pub tree: ResourceTree,
    /// Per-resource overrides.
    pub overrides: OverrideStore,
    /// Per-resource decisions.
    pub resolver: Arc<PermissionResolver>,
    /// Subtree-wide writes.
    pub cascade: Arc<CascadeEngine>,
    /// Project-level capabilities.
    pub rbac: RbacEnforcer,
}

impl ServiceDeps {
    /// Wire the engine over `repos`.
    pub fn new(repos: Repositories) -> Self {
        let roles = RoleStore::new(repos.projects.clone(), repos.memberships.clone());
        let tree = ResourceTree::new(repos.folders.clone(), repos.documents.clone());
        let overrides = OverrideStore::new(repos.overrides.clone());
        let resolver = Arc::new(PermissionResolver::new(
            roles.clone(),
            tree.clone(),
            overrides.clone(),
        ));
        let cascade = Arc::new(CascadeEngine::new(
            tree.clone(),
            overrides.clone(),
            repos.folders.clone(),
            repos.documents.clone(),
        ));

        Self {
            repos,
            roles,
            tree,
            overrides,
            resolver,
            cascade,
            rbac: RbacEnforcer::new(),
        }
    }
}
