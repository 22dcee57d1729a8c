//! RBAC enforcement: turns the capability table into `AppResult`s.

use codehub_core::error::AppError;
use codehub_entity::membership::ProjectRole;

use super::policies::{ProjectCapability, role_allows};

/// Enforces project-level capabilities.
#[derive(Debug, Clone, Copy, Default)]
pub struct RbacEnforcer;

impl RbacEnforcer {
    /// Creates a new enforcer.
    pub fn new() -> Self {
        Self
    }

    /// Returns whether `role` holds `capability`.
    pub fn allows(&self, role: ProjectRole, capability: ProjectCapability) -> bool {
        role_allows(role, capability)
    }

    /// Fails with an authorization error unless `role` holds `capability`.
    ///
    /// A role of `None` yields a not-found error instead, so callers
    /// without access cannot probe which projects exist.
    pub fn require(
        &self,
        role: ProjectRole,
        capability: ProjectCapability,
    ) -> Result<(), AppError> {
        if role_allows(role, capability) {
            return Ok(());
        }
        match role {
            ProjectRole::None => Err(AppError::not_found("Project not found")),
            ProjectRole::Owner | ProjectRole::Admin | ProjectRole::Editor | ProjectRole::Viewer => {
                Err(AppError::authorization(format!(
                    "Role '{role}' cannot perform '{capability:?}' in this project"
                )))
            }
        }
    }
}
