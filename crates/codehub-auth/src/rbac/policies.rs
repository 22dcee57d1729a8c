//! Capability table for project roles.

use serde::{Deserialize, Serialize};

use codehub_entity::membership::ProjectRole;

/// Project-wide operations gated by role alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectCapability {
    /// See the project, its tree, members, and chat.
    ViewProject,
    /// Create folders or documents at the project root.
    CreateAtRoot,
    /// Invite, re-role, and remove members.
    ManageMembers,
    /// Grant and revoke overrides, including subtree cascades.
    ManageOverrides,
    /// Change visibility or delete the project.
    ManageProject,
}

/// Whether `role` holds `capability`.
pub fn role_allows(role: ProjectRole, capability: ProjectCapability) -> bool {
    match capability {
        ProjectCapability::ViewProject => role.has_access(),
        ProjectCapability::CreateAtRoot => match role {
            ProjectRole::Owner | ProjectRole::Admin | ProjectRole::Editor => true,
            ProjectRole::Viewer | ProjectRole::None => false,
        },
        ProjectCapability::ManageMembers | ProjectCapability::ManageOverrides => role.is_manager(),
        ProjectCapability::ManageProject => match role {
            ProjectRole::Owner => true,
            ProjectRole::Admin | ProjectRole::Editor | ProjectRole::Viewer | ProjectRole::None => {
                false
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_managers_touch_overrides() {
        assert!(role_allows(ProjectRole::Owner, ProjectCapability::ManageOverrides));
        assert!(role_allows(ProjectRole::Admin, ProjectCapability::ManageOverrides));
        assert!(!role_allows(ProjectRole::Editor, ProjectCapability::ManageOverrides));
        assert!(!role_allows(ProjectRole::Viewer, ProjectCapability::ManageMembers));
    }

    #[test]
    fn test_project_management_is_owner_only() {
        assert!(role_allows(ProjectRole::Owner, ProjectCapability::ManageProject));
        assert!(!role_allows(ProjectRole::Admin, ProjectCapability::ManageProject));
    }

    #[test]
    fn test_root_creation() {
        assert!(role_allows(ProjectRole::Editor, ProjectCapability::CreateAtRoot));
        assert!(!role_allows(ProjectRole::Viewer, ProjectCapability::CreateAtRoot));
        assert!(!role_allows(ProjectRole::None, ProjectCapability::ViewProject));
    }
}
