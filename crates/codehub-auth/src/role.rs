//! Effective project role per user.

use std::sync::Arc;

use codehub_core::error::AppError;
use codehub_core::result::AppResult;
use codehub_core::types::{ProjectId, UserId};
use codehub_database::repositories::{MembershipRepository, ProjectRepository};
use codehub_entity::membership::ProjectRole;
use codehub_entity::project::Project;

/// A user's standing in a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectAccess {
    /// Effective role.
    pub role: ProjectRole,
    /// Owner or membership row. False for public visitors, whose
    /// `Viewer` role is implicit.
    pub participant: bool,
}

impl ProjectAccess {
    const NONE: Self = Self {
        role: ProjectRole::None,
        participant: false,
    };
}

/// Answers "what role does this user hold in this project".
///
/// Ownership comes from `project.owner_id` and outranks any membership
/// row. A public project gives non-members an implicit `Viewer` role.
#[derive(Clone)]
pub struct RoleStore {
    projects: Arc<dyn ProjectRepository>,
    memberships: Arc<dyn MembershipRepository>,
}

impl std::fmt::Debug for RoleStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoleStore").finish()
    }
}

impl RoleStore {
    /// Creates a role store over the given repositories.
    pub fn new(
        projects: Arc<dyn ProjectRepository>,
        memberships: Arc<dyn MembershipRepository>,
    ) -> Self {
        Self {
            projects,
            memberships,
        }
    }

    /// Effective role of `user_id` in `project_id`. An unknown project
    /// yields [`ProjectRole::None`].
    pub async fn role_of(&self, project_id: ProjectId, user_id: UserId) -> AppResult<ProjectRole> {
        Ok(self.access_of(project_id, user_id).await?.role)
    }

    /// Role and participation of `user_id` in `project_id`.
    pub async fn access_of(
        &self,
        project_id: ProjectId,
        user_id: UserId,
    ) -> AppResult<ProjectAccess> {
        match self.projects.find_by_id(project_id).await? {
            Some(project) => self.access_in(&project, user_id).await,
            None => Ok(ProjectAccess::NONE),
        }
    }

    /// Effective role of `user_id` in an already loaded project.
    pub async fn role_in(&self, project: &Project, user_id: UserId) -> AppResult<ProjectRole> {
        Ok(self.access_in(project, user_id).await?.role)
    }

    async fn access_in(&self, project: &Project, user_id: UserId) -> AppResult<ProjectAccess> {
        if project.is_owned_by(user_id) {
            return Ok(ProjectAccess {
                role: ProjectRole::Owner,
                participant: true,
            });
        }
        let access = match self.memberships.find(project.id, user_id).await? {
            Some(membership) => ProjectAccess {
                role: membership.role.into(),
                participant: true,
            },
            None if project.is_public => ProjectAccess {
                role: ProjectRole::Viewer,
                participant: false,
            },
            None => ProjectAccess::NONE,
        };
        Ok(access)
    }

    /// Whether the user is the owner or holds a membership row. Public
    /// visitors are not participants.
    pub async fn is_participant(&self, project_id: ProjectId, user_id: UserId) -> AppResult<bool> {
        Ok(self.access_of(project_id, user_id).await?.participant)
    }

    /// Load a project, failing with not-found when absent.
    pub async fn project(&self, project_id: ProjectId) -> AppResult<Project> {
        self.projects
            .find_by_id(project_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Project {project_id} not found")))
    }
}
