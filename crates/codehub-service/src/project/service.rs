//! Project CRUD with owner/member checks.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use codehub_auth::{ProjectCapability, RbacEnforcer, RoleStore};
use codehub_core::error::AppError;
use codehub_core::types::ProjectId;
use codehub_database::repositories::ProjectRepository;
use codehub_entity::membership::ProjectRole;
use codehub_entity::project::{CreateProject, Project};

use crate::context::RequestContext;
use crate::deps::ServiceDeps;
use crate::naming::normalize_name;

/// Manages projects.
#[derive(Clone)]
pub struct ProjectService {
    projects: Arc<dyn ProjectRepository>,
    roles: RoleStore,
    rbac: RbacEnforcer,
}

/// Request to create a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProjectRequest {
    /// Display name.
    pub name: String,
    /// Whether non-members may read the project.
    #[serde(default)]
    pub is_public: bool,
}

/// A project together with the caller's role in it.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectView {
    /// The project.
    #[serde(flatten)]
    pub project: Project,
    /// The caller's effective role.
    pub role: ProjectRole,
}

impl std::fmt::Debug for ProjectService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectService").finish_non_exhaustive()
    }
}

impl ProjectService {
    /// Creates a new project service.
    pub fn new(deps: &ServiceDeps) -> Self {
        Self {
            projects: deps.repos.projects.clone(),
            roles: deps.roles.clone(),
            rbac: deps.rbac,
        }
    }

    /// Creates a project owned by the caller.
    pub async fn create_project(
        &self,
        ctx: &RequestContext,
        req: CreateProjectRequest,
    ) -> Result<Project, AppError> {
        let name = normalize_name("Project", &req.name)?;
        let project = self
            .projects
            .create(&CreateProject {
                name,
                owner_id: ctx.user_id,
                is_public: req.is_public,
            })
            .await?;

        info!(
            user_id = %ctx.user_id,
            project_id = %project.id,
            is_public = project.is_public,
            "Project created"
        );

        Ok(project)
    }

    /// Gets a project the caller can see.
    pub async fn get_project(
        &self,
        ctx: &RequestContext,
        project_id: ProjectId,
    ) -> Result<ProjectView, AppError> {
        let project = self.roles.project(project_id).await?;
        let role = self.roles.role_in(&project, ctx.user_id).await?;
        self.rbac.require(role, ProjectCapability::ViewProject)?;
        Ok(ProjectView { project, role })
    }

    /// Projects the caller owns or is a member of.
    pub async fn list_projects(&self, ctx: &RequestContext) -> Result<Vec<Project>, AppError> {
        self.projects.list_for_user(ctx.user_id).await
    }

    /// Makes a project public or private. Owner only.
    pub async fn set_visibility(
        &self,
        ctx: &RequestContext,
        project_id: ProjectId,
        is_public: bool,
    ) -> Result<Project, AppError> {
        let role = self.roles.role_of(project_id, ctx.user_id).await?;
        self.rbac.require(role, ProjectCapability::ManageProject)?;

        let project = self.projects.set_visibility(project_id, is_public).await?;
        info!(
            user_id = %ctx.user_id,
            project_id = %project_id,
            is_public = is_public,
            "Project visibility changed"
        );
        Ok(project)
    }

    /// Deletes a project with everything in it. Owner only.
    pub async fn delete_project(
        &self,
        ctx: &RequestContext,
        project_id: ProjectId,
    ) -> Result<(), AppError> {
        let role = self.roles.role_of(project_id, ctx.user_id).await?;
        self.rbac.require(role, ProjectCapability::ManageProject)?;

        if !self.projects.delete(project_id).await? {
            return Err(AppError::not_found(format!("Project {project_id} not found")));
        }
        info!(user_id = %ctx.user_id, project_id = %project_id, "Project deleted");
        Ok(())
    }
}
