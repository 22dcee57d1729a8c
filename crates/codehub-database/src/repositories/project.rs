//! Project repository.

use async_trait::async_trait;
use sqlx::PgPool;

use codehub_core::error::{AppError, ErrorKind};
use codehub_core::result::AppResult;
use codehub_core::types::{ProjectId, UserId};
use codehub_entity::project::{CreateProject, Project};

/// Storage for projects.
#[async_trait]
pub trait ProjectRepository: Send + Sync + 'static {
    /// Find a project by ID.
    async fn find_by_id(&self, id: ProjectId) -> AppResult<Option<Project>>;

    /// Create a project.
    async fn create(&self, data: &CreateProject) -> AppResult<Project>;

    /// Change public visibility.
    async fn set_visibility(&self, id: ProjectId, is_public: bool) -> AppResult<Project>;

    /// Delete a project and everything in it.
    async fn delete(&self, id: ProjectId) -> AppResult<bool>;

    /// Projects the user owns or is a member of.
    async fn list_for_user(&self, user_id: UserId) -> AppResult<Vec<Project>>;
}

/// PostgreSQL-backed [`ProjectRepository`].
#[derive(Debug, Clone)]
pub struct PgProjectRepository {
    pool: PgPool,
}

impl PgProjectRepository {
    /// Create a new project repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProjectRepository for PgProjectRepository {
    async fn find_by_id(&self, id: ProjectId) -> AppResult<Option<Project>> {
        sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find project", e))
    }

    async fn create(&self, data: &CreateProject) -> AppResult<Project> {
        sqlx::query_as::<_, Project>(
            "INSERT INTO projects (id, name, owner_id, is_public) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(ProjectId::new())
        .bind(&data.name)
        .bind(data.owner_id)
        .bind(data.is_public)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create project", e))
    }

    async fn set_visibility(&self, id: ProjectId, is_public: bool) -> AppResult<Project> {
        sqlx::query_as::<_, Project>(
            "UPDATE projects SET is_public = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(is_public)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update project visibility", e)
        })?
        .ok_or_else(|| AppError::not_found(format!("Project {id} not found")))
    }

    async fn delete(&self, id: ProjectId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete project", e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_for_user(&self, user_id: UserId) -> AppResult<Vec<Project>> {
        sqlx::query_as::<_, Project>(
            "SELECT p.* FROM projects p \
             WHERE p.owner_id = $1 \
                OR EXISTS (SELECT 1 FROM memberships m \
                           WHERE m.project_id = p.id AND m.user_id = $1) \
             ORDER BY p.created_at ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list projects", e))
    }
}
