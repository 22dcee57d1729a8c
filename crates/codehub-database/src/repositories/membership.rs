//! Membership repository.

use async_trait::async_trait;
use sqlx::PgPool;

use codehub_core::error::{AppError, ErrorKind};
use codehub_core::result::AppResult;
use codehub_core::types::{ProjectId, UserId};
use codehub_entity::membership::{MemberRole, Membership};

/// Storage for `(project, user) -> role` rows.
#[async_trait]
pub trait MembershipRepository: Send + Sync + 'static {
    /// Find a user's membership in a project.
    async fn find(&self, project_id: ProjectId, user_id: UserId) -> AppResult<Option<Membership>>;

    /// Insert a membership or change its role.
    async fn upsert(
        &self,
        project_id: ProjectId,
        user_id: UserId,
        role: MemberRole,
    ) -> AppResult<Membership>;

    /// Remove a membership. Returns whether a row existed.
    async fn remove(&self, project_id: ProjectId, user_id: UserId) -> AppResult<bool>;

    /// All members of a project.
    async fn list_for_project(&self, project_id: ProjectId) -> AppResult<Vec<Membership>>;
}

/// PostgreSQL-backed [`MembershipRepository`].
#[derive(Debug, Clone)]
pub struct PgMembershipRepository {
    pool: PgPool,
}

impl PgMembershipRepository {
    /// Create a new membership repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MembershipRepository for PgMembershipRepository {
    async fn find(&self, project_id: ProjectId, user_id: UserId) -> AppResult<Option<Membership>> {
        sqlx::query_as::<_, Membership>(
            "SELECT * FROM memberships WHERE project_id = $1 AND user_id = $2",
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find membership", e))
    }

    async fn upsert(
        &self,
        project_id: ProjectId,
        user_id: UserId,
        role: MemberRole,
    ) -> AppResult<Membership> {
        sqlx::query_as::<_, Membership>(
            "INSERT INTO memberships (project_id, user_id, role) VALUES ($1, $2, $3) \
             ON CONFLICT (project_id, user_id) \
             DO UPDATE SET role = EXCLUDED.role, updated_at = NOW() \
             RETURNING *",
        )
        .bind(project_id)
        .bind(user_id)
        .bind(role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to save membership", e))
    }

    async fn remove(&self, project_id: ProjectId, user_id: UserId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM memberships WHERE project_id = $1 AND user_id = $2")
            .bind(project_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to remove membership", e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_for_project(&self, project_id: ProjectId) -> AppResult<Vec<Membership>> {
        sqlx::query_as::<_, Membership>(
            "SELECT * FROM memberships WHERE project_id = $1 ORDER BY created_at ASC",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list members", e))
    }
}
