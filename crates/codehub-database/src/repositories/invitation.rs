//! Invitation repository.

use async_trait::async_trait;
use sqlx::PgPool;

use codehub_core::error::{AppError, ErrorKind};
use codehub_core::result::AppResult;
use codehub_core::types::{InvitationId, ProjectId, UserId};
use codehub_entity::membership::{CreateInvitation, Invitation, InvitationStatus};

/// Storage for project invitations.
#[async_trait]
pub trait InvitationRepository: Send + Sync + 'static {
    /// Find an invitation by ID.
    async fn find_by_id(&self, id: InvitationId) -> AppResult<Option<Invitation>>;

    /// The pending invitation for a user in a project, if any.
    async fn find_pending(
        &self,
        project_id: ProjectId,
        invitee_id: UserId,
    ) -> AppResult<Option<Invitation>>;

    /// Create a pending invitation.
    async fn create(&self, data: &CreateInvitation) -> AppResult<Invitation>;

    /// Move an invitation to a terminal status, stamping `responded_at`.
    async fn set_status(&self, id: InvitationId, status: InvitationStatus)
    -> AppResult<Invitation>;

    /// Pending invitations addressed to a user.
    async fn list_pending_for_user(&self, user_id: UserId) -> AppResult<Vec<Invitation>>;

    /// Every invitation of a project.
    async fn list_for_project(&self, project_id: ProjectId) -> AppResult<Vec<Invitation>>;
}

/// PostgreSQL-backed [`InvitationRepository`].
#[derive(Debug, Clone)]
pub struct PgInvitationRepository {
    pool: PgPool,
}

impl PgInvitationRepository {
    /// Create a new invitation repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InvitationRepository for PgInvitationRepository {
    async fn find_by_id(&self, id: InvitationId) -> AppResult<Option<Invitation>> {
        sqlx::query_as::<_, Invitation>("SELECT * FROM invitations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find invitation", e))
    }

    async fn find_pending(
        &self,
        project_id: ProjectId,
        invitee_id: UserId,
    ) -> AppResult<Option<Invitation>> {
        sqlx::query_as::<_, Invitation>(
            "SELECT * FROM invitations \
             WHERE project_id = $1 AND invitee_id = $2 AND status = 'pending'",
        )
        .bind(project_id)
        .bind(invitee_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find pending invitation", e)
        })
    }

    async fn create(&self, data: &CreateInvitation) -> AppResult<Invitation> {
        sqlx::query_as::<_, Invitation>(
            "INSERT INTO invitations (id, project_id, invitee_id, role, invited_by) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(InvitationId::new())
        .bind(data.project_id)
        .bind(data.invitee_id)
        .bind(data.role)
        .bind(data.invited_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some("idx_invitations_one_pending") =>
            {
                AppError::conflict("User already has a pending invitation to this project")
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create invitation", e),
        })
    }

    async fn set_status(
        &self,
        id: InvitationId,
        status: InvitationStatus,
    ) -> AppResult<Invitation> {
        sqlx::query_as::<_, Invitation>(
            "UPDATE invitations SET status = $2, responded_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update invitation", e))?
        .ok_or_else(|| AppError::not_found(format!("Invitation {id} not found")))
    }

    async fn list_pending_for_user(&self, user_id: UserId) -> AppResult<Vec<Invitation>> {
        sqlx::query_as::<_, Invitation>(
            "SELECT * FROM invitations WHERE invitee_id = $1 AND status = 'pending' \
             ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list invitations", e))
    }

    async fn list_for_project(&self, project_id: ProjectId) -> AppResult<Vec<Invitation>> {
        sqlx::query_as::<_, Invitation>(
            "SELECT * FROM invitations WHERE project_id = $1 ORDER BY created_at DESC",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list invitations", e))
    }
}
