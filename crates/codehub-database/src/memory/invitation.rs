use async_trait::async_trait;
use chrono::Utc;

use codehub_core::error::AppError;
use codehub_core::result::AppResult;
use codehub_core::types::{InvitationId, ProjectId, UserId};
use codehub_entity::membership::{CreateInvitation, Invitation, InvitationStatus};

use super::MemoryDatabase;
use crate::repositories::InvitationRepository;

#[async_trait]
impl InvitationRepository for MemoryDatabase {
    async fn find_by_id(&self, id: InvitationId) -> AppResult<Option<Invitation>> {
        Ok(self.tables.read().await.invitations.get(&id).cloned())
    }

    async fn find_pending(
        &self,
        project_id: ProjectId,
        invitee_id: UserId,
    ) -> AppResult<Option<Invitation>> {
        Ok(self
            .tables
            .read()
            .await
            .invitations
            .values()
            .find(|i| i.project_id == project_id && i.invitee_id == invitee_id && i.is_pending())
            .cloned())
    }

    async fn create(&self, data: &CreateInvitation) -> AppResult<Invitation> {
        let mut tables = self.tables.write().await;
        let duplicate = tables.invitations.values().any(|i| {
            i.project_id == data.project_id && i.invitee_id == data.invitee_id && i.is_pending()
        });
        if duplicate {
            return Err(AppError::conflict(
                "User already has a pending invitation to this project",
            ));
        }

        let invitation = Invitation {
            id: InvitationId::new(),
            project_id: data.project_id,
            invitee_id: data.invitee_id,
            role: data.role,
            invited_by: data.invited_by,
            status: InvitationStatus::Pending,
            created_at: Utc::now(),
            responded_at: None,
        };
        tables.invitations.insert(invitation.id, invitation.clone());
        Ok(invitation)
    }

    async fn set_status(
        &self,
        id: InvitationId,
        status: InvitationStatus,
    ) -> AppResult<Invitation> {
        let mut tables = self.tables.write().await;
        let invitation = tables
            .invitations
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Invitation {id} not found")))?;
        invitation.status = status;
        invitation.responded_at = Some(Utc::now());
        Ok(invitation.clone())
    }

    async fn list_pending_for_user(&self, user_id: UserId) -> AppResult<Vec<Invitation>> {
        let tables = self.tables.read().await;
        let mut invitations: Vec<Invitation> = tables
            .invitations
            .values()
            .filter(|i| i.invitee_id == user_id && i.is_pending())
            .cloned()
            .collect();
        invitations.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(invitations)
    }

    async fn list_for_project(&self, project_id: ProjectId) -> AppResult<Vec<Invitation>> {
        let tables = self.tables.read().await;
        let mut invitations: Vec<Invitation> = tables
            .invitations
            .values()
            .filter(|i| i.project_id == project_id)
            .cloned()
            .collect();
        invitations.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(invitations)
    }
}
