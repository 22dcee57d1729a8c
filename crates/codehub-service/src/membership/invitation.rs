//! Invitation lifecycle: invite, accept, decline, revoke.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use codehub_auth::{ProjectCapability, RbacEnforcer, RoleStore};
use codehub_core::error::AppError;
use codehub_core::types::{InvitationId, ProjectId, UserId};
use codehub_database::repositories::{InvitationRepository, MembershipRepository};
use codehub_entity::membership::{
    CreateInvitation, Invitation, InvitationStatus, MemberRole, Membership, ProjectRole,
};

use crate::context::RequestContext;
use crate::deps::ServiceDeps;

/// Manages invitations into projects.
#[derive(Clone)]
pub struct InvitationService {
    invitations: Arc<dyn InvitationRepository>,
    memberships: Arc<dyn MembershipRepository>,
    roles: RoleStore,
    rbac: RbacEnforcer,
}

/// Request to invite a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateInvitationRequest {
    /// The invited user.
    pub invitee_id: UserId,
    /// Role granted on acceptance.
    pub role: MemberRole,
}

impl std::fmt::Debug for InvitationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvitationService").finish_non_exhaustive()
    }
}

impl InvitationService {
    /// Creates a new invitation service.
    pub fn new(deps: &ServiceDeps) -> Self {
        Self {
            invitations: deps.repos.invitations.clone(),
            memberships: deps.repos.memberships.clone(),
            roles: deps.roles.clone(),
            rbac: deps.rbac,
        }
    }

    /// Invites a user. Only the owner may invite admins.
    pub async fn invite(
        &self,
        ctx: &RequestContext,
        project_id: ProjectId,
        req: CreateInvitationRequest,
    ) -> Result<Invitation, AppError> {
        let project = self.roles.project(project_id).await?;
        let caller = self.roles.role_in(&project, ctx.user_id).await?;
        self.rbac.require(caller, ProjectCapability::ManageMembers)?;

        if req.role == MemberRole::Admin && caller != ProjectRole::Owner {
            return Err(AppError::authorization(
                "Only the project owner can invite admins",
            ));
        }
        if project.is_owned_by(req.invitee_id) {
            return Err(AppError::conflict("The project owner cannot be invited"));
        }
        if self
            .memberships
            .find(project_id, req.invitee_id)
            .await?
            .is_some()
        {
            return Err(AppError::conflict(format!(
                "User {} is already a member",
                req.invitee_id
            )));
        }

        let invitation = self
            .invitations
            .create(&CreateInvitation {
                project_id,
                invitee_id: req.invitee_id,
                role: req.role,
                invited_by: ctx.user_id,
            })
            .await?;

        info!(
            user_id = %ctx.user_id,
            project_id = %project_id,
            invitee_id = %req.invitee_id,
            role = %req.role,
            "Invitation created"
        );

        Ok(invitation)
    }

    /// Accepts a pending invitation addressed to the caller and creates
    /// the membership.
    pub async fn accept(
        &self,
        ctx: &RequestContext,
        invitation_id: InvitationId,
    ) -> Result<Membership, AppError> {
        let invitation = self.pending_for_invitee(ctx, invitation_id).await?;

        let membership = self
            .memberships
            .upsert(invitation.project_id, ctx.user_id, invitation.role)
            .await?;
        self.invitations
            .set_status(invitation_id, InvitationStatus::Accepted)
            .await?;

        info!(
            user_id = %ctx.user_id,
            project_id = %invitation.project_id,
            role = %invitation.role,
            "Invitation accepted"
        );

        Ok(membership)
    }

    /// Declines a pending invitation addressed to the caller.
    pub async fn decline(
        &self,
        ctx: &RequestContext,
        invitation_id: InvitationId,
    ) -> Result<Invitation, AppError> {
        self.pending_for_invitee(ctx, invitation_id).await?;
        let invitation = self
            .invitations
            .set_status(invitation_id, InvitationStatus::Declined)
            .await?;
        info!(user_id = %ctx.user_id, invitation_id = %invitation_id, "Invitation declined");
        Ok(invitation)
    }

    /// Withdraws a pending invitation.
    pub async fn revoke(
        &self,
        ctx: &RequestContext,
        invitation_id: InvitationId,
    ) -> Result<Invitation, AppError> {
        let invitation = self.find(invitation_id).await?;
        let caller = self
            .roles
            .role_of(invitation.project_id, ctx.user_id)
            .await?;
        self.rbac.require(caller, ProjectCapability::ManageMembers)?;
        if !invitation.is_pending() {
            return Err(AppError::conflict("Invitation is no longer pending"));
        }

        let invitation = self
            .invitations
            .set_status(invitation_id, InvitationStatus::Revoked)
            .await?;
        info!(user_id = %ctx.user_id, invitation_id = %invitation_id, "Invitation revoked");
        Ok(invitation)
    }

    /// Every invitation of a project, for managers.
    pub async fn list_for_project(
        &self,
        ctx: &RequestContext,
        project_id: ProjectId,
    ) -> Result<Vec<Invitation>, AppError> {
        let caller = self.roles.role_of(project_id, ctx.user_id).await?;
        self.rbac.require(caller, ProjectCapability::ManageMembers)?;
        self.invitations.list_for_project(project_id).await
    }

    /// Pending invitations addressed to the caller.
    pub async fn list_mine(&self, ctx: &RequestContext) -> Result<Vec<Invitation>, AppError> {
        self.invitations.list_pending_for_user(ctx.user_id).await
    }

    async fn find(&self, invitation_id: InvitationId) -> Result<Invitation, AppError> {
        self.invitations
            .find_by_id(invitation_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Invitation {invitation_id} not found")))
    }

    /// Load an invitation the caller may answer. Invitations addressed to
    /// someone else look absent.
    async fn pending_for_invitee(
        &self,
        ctx: &RequestContext,
        invitation_id: InvitationId,
    ) -> Result<Invitation, AppError> {
        let invitation = self.find(invitation_id).await?;
        if invitation.invitee_id != ctx.user_id {
            return Err(AppError::not_found(format!(
                "Invitation {invitation_id} not found"
            )));
        }
        if !invitation.is_pending() {
            return Err(AppError::conflict(format!(
                "Invitation is already {}",
                status_label(invitation.status)
            )));
        }
        Ok(invitation)
    }
}

fn status_label(status: InvitationStatus) -> &'static str {
    match status {
        InvitationStatus::Pending => "pending",
        InvitationStatus::Accepted => "accepted",
        InvitationStatus::Declined => "declined",
        InvitationStatus::Revoked => "revoked",
    }
}
