//! Project invitation entity.

use chrono::{DateTime, Utc};
use codehub_core::types::{InvitationId, ProjectId, UserId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::role::MemberRole;

/// Lifecycle state of an invitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "invitation_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    /// Awaiting the invitee's answer.
    Pending,
    /// Accepted; a membership row exists.
    Accepted,
    /// Declined by the invitee.
    Declined,
    /// Withdrawn by a project manager.
    Revoked,
}

/// An offer of membership to a user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Invitation {
    /// Unique invitation identifier.
    pub id: InvitationId,
    /// The project.
    pub project_id: ProjectId,
    /// The invited user.
    pub invitee_id: UserId,
    /// Role granted on acceptance.
    pub role: MemberRole,
    /// The owner or admin who sent it.
    pub invited_by: UserId,
    /// Current state.
    pub status: InvitationStatus,
    /// When the invitation was sent.
    pub created_at: DateTime<Utc>,
    /// When the invitee answered, or it was revoked.
    pub responded_at: Option<DateTime<Utc>>,
}

impl Invitation {
    /// Whether the invitation can still be answered.
    pub fn is_pending(&self) -> bool {
        self.status == InvitationStatus::Pending
    }
}

/// Data required to create an invitation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateInvitation {
    /// The project.
    pub project_id: ProjectId,
    /// The invited user.
    pub invitee_id: UserId,
    /// Role granted on acceptance.
    pub role: MemberRole,
    /// The sender.
    pub invited_by: UserId,
}
