//! Membership entity model.

use chrono::{DateTime, Utc};
use codehub_core::types::{ProjectId, UserId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::role::MemberRole;

/// A user's coarse role inside one project. Unique per `(project_id, user_id)`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Membership {
    /// The project.
    pub project_id: ProjectId,
    /// The member.
    pub user_id: UserId,
    /// The member's role.
    pub role: MemberRole,
    /// When the membership was created.
    pub created_at: DateTime<Utc>,
    /// When the role was last changed.
    pub updated_at: DateTime<Utc>,
}
