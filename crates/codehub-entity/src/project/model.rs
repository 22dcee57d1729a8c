//! Project entity model.

use chrono::{DateTime, Utc};
use codehub_core::types::{ProjectId, UserId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A collaborative project: the root of a folder/document tree.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Project {
    /// Unique project identifier.
    pub id: ProjectId,
    /// Display name.
    pub name: String,
    /// The owner. Holds full power over everything in the project,
    /// independent of any membership row.
    pub owner_id: UserId,
    /// Public projects grant read access to every authenticated user.
    pub is_public: bool,
    /// When the project was created.
    pub created_at: DateTime<Utc>,
    /// When the project was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Whether `user_id` owns this project.
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.owner_id == user_id
    }
}

/// Data required to create a new project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProject {
    /// Display name.
    pub name: String,
    /// The creating user, who becomes the owner.
    pub owner_id: UserId,
    /// Initial visibility.
    pub is_public: bool,
}
