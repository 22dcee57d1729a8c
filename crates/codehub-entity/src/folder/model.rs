//! Folder entity model.

use chrono::{DateTime, Utc};
use codehub_core::types::{FolderId, ProjectId, UserId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A folder in a project's tree.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Folder {
    /// Unique folder identifier.
    pub id: FolderId,
    /// The owning project. Every ancestor shares it.
    pub project_id: ProjectId,
    /// Parent folder (`None` = project root).
    pub parent_id: Option<FolderId>,
    /// Folder name.
    pub name: String,
    /// The creator.
    pub owner_id: UserId,
    /// When the folder was created.
    pub created_at: DateTime<Utc>,
    /// When the folder was last renamed or moved.
    pub updated_at: DateTime<Utc>,
}

impl Folder {
    /// Whether this folder sits directly under the project root.
    pub fn is_root_level(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Data required to create a new folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFolder {
    /// The owning project.
    pub project_id: ProjectId,
    /// Parent folder (`None` = project root).
    pub parent_id: Option<FolderId>,
    /// Folder name.
    pub name: String,
    /// The creator.
    pub owner_id: UserId,
}
