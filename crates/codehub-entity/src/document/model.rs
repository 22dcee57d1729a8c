//! Document entity model.

use chrono::{DateTime, Utc};
use codehub_core::types::{DocumentId, FolderId, ProjectId, UserId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A source document: a leaf of the project tree.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Document {
    /// Unique document identifier.
    pub id: DocumentId,
    /// The owning project.
    pub project_id: ProjectId,
    /// Enclosing folder (`None` = project root).
    pub folder_id: Option<FolderId>,
    /// File name, e.g. `app.js`.
    pub name: String,
    /// Current text content.
    pub content: String,
    /// The creator.
    pub owner_id: UserId,
    /// When the document was created.
    pub created_at: DateTime<Utc>,
    /// When the document was last changed.
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Whether the document sits at the project root.
    pub fn is_root_level(&self) -> bool {
        self.folder_id.is_none()
    }
}

/// Data required to create a new document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDocument {
    /// The owning project.
    pub project_id: ProjectId,
    /// Enclosing folder (`None` = project root).
    pub folder_id: Option<FolderId>,
    /// File name.
    pub name: String,
    /// Initial content.
    pub content: String,
    /// The creator.
    pub owner_id: UserId,
}
