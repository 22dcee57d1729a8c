//! Per-user, per-resource permission overrides.

use chrono::{DateTime, Utc};
use codehub_core::error::AppError;
use codehub_core::types::{DocumentId, FolderId, ProjectId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::action::Action;

/// Kind of resource an override can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    /// A folder.
    Folder,
    /// A document.
    Document,
}

impl ResourceType {
    /// Return the type as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Folder => "folder",
            Self::Document => "document",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "folder" | "folders" => Ok(Self::Folder),
            "document" | "documents" => Ok(Self::Document),
            _ => Err(AppError::validation(format!(
                "Invalid resource type: '{s}'. Expected folder or document"
            ))),
        }
    }
}

/// A typed reference to a folder or a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "lowercase")]
pub enum ResourceRef {
    /// A folder.
    Folder(FolderId),
    /// A document.
    Document(DocumentId),
}

impl ResourceRef {
    /// Build a reference from a type tag and a raw id.
    pub fn new(resource_type: ResourceType, id: Uuid) -> Self {
        match resource_type {
            ResourceType::Folder => Self::Folder(FolderId::from_uuid(id)),
            ResourceType::Document => Self::Document(DocumentId::from_uuid(id)),
        }
    }

    /// The resource's type tag.
    pub fn resource_type(&self) -> ResourceType {
        match self {
            Self::Folder(_) => ResourceType::Folder,
            Self::Document(_) => ResourceType::Document,
        }
    }

    /// The resource's raw id.
    pub fn id(&self) -> Uuid {
        match self {
            Self::Folder(id) => id.into_uuid(),
            Self::Document(id) => id.into_uuid(),
        }
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.resource_type(), self.id())
    }
}

/// The two capabilities an override can grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct OverrideFlags {
    /// Answers `write`.
    pub can_edit: bool,
    /// Answers `delete`.
    pub can_delete: bool,
}

impl OverrideFlags {
    /// Create a flag pair.
    pub fn new(can_edit: bool, can_delete: bool) -> Self {
        Self {
            can_edit,
            can_delete,
        }
    }

    /// Whether these flags permit `action`. Read is never restricted by an
    /// override; it follows project access alone.
    pub fn permits(&self, action: Action) -> bool {
        match action {
            Action::Read => true,
            Action::Write => self.can_edit,
            Action::Delete => self.can_delete,
        }
    }
}

/// An explicit grant for one user on one folder or document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceOverride {
    /// The project the resource belongs to.
    pub project_id: ProjectId,
    /// The user the override applies to.
    pub user_id: UserId,
    /// The target resource.
    pub resource: ResourceRef,
    /// Granted capabilities.
    #[serde(flatten)]
    pub flags: OverrideFlags,
    /// The owner or admin who last wrote it.
    pub granted_by: UserId,
    /// When it was last written.
    pub updated_at: DateTime<Utc>,
}

/// Data required to write an override (insert or overwrite).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertOverride {
    /// The project the resource belongs to.
    pub project_id: ProjectId,
    /// The user the override applies to.
    pub user_id: UserId,
    /// The target resource.
    pub resource: ResourceRef,
    /// Capabilities to grant.
    pub flags: OverrideFlags,
    /// The writer.
    pub granted_by: UserId,
}
