//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

use codehub_core::types::{FolderId, ProjectId, UserId};
use codehub_entity::membership::MemberRole;
use codehub_entity::permission::{Action, ResourceRef};
use codehub_service::permission::{CascadeOperation, RetryCascadeRequest};

/// Create project request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateProjectBody {
    /// Project name.
    #[validate(length(min = 1, max = 255, message = "must be 1-255 characters"))]
    pub name: String,
    /// Whether non-members may view the project.
    #[serde(default)]
    pub is_public: bool,
}

/// Visibility change request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisibilityBody {
    /// New visibility.
    pub is_public: bool,
}

/// Role change request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeRoleBody {
    /// New role.
    pub role: MemberRole,
}

/// Invitation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateInvitationBody {
    /// The invited user.
    pub invitee_id: UserId,
    /// Role granted on acceptance.
    pub role: MemberRole,
}

/// Create folder request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateFolderBody {
    /// Owning project.
    pub project_id: ProjectId,
    /// Parent folder; omitted or `null` for the project root.
    #[serde(default)]
    pub parent_id: Option<FolderId>,
    /// Folder name.
    #[validate(length(min = 1, max = 255, message = "must be 1-255 characters"))]
    pub name: String,
}

/// Create document request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateDocumentBody {
    /// Owning project.
    pub project_id: ProjectId,
    /// Enclosing folder; omitted or `null` for the project root.
    #[serde(default)]
    pub folder_id: Option<FolderId>,
    /// Document name.
    #[validate(length(min = 1, max = 255, message = "must be 1-255 characters"))]
    pub name: String,
    /// Initial content.
    #[serde(default)]
    pub content: String,
}

/// Rename request for folders and documents.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RenameBody {
    /// New name.
    #[validate(length(min = 1, max = 255, message = "must be 1-255 characters"))]
    pub name: String,
}

/// Folder move request. `parent_id: null` moves to the project root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveFolderBody {
    /// New parent.
    pub parent_id: Option<FolderId>,
}

/// Document move request. `folder_id: null` moves to the project root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveDocumentBody {
    /// New enclosing folder.
    pub folder_id: Option<FolderId>,
}

/// Document content replacement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateContentBody {
    /// Full new content.
    pub content: String,
}

/// Continuation of an interrupted cascade, built from a 207 report's
/// `pending` list.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RetryCascadeBody {
    /// The project the resources belong to.
    pub project_id: ProjectId,
    /// Grant or revoke.
    pub operation: CascadeOperation,
    /// The affected member.
    pub user_id: UserId,
    /// Allow write (grant only).
    #[serde(default)]
    pub can_edit: bool,
    /// Allow delete (grant only).
    #[serde(default)]
    pub can_delete: bool,
    /// Resources still to process.
    #[validate(length(min = 1, message = "must list at least one resource"))]
    pub resources: Vec<ResourceRef>,
}

impl From<RetryCascadeBody> for RetryCascadeRequest {
    fn from(body: RetryCascadeBody) -> Self {
        Self {
            project_id: body.project_id,
            operation: body.operation,
            user_id: body.user_id,
            can_edit: body.can_edit,
            can_delete: body.can_delete,
            resources: body.resources,
        }
    }
}

/// `?action=` query of the check endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckQuery {
    /// Action to evaluate.
    pub action: Action,
}

/// Chat post request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChatMessageBody {
    /// Message text.
    #[validate(length(min = 1, max = 4000, message = "must be 1-4000 characters"))]
    pub body: String,
}
