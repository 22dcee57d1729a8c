//! Document CRUD with per-resource permission checks.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use codehub_auth::{
    OverrideStore, PermissionResolver, ProjectCapability, RbacEnforcer, ResourceTree, RoleStore,
    TreeResource,
};
use codehub_core::error::AppError;
use codehub_core::types::{DocumentId, FolderId, ProjectId};
use codehub_database::repositories::DocumentRepository;
use codehub_entity::document::{CreateDocument, Document};
use codehub_entity::permission::{Action, ResourceRef};

use crate::context::RequestContext;
use crate::deps::ServiceDeps;
use crate::naming::normalize_name;

/// Largest accepted document body, in bytes.
pub const MAX_CONTENT_BYTES: usize = 4 * 1024 * 1024;

/// Manages documents.
#[derive(Clone)]
pub struct DocumentService {
    documents: Arc<dyn DocumentRepository>,
    tree: ResourceTree,
    overrides: OverrideStore,
    resolver: Arc<PermissionResolver>,
    roles: RoleStore,
    rbac: RbacEnforcer,
}

/// Request to create a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDocumentRequest {
    /// Owning project.
    pub project_id: ProjectId,
    /// Enclosing folder (None for root-level).
    #[serde(default)]
    pub folder_id: Option<FolderId>,
    /// Document name.
    pub name: String,
    /// Initial content.
    #[serde(default)]
    pub content: String,
}

impl std::fmt::Debug for DocumentService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentService").finish_non_exhaustive()
    }
}

impl DocumentService {
    /// Creates a new document service.
    pub fn new(deps: &ServiceDeps) -> Self {
        Self {
            documents: deps.repos.documents.clone(),
            tree: deps.tree.clone(),
            overrides: deps.overrides.clone(),
            resolver: deps.resolver.clone(),
            roles: deps.roles.clone(),
            rbac: deps.rbac,
        }
    }

    /// Creates a document. Needs write on the enclosing folder, or the
    /// create-at-root capability for root-level documents.
    pub async fn create_document(
        &self,
        ctx: &RequestContext,
        req: CreateDocumentRequest,
    ) -> Result<Document, AppError> {
        let name = normalize_name("Document", &req.name)?;
        check_content(&req.content)?;
        self.require_placement(ctx, req.project_id, req.folder_id)
            .await?;
        self.tree
            .validate_parent(req.project_id, req.folder_id)
            .await?;

        let document = self
            .documents
            .create(&CreateDocument {
                project_id: req.project_id,
                folder_id: req.folder_id,
                name,
                content: req.content,
                owner_id: ctx.user_id,
            })
            .await?;

        info!(
            user_id = %ctx.user_id,
            project_id = %document.project_id,
            document_id = %document.id,
            folder_id = ?document.folder_id,
            "Document created"
        );

        Ok(document)
    }

    /// Gets a document with its content.
    pub async fn get_document(
        &self,
        ctx: &RequestContext,
        document_id: DocumentId,
    ) -> Result<Document, AppError> {
        self.require_document(ctx, document_id, Action::Read).await
    }

    /// Replaces a document's content.
    pub async fn update_content(
        &self,
        ctx: &RequestContext,
        document_id: DocumentId,
        content: &str,
    ) -> Result<Document, AppError> {
        check_content(content)?;
        self.require_document(ctx, document_id, Action::Write)
            .await?;
        self.documents.update_content(document_id, content).await
    }

    /// Renames a document.
    pub async fn rename_document(
        &self,
        ctx: &RequestContext,
        document_id: DocumentId,
        new_name: &str,
    ) -> Result<Document, AppError> {
        let name = normalize_name("Document", new_name)?;
        self.require_document(ctx, document_id, Action::Write)
            .await?;

        let document = self.documents.rename(document_id, &name).await?;
        info!(
            user_id = %ctx.user_id,
            document_id = %document_id,
            name = %document.name,
            "Document renamed"
        );
        Ok(document)
    }

    /// Moves a document into another folder (or to the project root).
    ///
    /// Needs write on the document and on the destination. Inherited
    /// folder overrides follow the new placement from the next decision on.
    pub async fn move_document(
        &self,
        ctx: &RequestContext,
        document_id: DocumentId,
        folder_id: Option<FolderId>,
    ) -> Result<Document, AppError> {
        let document = self
            .require_document(ctx, document_id, Action::Write)
            .await?;
        if document.folder_id == folder_id {
            return Ok(document);
        }

        self.require_placement(ctx, document.project_id, folder_id)
            .await?;
        self.tree
            .validate_parent(document.project_id, folder_id)
            .await?;

        let moved = self.documents.move_to(document_id, folder_id).await?;
        info!(
            user_id = %ctx.user_id,
            document_id = %document_id,
            from = ?document.folder_id,
            to = ?folder_id,
            "Document moved"
        );
        Ok(moved)
    }

    /// Deletes a document and every override on it.
    pub async fn delete_document(
        &self,
        ctx: &RequestContext,
        document_id: DocumentId,
    ) -> Result<(), AppError> {
        self.require_document(ctx, document_id, Action::Delete)
            .await?;

        let purged = self
            .overrides
            .purge_resource(ResourceRef::Document(document_id))
            .await?;
        if !self.documents.delete(document_id).await? {
            return Err(AppError::not_found(format!("Document {document_id} not found")));
        }

        info!(
            user_id = %ctx.user_id,
            document_id = %document_id,
            overrides_removed = purged,
            "Document deleted"
        );
        Ok(())
    }

    async fn require_document(
        &self,
        ctx: &RequestContext,
        document_id: DocumentId,
        action: Action,
    ) -> Result<Document, AppError> {
        match self
            .resolver
            .require(ctx.user_id, ResourceRef::Document(document_id), action)
            .await?
        {
            TreeResource::Document(document) => Ok(document),
            TreeResource::Folder(_) => Err(AppError::internal(format!(
                "Document {document_id} resolved to a folder"
            ))),
        }
    }

    async fn require_placement(
        &self,
        ctx: &RequestContext,
        project_id: ProjectId,
        folder_id: Option<FolderId>,
    ) -> Result<(), AppError> {
        match folder_id {
            Some(folder_id) => {
                let target = self
                    .resolver
                    .require(ctx.user_id, ResourceRef::Folder(folder_id), Action::Write)
                    .await?;
                if target.project_id() != project_id {
                    return Err(AppError::structural_violation(format!(
                        "Folder {folder_id} belongs to another project"
                    )));
                }
                Ok(())
            }
            None => {
                let role = self.roles.role_of(project_id, ctx.user_id).await?;
                self.rbac.require(role, ProjectCapability::CreateAtRoot)
            }
        }
    }
}

fn check_content(content: &str) -> Result<(), AppError> {
    if content.len() > MAX_CONTENT_BYTES {
        return Err(AppError::validation(format!(
            "Document content exceeds {MAX_CONTENT_BYTES} bytes"
        )));
    }
    Ok(())
}
