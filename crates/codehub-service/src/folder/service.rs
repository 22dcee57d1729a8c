//! Folder CRUD with per-resource permission checks.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use codehub_auth::{
    CascadeEngine, CascadeReport, PermissionResolver, ProjectCapability, RbacEnforcer,
    ResourceTree, RoleStore, TreeResource,
};
use codehub_core::error::AppError;
use codehub_core::types::{FolderId, ProjectId};
use codehub_database::repositories::{DocumentRepository, FolderRepository};
use codehub_entity::document::Document;
use codehub_entity::folder::{CreateFolder, Folder};
use codehub_entity::permission::{Action, ResourceRef};

use crate::context::RequestContext;
use crate::deps::ServiceDeps;
use crate::naming::normalize_name;

/// Manages folder CRUD operations.
#[derive(Clone)]
pub struct FolderService {
    folders: Arc<dyn FolderRepository>,
    documents: Arc<dyn DocumentRepository>,
    tree: ResourceTree,
    resolver: Arc<PermissionResolver>,
    cascade: Arc<CascadeEngine>,
    roles: RoleStore,
    rbac: RbacEnforcer,
}

/// Request to create a new folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFolderRequest {
    /// Owning project.
    pub project_id: ProjectId,
    /// Parent folder ID (None for root-level).
    #[serde(default)]
    pub parent_id: Option<FolderId>,
    /// Folder name.
    pub name: String,
}

/// Direct children of a folder or of the project root.
#[derive(Debug, Clone, Serialize)]
pub struct FolderContents {
    /// Child folders.
    pub folders: Vec<Folder>,
    /// Documents directly inside.
    pub documents: Vec<Document>,
}

impl std::fmt::Debug for FolderService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FolderService").finish_non_exhaustive()
    }
}

impl FolderService {
    /// Creates a new folder service.
    pub fn new(deps: &ServiceDeps) -> Self {
        Self {
            folders: deps.repos.folders.clone(),
            documents: deps.repos.documents.clone(),
            tree: deps.tree.clone(),
            resolver: deps.resolver.clone(),
            cascade: deps.cascade.clone(),
            roles: deps.roles.clone(),
            rbac: deps.rbac,
        }
    }

    /// Creates a folder. Needs write on the parent, or the create-at-root
    /// capability for root-level folders.
    pub async fn create_folder(
        &self,
        ctx: &RequestContext,
        req: CreateFolderRequest,
    ) -> Result<Folder, AppError> {
        let name = normalize_name("Folder", &req.name)?;
        self.require_placement(ctx, req.project_id, req.parent_id)
            .await?;
        self.tree
            .validate_parent(req.project_id, req.parent_id)
            .await?;

        let folder = self
            .folders
            .create(&CreateFolder {
                project_id: req.project_id,
                parent_id: req.parent_id,
                name,
                owner_id: ctx.user_id,
            })
            .await?;

        info!(
            user_id = %ctx.user_id,
            project_id = %folder.project_id,
            folder_id = %folder.id,
            parent_id = ?folder.parent_id,
            "Folder created"
        );

        Ok(folder)
    }

    /// Gets a folder by ID.
    pub async fn get_folder(
        &self,
        ctx: &RequestContext,
        folder_id: FolderId,
    ) -> Result<Folder, AppError> {
        self.require_folder(ctx, folder_id, Action::Read).await
    }

    /// Lists the folders and documents directly inside a folder.
    pub async fn list_children(
        &self,
        ctx: &RequestContext,
        folder_id: FolderId,
    ) -> Result<FolderContents, AppError> {
        let folder = self.require_folder(ctx, folder_id, Action::Read).await?;
        self.contents(folder.project_id, Some(folder.id)).await
    }

    /// Lists the root level of a project.
    pub async fn list_root(
        &self,
        ctx: &RequestContext,
        project_id: ProjectId,
    ) -> Result<FolderContents, AppError> {
        let role = self.roles.role_of(project_id, ctx.user_id).await?;
        self.rbac.require(role, ProjectCapability::ViewProject)?;
        self.contents(project_id, None).await
    }

    /// Breadcrumbs from the project root down to and including the folder.
    pub async fn folder_path(
        &self,
        ctx: &RequestContext,
        folder_id: FolderId,
    ) -> Result<Vec<Folder>, AppError> {
        let folder = self.require_folder(ctx, folder_id, Action::Read).await?;
        let mut path = self.tree.path_to(ResourceRef::Folder(folder_id)).await?;
        path.push(folder);
        Ok(path)
    }

    /// Renames a folder.
    pub async fn rename_folder(
        &self,
        ctx: &RequestContext,
        folder_id: FolderId,
        new_name: &str,
    ) -> Result<Folder, AppError> {
        let name = normalize_name("Folder", new_name)?;
        self.require_folder(ctx, folder_id, Action::Write).await?;

        let folder = self.folders.rename(folder_id, &name).await?;
        info!(
            user_id = %ctx.user_id,
            folder_id = %folder_id,
            name = %folder.name,
            "Folder renamed"
        );
        Ok(folder)
    }

    /// Moves a folder under a new parent (or to the project root).
    ///
    /// Needs write on the folder and on the destination. The ancestor chain
    /// of the destination is re-verified before anything is written, so a
    /// move into the folder's own subtree fails and leaves the tree
    /// unchanged.
    pub async fn move_folder(
        &self,
        ctx: &RequestContext,
        folder_id: FolderId,
        new_parent_id: Option<FolderId>,
    ) -> Result<Folder, AppError> {
        let folder = self.require_folder(ctx, folder_id, Action::Write).await?;
        if folder.parent_id == new_parent_id {
            return Ok(folder);
        }

        self.require_placement(ctx, folder.project_id, new_parent_id)
            .await?;
        self.tree.validate_move(&folder, new_parent_id).await?;

        let moved = self.folders.set_parent(folder_id, new_parent_id).await?;
        info!(
            user_id = %ctx.user_id,
            folder_id = %folder_id,
            from = ?folder.parent_id,
            to = ?new_parent_id,
            "Folder moved"
        );
        Ok(moved)
    }

    /// Deletes a folder with its whole subtree and every override in it.
    ///
    /// An interrupted removal surfaces as a partial-cascade error whose
    /// details list what was removed and what remains.
    pub async fn delete_folder(
        &self,
        ctx: &RequestContext,
        folder_id: FolderId,
    ) -> Result<CascadeReport, AppError> {
        self.require_folder(ctx, folder_id, Action::Delete).await?;

        let report = self.cascade.remove_subtree(folder_id).await?.into_result()?;
        info!(
            user_id = %ctx.user_id,
            folder_id = %folder_id,
            removed = report.applied.len(),
            "Folder deleted"
        );
        Ok(report)
    }

    async fn contents(
        &self,
        project_id: ProjectId,
        parent: Option<FolderId>,
    ) -> Result<FolderContents, AppError> {
        Ok(FolderContents {
            folders: self.folders.list_children(project_id, parent).await?,
            documents: self.documents.list_in_folder(project_id, parent).await?,
        })
    }

    async fn require_folder(
        &self,
        ctx: &RequestContext,
        folder_id: FolderId,
        action: Action,
    ) -> Result<Folder, AppError> {
        match self
            .resolver
            .require(ctx.user_id, ResourceRef::Folder(folder_id), action)
            .await?
        {
            TreeResource::Folder(folder) => Ok(folder),
            TreeResource::Document(_) => Err(AppError::internal(format!(
                "Folder {folder_id} resolved to a document"
            ))),
        }
    }

    /// Placing something under `parent` needs write on it; placing at the
    /// root needs the create-at-root capability.
    async fn require_placement(
        &self,
        ctx: &RequestContext,
        project_id: ProjectId,
        parent: Option<FolderId>,
    ) -> Result<(), AppError> {
        match parent {
            Some(parent_id) => {
                let parent = self.require_folder(ctx, parent_id, Action::Write).await?;
                if parent.project_id != project_id {
                    return Err(AppError::structural_violation(format!(
                        "Folder {parent_id} belongs to another project"
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
