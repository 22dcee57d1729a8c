//! Subtree-wide grants, revokes, and removals.
//!
//! A cascade touches every resource in a folder's subtree one write at a
//! time. Writes are not wrapped in a transaction: the first failure stops
//! the cascade and the report lists what was applied and what is still
//! pending, so the caller can retry exactly the pending part with
//! [`CascadeEngine::grant_resources`] or [`CascadeEngine::revoke_resources`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use codehub_core::error::AppError;
use codehub_core::result::AppResult;
use codehub_core::types::{FolderId, ProjectId, UserId};
use codehub_database::repositories::{DocumentRepository, FolderRepository};
use codehub_entity::permission::{OverrideFlags, ResourceRef, UpsertOverride};

use crate::acl::OverrideStore;
use crate::tree::ResourceTree;

/// Outcome of a cascade.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeReport {
    /// Resources the cascade changed, in application order.
    pub applied: Vec<ResourceRef>,
    /// Resources not yet processed when the cascade stopped.
    pub pending: Vec<ResourceRef>,
    /// The error that stopped the cascade.
    pub failure: Option<String>,
}

impl CascadeReport {
    /// Whether every resource was processed.
    pub fn is_complete(&self) -> bool {
        self.failure.is_none() && self.pending.is_empty()
    }

    /// The report itself when complete, otherwise a partial-cascade error
    /// carrying the report as details.
    pub fn into_result(self) -> AppResult<Self> {
        if self.is_complete() {
            return Ok(self);
        }
        let message = format!(
            "Cascade stopped after {} of {} resources: {}",
            self.applied.len(),
            self.applied.len() + self.pending.len(),
            self.failure.as_deref().unwrap_or("unknown failure")
        );
        Err(AppError::partial_cascade(message).with_details(serde_json::to_value(&self)?))
    }
}

#[derive(Debug, Clone, Copy)]
enum CascadeOp {
    Grant {
        project_id: ProjectId,
        user_id: UserId,
        flags: OverrideFlags,
        granted_by: UserId,
    },
    Revoke {
        user_id: UserId,
    },
    Remove,
}

impl CascadeOp {
    fn name(&self) -> &'static str {
        match self {
            Self::Grant { .. } => "grant",
            Self::Revoke { .. } => "revoke",
            Self::Remove => "remove",
        }
    }
}

/// Applies an operation across a folder subtree.
#[derive(Clone)]
pub struct CascadeEngine {
    tree: ResourceTree,
    overrides: OverrideStore,
    folders: Arc<dyn FolderRepository>,
    documents: Arc<dyn DocumentRepository>,
}

impl std::fmt::Debug for CascadeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CascadeEngine").finish()
    }
}

impl CascadeEngine {
    /// Creates a cascade engine.
    pub fn new(
        tree: ResourceTree,
        overrides: OverrideStore,
        folders: Arc<dyn FolderRepository>,
        documents: Arc<dyn DocumentRepository>,
    ) -> Self {
        Self {
            tree,
            overrides,
            folders,
            documents,
        }
    }

    /// Grant `flags` to `user_id` on `folder_id` and everything below it.
    ///
    /// The folder is written first, then descendant folders breadth-first,
    /// then documents.
    pub async fn grant_subtree(
        &self,
        folder_id: FolderId,
        user_id: UserId,
        flags: OverrideFlags,
        granted_by: UserId,
    ) -> AppResult<CascadeReport> {
        let root = self.tree.folder(folder_id).await?;
        let targets = self.subtree_targets(folder_id).await?;
        let op = CascadeOp::Grant {
            project_id: root.project_id,
            user_id,
            flags,
            granted_by,
        };
        Ok(self.run(op, targets).await)
    }

    /// Remove `user_id`'s overrides on `folder_id` and everything below it.
    ///
    /// Only resources that actually held an override appear in `applied`.
    pub async fn revoke_subtree(
        &self,
        folder_id: FolderId,
        user_id: UserId,
    ) -> AppResult<CascadeReport> {
        let targets = self.subtree_targets(folder_id).await?;
        Ok(self.run(CascadeOp::Revoke { user_id }, targets).await)
    }

    /// Grant `flags` on an explicit list of resources, typically the
    /// `pending` list of an earlier report.
    pub async fn grant_resources(
        &self,
        project_id: ProjectId,
        targets: Vec<ResourceRef>,
        user_id: UserId,
        flags: OverrideFlags,
        granted_by: UserId,
    ) -> AppResult<CascadeReport> {
        let op = CascadeOp::Grant {
            project_id,
            user_id,
            flags,
            granted_by,
        };
        Ok(self.run(op, targets).await)
    }

    /// Revoke on an explicit list of resources.
    pub async fn revoke_resources(
        &self,
        targets: Vec<ResourceRef>,
        user_id: UserId,
    ) -> AppResult<CascadeReport> {
        Ok(self.run(CascadeOp::Revoke { user_id }, targets).await)
    }

    /// Delete a folder with every folder and document below it.
    ///
    /// Documents go first, then folders deepest first, then the folder
    /// itself, so no step ever leaves an orphan. Each resource's overrides
    /// are purged before the row is deleted.
    pub async fn remove_subtree(&self, folder_id: FolderId) -> AppResult<CascadeReport> {
        let subtree = self.tree.descendants_of(folder_id).await?;

        let mut targets: Vec<ResourceRef> = Vec::with_capacity(subtree.len() + 1);
        targets.extend(subtree.documents.into_iter().map(ResourceRef::Document));
        targets.extend(subtree.folders.into_iter().rev().map(ResourceRef::Folder));
        targets.push(ResourceRef::Folder(folder_id));

        Ok(self.run(CascadeOp::Remove, targets).await)
    }

    /// The folder, its descendant folders breadth-first, then documents.
    async fn subtree_targets(&self, folder_id: FolderId) -> AppResult<Vec<ResourceRef>> {
        let subtree = self.tree.descendants_of(folder_id).await?;
        let mut targets = Vec::with_capacity(subtree.len() + 1);
        targets.push(ResourceRef::Folder(folder_id));
        targets.extend(subtree.folders.into_iter().map(ResourceRef::Folder));
        targets.extend(subtree.documents.into_iter().map(ResourceRef::Document));
        Ok(targets)
    }

    async fn run(&self, op: CascadeOp, targets: Vec<ResourceRef>) -> CascadeReport {
        let total = targets.len();
        let mut report = CascadeReport::default();
        let mut remaining = targets.into_iter();

        while let Some(resource) = remaining.next() {
            match self.apply(op, resource).await {
                Ok(true) => report.applied.push(resource),
                Ok(false) => {}
                Err(e) => {
                    report.pending.push(resource);
                    report.pending.extend(remaining.by_ref());
                    report.failure = Some(e.to_string());
                    warn!(
                        op = op.name(),
                        resource = %resource,
                        applied = report.applied.len(),
                        pending = report.pending.len(),
                        error = %e,
                        "Cascade stopped early"
                    );
                    return report;
                }
            }
        }

        info!(
            op = op.name(),
            total = total,
            applied = report.applied.len(),
            "Cascade completed"
        );
        report
    }

    /// Apply `op` to one resource. Returns whether anything changed.
    async fn apply(&self, op: CascadeOp, resource: ResourceRef) -> AppResult<bool> {
        match op {
            CascadeOp::Grant {
                project_id,
                user_id,
                flags,
                granted_by,
            } => {
                self.overrides
                    .set(&UpsertOverride {
                        project_id,
                        user_id,
                        resource,
                        flags,
                        granted_by,
                    })
                    .await?;
                Ok(true)
            }
            CascadeOp::Revoke { user_id } => self.overrides.remove(user_id, resource).await,
            CascadeOp::Remove => {
                self.overrides.purge_resource(resource).await?;
                match resource {
                    ResourceRef::Folder(id) => self.folders.delete(id).await,
                    ResourceRef::Document(id) => self.documents.delete(id).await,
                }
            }
        }
    }
}
