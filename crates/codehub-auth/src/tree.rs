//! Folder/document hierarchy walks.
//!
//! Folders are stored with parent pointers only. Every walk keeps a visited
//! set so that corrupted data surfaces as a structural violation instead of
//! looping, and every create or move re-verifies the ancestor chain before
//! anything is written.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use serde::Serialize;

use codehub_core::error::AppError;
use codehub_core::result::AppResult;
use codehub_core::types::{DocumentId, FolderId, ProjectId};
use codehub_database::repositories::{DocumentRepository, FolderRepository};
use codehub_entity::document::Document;
use codehub_entity::folder::Folder;
use codehub_entity::permission::ResourceRef;

/// A resolved folder or document.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "resource", rename_all = "lowercase")]
pub enum TreeResource {
    /// A folder row.
    Folder(Folder),
    /// A document row.
    Document(Document),
}

impl TreeResource {
    /// The owning project.
    pub fn project_id(&self) -> ProjectId {
        match self {
            Self::Folder(f) => f.project_id,
            Self::Document(d) => d.project_id,
        }
    }

    /// Reference to this resource.
    pub fn reference(&self) -> ResourceRef {
        match self {
            Self::Folder(f) => ResourceRef::Folder(f.id),
            Self::Document(d) => ResourceRef::Document(d.id),
        }
    }

    /// The enclosing folder (`None` at the project root).
    pub fn parent_folder(&self) -> Option<FolderId> {
        match self {
            Self::Folder(f) => f.parent_id,
            Self::Document(d) => d.folder_id,
        }
    }
}

/// Everything strictly below a folder, in breadth-first order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Subtree {
    /// Descendant folders; parents always precede their children.
    pub folders: Vec<FolderId>,
    /// Documents inside the folder or any descendant folder.
    pub documents: Vec<DocumentId>,
}

impl Subtree {
    /// Number of resources in the subtree.
    pub fn len(&self) -> usize {
        self.folders.len() + self.documents.len()
    }

    /// Whether the subtree is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Read-side view of the project hierarchy.
#[derive(Clone)]
pub struct ResourceTree {
    folders: Arc<dyn FolderRepository>,
    documents: Arc<dyn DocumentRepository>,
}

impl std::fmt::Debug for ResourceTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceTree").finish()
    }
}

impl ResourceTree {
    /// Creates a tree view over the given repositories.
    pub fn new(
        folders: Arc<dyn FolderRepository>,
        documents: Arc<dyn DocumentRepository>,
    ) -> Self {
        Self { folders, documents }
    }

    /// Load a folder, failing with not-found when absent.
    pub async fn folder(&self, id: FolderId) -> AppResult<Folder> {
        self.folders
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Folder {id} not found")))
    }

    /// Load a document, failing with not-found when absent.
    pub async fn document(&self, id: DocumentId) -> AppResult<Document> {
        self.documents
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Document {id} not found")))
    }

    /// Load the row a reference points at.
    pub async fn resolve(&self, resource: ResourceRef) -> AppResult<TreeResource> {
        match resource {
            ResourceRef::Folder(id) => self.folder(id).await.map(TreeResource::Folder),
            ResourceRef::Document(id) => self.document(id).await.map(TreeResource::Document),
        }
    }

    /// Enclosing folders from the immediate parent up to the project root.
    pub async fn ancestors_of(&self, resource: ResourceRef) -> AppResult<Vec<FolderId>> {
        let target = self.resolve(resource).await?;
        let chain = self
            .walk_up(target.project_id(), target.parent_folder())
            .await?;
        Ok(chain.into_iter().map(|f| f.id).collect())
    }

    /// Enclosing folders as rows, root first. Used for breadcrumbs.
    pub async fn path_to(&self, resource: ResourceRef) -> AppResult<Vec<Folder>> {
        let target = self.resolve(resource).await?;
        let mut chain = self
            .walk_up(target.project_id(), target.parent_folder())
            .await?;
        chain.reverse();
        Ok(chain)
    }

    /// Every folder and document strictly below `folder_id`.
    pub async fn descendants_of(&self, folder_id: FolderId) -> AppResult<Subtree> {
        let root = self.folder(folder_id).await?;
        let mut subtree = Subtree::default();
        let mut seen = HashSet::from([root.id]);
        let mut queue = VecDeque::from([root.id]);

        while let Some(current) = queue.pop_front() {
            let documents = self
                .documents
                .list_in_folder(root.project_id, Some(current))
                .await?;
            subtree.documents.extend(documents.into_iter().map(|d| d.id));

            for child in self
                .folders
                .list_children(root.project_id, Some(current))
                .await?
            {
                if !seen.insert(child.id) {
                    return Err(AppError::structural_violation(format!(
                        "Folder {} is reachable twice below {folder_id}",
                        child.id
                    )));
                }
                subtree.folders.push(child.id);
                queue.push_back(child.id);
            }
        }

        Ok(subtree)
    }

    /// Check that a new folder or document may be placed under `parent`
    /// in `project_id`.
    pub async fn validate_parent(
        &self,
        project_id: ProjectId,
        parent: Option<FolderId>,
    ) -> AppResult<()> {
        self.walk_up(project_id, parent).await.map(|_| ())
    }

    /// Check that `folder` may be re-parented under `new_parent` without
    /// creating a cycle or leaving its project.
    pub async fn validate_move(
        &self,
        folder: &Folder,
        new_parent: Option<FolderId>,
    ) -> AppResult<()> {
        let Some(parent_id) = new_parent else {
            return Ok(());
        };
        if parent_id == folder.id {
            return Err(AppError::structural_violation(
                "A folder cannot be moved into itself",
            ));
        }
        let chain = self.walk_up(folder.project_id, Some(parent_id)).await?;
        if chain.iter().any(|ancestor| ancestor.id == folder.id) {
            return Err(AppError::structural_violation(
                "A folder cannot be moved into one of its descendants",
            ));
        }
        Ok(())
    }

    /// Follow parent pointers from `start` to the root, checking that every
    /// folder belongs to `project_id` and that no folder repeats.
    async fn walk_up(
        &self,
        project_id: ProjectId,
        start: Option<FolderId>,
    ) -> AppResult<Vec<Folder>> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut next = start;

        while let Some(id) = next {
            if !seen.insert(id) {
                return Err(AppError::structural_violation(format!(
                    "Folder {id} appears twice in its own ancestor chain"
                )));
            }
            let folder = self.folder(id).await?;
            if folder.project_id != project_id {
                return Err(AppError::structural_violation(format!(
                    "Folder {id} belongs to another project"
                )));
            }
            next = folder.parent_id;
            chain.push(folder);
        }

        Ok(chain)
    }
}
