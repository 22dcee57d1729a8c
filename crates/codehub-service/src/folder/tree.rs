//! Whole-project tree rendering.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use codehub_auth::{ProjectCapability, RbacEnforcer, RoleStore};
use codehub_core::error::AppError;
use codehub_core::types::{FolderId, ProjectId};
use codehub_database::repositories::{DocumentRepository, FolderRepository};
use codehub_entity::document::Document;
use codehub_entity::folder::{DocumentLeaf, Folder, FolderNode, ProjectTree};

use crate::context::RequestContext;
use crate::deps::ServiceDeps;

/// Builds nested project trees.
#[derive(Clone)]
pub struct TreeService {
    folders: Arc<dyn FolderRepository>,
    documents: Arc<dyn DocumentRepository>,
    roles: RoleStore,
    rbac: RbacEnforcer,
}

impl std::fmt::Debug for TreeService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeService").finish_non_exhaustive()
    }
}

impl TreeService {
    /// Creates a new tree service.
    pub fn new(deps: &ServiceDeps) -> Self {
        Self {
            folders: deps.repos.folders.clone(),
            documents: deps.repos.documents.clone(),
            roles: deps.roles.clone(),
            rbac: deps.rbac,
        }
    }

    /// The complete folder/document tree of a project.
    pub async fn get_project_tree(
        &self,
        ctx: &RequestContext,
        project_id: ProjectId,
    ) -> Result<ProjectTree, AppError> {
        let role = self.roles.role_of(project_id, ctx.user_id).await?;
        self.rbac.require(role, ProjectCapability::ViewProject)?;

        let folders = self.folders.list_by_project(project_id).await?;
        let documents = self.documents.list_by_project(project_id).await?;
        build_tree(project_id, folders, documents)
    }
}

/// Assemble a nested tree from flat rows.
///
/// Folders not reachable from the root (a parent cycle in corrupted data)
/// are reported as a structural violation.
fn build_tree(
    project_id: ProjectId,
    folders: Vec<Folder>,
    documents: Vec<Document>,
) -> Result<ProjectTree, AppError> {
    let total_folders = folders.len() as u64;
    let total_documents = documents.len() as u64;

    let mut children: HashMap<Option<FolderId>, Vec<Folder>> = HashMap::new();
    for folder in folders {
        children.entry(folder.parent_id).or_default().push(folder);
    }
    let mut leaves: HashMap<Option<FolderId>, Vec<DocumentLeaf>> = HashMap::new();
    for document in documents {
        leaves.entry(document.folder_id).or_default().push(DocumentLeaf {
            id: document.id,
            name: document.name,
        });
    }

    let mut visited = HashSet::new();
    let roots = children.remove(&None).unwrap_or_default();
    let nodes = roots
        .into_iter()
        .map(|folder| build_node(folder, &mut children, &mut leaves, &mut visited))
        .collect();

    if visited.len() as u64 != total_folders {
        return Err(AppError::structural_violation(format!(
            "{} folders in project {project_id} are detached from the root",
            total_folders - visited.len() as u64
        )));
    }

    Ok(ProjectTree {
        project_id,
        folders: nodes,
        documents: leaves.remove(&None).unwrap_or_default(),
        total_folders,
        total_documents,
    })
}

fn build_node(
    folder: Folder,
    children: &mut HashMap<Option<FolderId>, Vec<Folder>>,
    leaves: &mut HashMap<Option<FolderId>, Vec<DocumentLeaf>>,
    visited: &mut HashSet<FolderId>,
) -> FolderNode {
    visited.insert(folder.id);
    let nested = children.remove(&Some(folder.id)).unwrap_or_default();
    FolderNode {
        id: folder.id,
        name: folder.name,
        documents: leaves.remove(&Some(folder.id)).unwrap_or_default(),
        children: nested
            .into_iter()
            .map(|child| build_node(child, children, leaves, visited))
            .collect(),
    }
}
