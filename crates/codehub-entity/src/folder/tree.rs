//! Nested tree structures for rendering a whole project.

use codehub_core::types::{DocumentId, FolderId, ProjectId};
use serde::{Deserialize, Serialize};

/// A document shown inside a tree node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentLeaf {
    /// Document ID.
    pub id: DocumentId,
    /// Document name.
    pub name: String,
}

/// A folder with its nested children.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderNode {
    /// Folder ID.
    pub id: FolderId,
    /// Folder name.
    pub name: String,
    /// Documents directly inside this folder.
    pub documents: Vec<DocumentLeaf>,
    /// Child folder nodes.
    pub children: Vec<FolderNode>,
}

/// The full folder/document tree of a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectTree {
    /// The project.
    pub project_id: ProjectId,
    /// Root-level folders.
    pub folders: Vec<FolderNode>,
    /// Documents with no enclosing folder.
    pub documents: Vec<DocumentLeaf>,
    /// Total folders in the tree.
    pub total_folders: u64,
    /// Total documents in the tree.
    pub total_documents: u64,
}
