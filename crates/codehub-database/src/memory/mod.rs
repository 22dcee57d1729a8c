//! In-memory implementations of every repository trait.
//!
//! All tables live behind one `tokio::sync::RwLock`, so each repository
//! call is atomic with respect to the others. Deleting a project or a
//! folder removes dependent rows the same way the PostgreSQL foreign keys
//! cascade.

mod chat;
mod document;
mod folder;
mod invitation;
mod membership;
mod permission;
mod project;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::RwLock;

use codehub_core::types::{DocumentId, FolderId, InvitationId, ProjectId, UserId};
use codehub_entity::chat::ChatMessage;
use codehub_entity::document::Document;
use codehub_entity::folder::Folder;
use codehub_entity::membership::{Invitation, Membership};
use codehub_entity::permission::{ResourceOverride, ResourceRef};
use codehub_entity::project::Project;

#[derive(Debug, Default)]
struct Tables {
    projects: HashMap<ProjectId, Project>,
    memberships: HashMap<(ProjectId, UserId), Membership>,
    invitations: HashMap<InvitationId, Invitation>,
    folders: HashMap<FolderId, Folder>,
    documents: HashMap<DocumentId, Document>,
    overrides: HashMap<(ResourceRef, UserId), ResourceOverride>,
    chat: Vec<ChatMessage>,
}

impl Tables {
    /// Remove a folder together with every folder, document, and override
    /// below it.
    fn remove_folder_cascade(&mut self, root: FolderId) -> bool {
        if !self.folders.contains_key(&root) {
            return false;
        }

        let mut doomed = HashSet::from([root]);
        let mut frontier = vec![root];
        while let Some(current) = frontier.pop() {
            for folder in self.folders.values() {
                if folder.parent_id == Some(current) && doomed.insert(folder.id) {
                    frontier.push(folder.id);
                }
            }
        }

        let documents: Vec<DocumentId> = self
            .documents
            .values()
            .filter(|d| d.folder_id.is_some_and(|f| doomed.contains(&f)))
            .map(|d| d.id)
            .collect();
        for id in documents {
            self.remove_document(id);
        }

        for id in &doomed {
            self.folders.remove(id);
        }
        self.overrides.retain(|(resource, _), _| match resource {
            ResourceRef::Folder(id) => !doomed.contains(id),
            ResourceRef::Document(_) => true,
        });
        true
    }

    fn remove_document(&mut self, id: DocumentId) -> bool {
        let existed = self.documents.remove(&id).is_some();
        self.overrides
            .retain(|(resource, _), _| *resource != ResourceRef::Document(id));
        existed
    }
}

/// Process-local database implementing every repository trait.
///
/// Cloning is cheap and clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryDatabase {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryDatabase {
    /// Create an empty database.
    pub fn new() -> Self {
        Self::default()
    }
}
