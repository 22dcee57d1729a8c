//! Repository traits and their PostgreSQL implementations.

pub mod chat;
pub mod document;
pub mod folder;
pub mod invitation;
pub mod membership;
pub mod permission;
pub mod project;

use std::fmt;
use std::sync::Arc;

use sqlx::PgPool;

use crate::memory::MemoryDatabase;

pub use chat::{ChatRepository, PgChatRepository};
pub use document::{DocumentRepository, PgDocumentRepository};
pub use folder::{FolderRepository, PgFolderRepository};
pub use invitation::{InvitationRepository, PgInvitationRepository};
pub use membership::{MembershipRepository, PgMembershipRepository};
pub use permission::{OverrideRepository, PgOverrideRepository};
pub use project::{PgProjectRepository, ProjectRepository};

/// Every repository the application needs, as trait objects.
#[derive(Clone)]
pub struct Repositories {
    /// Projects.
    pub projects: Arc<dyn ProjectRepository>,
    /// Memberships.
    pub memberships: Arc<dyn MembershipRepository>,
    /// Invitations.
    pub invitations: Arc<dyn InvitationRepository>,
    /// Folders.
    pub folders: Arc<dyn FolderRepository>,
    /// Documents.
    pub documents: Arc<dyn DocumentRepository>,
    /// Folder and document overrides.
    pub overrides: Arc<dyn OverrideRepository>,
    /// Chat history.
    pub chat: Arc<dyn ChatRepository>,
}

impl Repositories {
    /// Repositories backed by a PostgreSQL pool.
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            projects: Arc::new(PgProjectRepository::new(pool.clone())),
            memberships: Arc::new(PgMembershipRepository::new(pool.clone())),
            invitations: Arc::new(PgInvitationRepository::new(pool.clone())),
            folders: Arc::new(PgFolderRepository::new(pool.clone())),
            documents: Arc::new(PgDocumentRepository::new(pool.clone())),
            overrides: Arc::new(PgOverrideRepository::new(pool.clone())),
            chat: Arc::new(PgChatRepository::new(pool)),
        }
    }

    /// Repositories sharing one fresh in-memory database.
    pub fn memory() -> Self {
        Self::from_memory(&MemoryDatabase::new())
    }

    /// Repositories over an existing in-memory database.
    pub fn from_memory(db: &MemoryDatabase) -> Self {
        Self {
            projects: Arc::new(db.clone()),
            memberships: Arc::new(db.clone()),
            invitations: Arc::new(db.clone()),
            folders: Arc::new(db.clone()),
            documents: Arc::new(db.clone()),
            overrides: Arc::new(db.clone()),
            chat: Arc::new(db.clone()),
        }
    }
}

impl fmt::Debug for Repositories {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repositories").finish_non_exhaustive()
    }
}
