//! Explicit per-user grants on single folders or documents.

use std::sync::Arc;

use codehub_core::result::AppResult;
use codehub_core::types::{ProjectId, UserId};
use codehub_database::repositories::OverrideRepository;
use codehub_entity::permission::{OverrideFlags, ResourceOverride, ResourceRef, UpsertOverride};

/// Thin facade over the override repository.
///
/// An override only sets `{can_edit, can_delete}` for one user on one
/// resource; it never changes the user's project role.
#[derive(Clone)]
pub struct OverrideStore {
    repo: Arc<dyn OverrideRepository>,
}

impl std::fmt::Debug for OverrideStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverrideStore").finish()
    }
}

impl OverrideStore {
    /// Creates an override store.
    pub fn new(repo: Arc<dyn OverrideRepository>) -> Self {
        Self { repo }
    }

    /// Flags granted to `user_id` on exactly `resource`.
    pub async fn get(
        &self,
        user_id: UserId,
        resource: ResourceRef,
    ) -> AppResult<Option<OverrideFlags>> {
        Ok(self.repo.find(user_id, resource).await?.map(|o| o.flags))
    }

    /// Write an override; a second write for the same pair replaces the first.
    pub async fn set(&self, entry: &UpsertOverride) -> AppResult<ResourceOverride> {
        self.repo.upsert(entry).await
    }

    /// Remove one override. Returns whether anything was removed.
    pub async fn remove(&self, user_id: UserId, resource: ResourceRef) -> AppResult<bool> {
        self.repo.delete(user_id, resource).await
    }

    /// Remove all overrides on a resource that is about to disappear.
    pub async fn purge_resource(&self, resource: ResourceRef) -> AppResult<u64> {
        self.repo.delete_for_resource(resource).await
    }

    /// Remove all overrides a departing member holds in a project.
    pub async fn purge_member(&self, project_id: ProjectId, user_id: UserId) -> AppResult<u64> {
        self.repo.delete_for_member(project_id, user_id).await
    }

    /// All overrides on a resource.
    pub async fn list(&self, resource: ResourceRef) -> AppResult<Vec<ResourceOverride>> {
        self.repo.list_for_resource(resource).await
    }
}
