use async_trait::async_trait;
use chrono::Utc;

use codehub_core::result::AppResult;
use codehub_core::types::{ProjectId, UserId};
use codehub_entity::membership::{MemberRole, Membership};

use super::MemoryDatabase;
use crate::repositories::MembershipRepository;

#[async_trait]
impl MembershipRepository for MemoryDatabase {
    async fn find(&self, project_id: ProjectId, user_id: UserId) -> AppResult<Option<Membership>> {
        Ok(self
            .tables
            .read()
            .await
            .memberships
            .get(&(project_id, user_id))
            .cloned())
    }

    async fn upsert(
        &self,
        project_id: ProjectId,
        user_id: UserId,
        role: MemberRole,
    ) -> AppResult<Membership> {
        let now = Utc::now();
        let mut tables = self.tables.write().await;
        let membership = tables
            .memberships
            .entry((project_id, user_id))
            .and_modify(|m| {
                m.role = role;
                m.updated_at = now;
            })
            .or_insert_with(|| Membership {
                project_id,
                user_id,
                role,
                created_at: now,
                updated_at: now,
            });
        Ok(membership.clone())
    }

    async fn remove(&self, project_id: ProjectId, user_id: UserId) -> AppResult<bool> {
        Ok(self
            .tables
            .write()
            .await
            .memberships
            .remove(&(project_id, user_id))
            .is_some())
    }

    async fn list_for_project(&self, project_id: ProjectId) -> AppResult<Vec<Membership>> {
        let tables = self.tables.read().await;
        let mut members: Vec<Membership> = tables
            .memberships
            .values()
            .filter(|m| m.project_id == project_id)
            .cloned()
            .collect();
        members.sort_by_key(|m| m.created_at);
        Ok(members)
    }
}
