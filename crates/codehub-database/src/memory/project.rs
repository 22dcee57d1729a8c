use async_trait::async_trait;
use chrono::Utc;

use codehub_core::error::AppError;
use codehub_core::result::AppResult;
use codehub_core::types::{ProjectId, UserId};
use codehub_entity::project::{CreateProject, Project};

use super::MemoryDatabase;
use crate::repositories::ProjectRepository;

#[async_trait]
impl ProjectRepository for MemoryDatabase {
    async fn find_by_id(&self, id: ProjectId) -> AppResult<Option<Project>> {
        Ok(self.tables.read().await.projects.get(&id).cloned())
    }

    async fn create(&self, data: &CreateProject) -> AppResult<Project> {
        let now = Utc::now();
        let project = Project {
            id: ProjectId::new(),
            name: data.name.clone(),
            owner_id: data.owner_id,
            is_public: data.is_public,
            created_at: now,
            updated_at: now,
        };
        self.tables
            .write()
            .await
            .projects
            .insert(project.id, project.clone());
        Ok(project)
    }

    async fn set_visibility(&self, id: ProjectId, is_public: bool) -> AppResult<Project> {
        let mut tables = self.tables.write().await;
        let project = tables
            .projects
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Project {id} not found")))?;
        project.is_public = is_public;
        project.updated_at = Utc::now();
        Ok(project.clone())
    }

    async fn delete(&self, id: ProjectId) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.projects.remove(&id).is_none() {
            return Ok(false);
        }
        tables.memberships.retain(|(project_id, _), _| *project_id != id);
        tables.invitations.retain(|_, inv| inv.project_id != id);
        tables.folders.retain(|_, f| f.project_id != id);
        tables.documents.retain(|_, d| d.project_id != id);
        tables.overrides.retain(|_, o| o.project_id != id);
        tables.chat.retain(|m| m.project_id != id);
        Ok(true)
    }

    async fn list_for_user(&self, user_id: UserId) -> AppResult<Vec<Project>> {
        let tables = self.tables.read().await;
        let mut projects: Vec<Project> = tables
            .projects
            .values()
            .filter(|p| {
                p.owner_id == user_id || tables.memberships.contains_key(&(p.id, user_id))
            })
            .cloned()
            .collect();
        projects.sort_by_key(|p| p.created_at);
        Ok(projects)
    }
}
