use async_trait::async_trait;
use chrono::Utc;

use codehub_core::error::AppError;
use codehub_core::result::AppResult;
use codehub_core::types::{FolderId, ProjectId};
use codehub_entity::folder::{CreateFolder, Folder};

use super::MemoryDatabase;
use crate::repositories::FolderRepository;

#[async_trait]
impl FolderRepository for MemoryDatabase {
    async fn find_by_id(&self, id: FolderId) -> AppResult<Option<Folder>> {
        Ok(self.tables.read().await.folders.get(&id).cloned())
    }

    async fn create(&self, data: &CreateFolder) -> AppResult<Folder> {
        let mut tables = self.tables.write().await;
        if !tables.projects.contains_key(&data.project_id) {
            return Err(AppError::not_found(format!(
                "Project {} not found",
                data.project_id
            )));
        }
        if let Some(parent_id) = data.parent_id {
            if !tables.folders.contains_key(&parent_id) {
                return Err(AppError::not_found(format!("Folder {parent_id} not found")));
            }
        }

        let now = Utc::now();
        let folder = Folder {
            id: FolderId::new(),
            project_id: data.project_id,
            parent_id: data.parent_id,
            name: data.name.clone(),
            owner_id: data.owner_id,
            created_at: now,
            updated_at: now,
        };
        tables.folders.insert(folder.id, folder.clone());
        Ok(folder)
    }

    async fn rename(&self, id: FolderId, name: &str) -> AppResult<Folder> {
        let mut tables = self.tables.write().await;
        let folder = tables
            .folders
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Folder {id} not found")))?;
        folder.name = name.to_string();
        folder.updated_at = Utc::now();
        Ok(folder.clone())
    }

    async fn set_parent(&self, id: FolderId, parent_id: Option<FolderId>) -> AppResult<Folder> {
        let mut tables = self.tables.write().await;
        if let Some(parent_id) = parent_id {
            if !tables.folders.contains_key(&parent_id) {
                return Err(AppError::not_found(format!("Folder {parent_id} not found")));
            }
        }
        let folder = tables
            .folders
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Folder {id} not found")))?;
        folder.parent_id = parent_id;
        folder.updated_at = Utc::now();
        Ok(folder.clone())
    }

    async fn delete(&self, id: FolderId) -> AppResult<bool> {
        Ok(self.tables.write().await.remove_folder_cascade(id))
    }

    async fn list_children(
        &self,
        project_id: ProjectId,
        parent_id: Option<FolderId>,
    ) -> AppResult<Vec<Folder>> {
        let tables = self.tables.read().await;
        let mut children: Vec<Folder> = tables
            .folders
            .values()
            .filter(|f| f.project_id == project_id && f.parent_id == parent_id)
            .cloned()
            .collect();
        children.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(children)
    }

    async fn list_by_project(&self, project_id: ProjectId) -> AppResult<Vec<Folder>> {
        let tables = self.tables.read().await;
        let mut folders: Vec<Folder> = tables
            .folders
            .values()
            .filter(|f| f.project_id == project_id)
            .cloned()
            .collect();
        folders.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(folders)
    }
}
