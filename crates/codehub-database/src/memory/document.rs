use async_trait::async_trait;
use chrono::Utc;

use codehub_core::error::AppError;
use codehub_core::result::AppResult;
use codehub_core::types::{DocumentId, FolderId, ProjectId};
use codehub_entity::document::{CreateDocument, Document};

use super::MemoryDatabase;
use crate::repositories::DocumentRepository;

impl MemoryDatabase {
    async fn modify_document<F>(&self, id: DocumentId, change: F) -> AppResult<Document>
    where
        F: FnOnce(&mut Document) + Send,
    {
        let mut tables = self.tables.write().await;
        let document = tables
            .documents
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Document {id} not found")))?;
        change(document);
        document.updated_at = Utc::now();
        Ok(document.clone())
    }
}

#[async_trait]
impl DocumentRepository for MemoryDatabase {
    async fn find_by_id(&self, id: DocumentId) -> AppResult<Option<Document>> {
        Ok(self.tables.read().await.documents.get(&id).cloned())
    }

    async fn create(&self, data: &CreateDocument) -> AppResult<Document> {
        let mut tables = self.tables.write().await;
        if !tables.projects.contains_key(&data.project_id) {
            return Err(AppError::not_found(format!(
                "Project {} not found",
                data.project_id
            )));
        }
        if let Some(folder_id) = data.folder_id {
            if !tables.folders.contains_key(&folder_id) {
                return Err(AppError::not_found(format!("Folder {folder_id} not found")));
            }
        }

        let now = Utc::now();
        let document = Document {
            id: DocumentId::new(),
            project_id: data.project_id,
            folder_id: data.folder_id,
            name: data.name.clone(),
            content: data.content.clone(),
            owner_id: data.owner_id,
            created_at: now,
            updated_at: now,
        };
        tables.documents.insert(document.id, document.clone());
        Ok(document)
    }

    async fn rename(&self, id: DocumentId, name: &str) -> AppResult<Document> {
        let name = name.to_string();
        self.modify_document(id, move |d| d.name = name).await
    }

    async fn move_to(&self, id: DocumentId, folder_id: Option<FolderId>) -> AppResult<Document> {
        if let Some(folder_id) = folder_id {
            if !self.tables.read().await.folders.contains_key(&folder_id) {
                return Err(AppError::not_found(format!("Folder {folder_id} not found")));
            }
        }
        self.modify_document(id, move |d| d.folder_id = folder_id)
            .await
    }

    async fn update_content(&self, id: DocumentId, content: &str) -> AppResult<Document> {
        let content = content.to_string();
        self.modify_document(id, move |d| d.content = content).await
    }

    async fn delete(&self, id: DocumentId) -> AppResult<bool> {
        Ok(self.tables.write().await.remove_document(id))
    }

    async fn list_in_folder(
        &self,
        project_id: ProjectId,
        folder_id: Option<FolderId>,
    ) -> AppResult<Vec<Document>> {
        let tables = self.tables.read().await;
        let mut documents: Vec<Document> = tables
            .documents
            .values()
            .filter(|d| d.project_id == project_id && d.folder_id == folder_id)
            .cloned()
            .collect();
        documents.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(documents)
    }

    async fn list_by_project(&self, project_id: ProjectId) -> AppResult<Vec<Document>> {
        let tables = self.tables.read().await;
        let mut documents: Vec<Document> = tables
            .documents
            .values()
            .filter(|d| d.project_id == project_id)
            .cloned()
            .collect();
        documents.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(documents)
    }
}
