//! Document repository.

use async_trait::async_trait;
use sqlx::PgPool;

use codehub_core::error::{AppError, ErrorKind};
use codehub_core::result::AppResult;
use codehub_core::types::{DocumentId, FolderId, ProjectId};
use codehub_entity::document::{CreateDocument, Document};

/// Storage for document rows.
#[async_trait]
pub trait DocumentRepository: Send + Sync + 'static {
    /// Find a document by ID.
    async fn find_by_id(&self, id: DocumentId) -> AppResult<Option<Document>>;

    /// Create a document.
    async fn create(&self, data: &CreateDocument) -> AppResult<Document>;

    /// Rename a document.
    async fn rename(&self, id: DocumentId, name: &str) -> AppResult<Document>;

    /// Move a document to another folder (`None` = project root).
    async fn move_to(&self, id: DocumentId, folder_id: Option<FolderId>) -> AppResult<Document>;

    /// Replace a document's content.
    async fn update_content(&self, id: DocumentId, content: &str) -> AppResult<Document>;

    /// Delete a document.
    async fn delete(&self, id: DocumentId) -> AppResult<bool>;

    /// Documents directly inside `folder_id` (`None` = project root).
    async fn list_in_folder(
        &self,
        project_id: ProjectId,
        folder_id: Option<FolderId>,
    ) -> AppResult<Vec<Document>>;

    /// Every document of a project.
    async fn list_by_project(&self, project_id: ProjectId) -> AppResult<Vec<Document>>;
}

/// PostgreSQL-backed [`DocumentRepository`].
#[derive(Debug, Clone)]
pub struct PgDocumentRepository {
    pool: PgPool,
}

impl PgDocumentRepository {
    /// Create a new document repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentRepository for PgDocumentRepository {
    async fn find_by_id(&self, id: DocumentId) -> AppResult<Option<Document>> {
        sqlx::query_as::<_, Document>("SELECT * FROM documents WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find document", e))
    }

    async fn create(&self, data: &CreateDocument) -> AppResult<Document> {
        sqlx::query_as::<_, Document>(
            "INSERT INTO documents (id, project_id, folder_id, name, content, owner_id) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(DocumentId::new())
        .bind(data.project_id)
        .bind(data.folder_id)
        .bind(&data.name)
        .bind(&data.content)
        .bind(data.owner_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create document", e))
    }

    async fn rename(&self, id: DocumentId, name: &str) -> AppResult<Document> {
        sqlx::query_as::<_, Document>(
            "UPDATE documents SET name = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to rename document", e))?
        .ok_or_else(|| AppError::not_found(format!("Document {id} not found")))
    }

    async fn move_to(&self, id: DocumentId, folder_id: Option<FolderId>) -> AppResult<Document> {
        sqlx::query_as::<_, Document>(
            "UPDATE documents SET folder_id = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(folder_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to move document", e))?
        .ok_or_else(|| AppError::not_found(format!("Document {id} not found")))
    }

    async fn update_content(&self, id: DocumentId, content: &str) -> AppResult<Document> {
        sqlx::query_as::<_, Document>(
            "UPDATE documents SET content = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(content)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update document", e))?
        .ok_or_else(|| AppError::not_found(format!("Document {id} not found")))
    }

    async fn delete(&self, id: DocumentId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete document", e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_in_folder(
        &self,
        project_id: ProjectId,
        folder_id: Option<FolderId>,
    ) -> AppResult<Vec<Document>> {
        sqlx::query_as::<_, Document>(
            "SELECT * FROM documents \
             WHERE project_id = $1 AND folder_id IS NOT DISTINCT FROM $2 \
             ORDER BY name ASC",
        )
        .bind(project_id)
        .bind(folder_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list documents", e))
    }

    async fn list_by_project(&self, project_id: ProjectId) -> AppResult<Vec<Document>> {
        sqlx::query_as::<_, Document>(
            "SELECT * FROM documents WHERE project_id = $1 ORDER BY name ASC",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list documents", e))
    }
}
