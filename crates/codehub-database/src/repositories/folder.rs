//! Folder repository.

use async_trait::async_trait;
use sqlx::PgPool;

use codehub_core::error::{AppError, ErrorKind};
use codehub_core::result::AppResult;
use codehub_core::types::{FolderId, ProjectId};
use codehub_entity::folder::{CreateFolder, Folder};

/// Storage for folder rows. Structural checks (cycles, project
/// boundaries) happen above this layer, before any write.
#[async_trait]
pub trait FolderRepository: Send + Sync + 'static {
    /// Find a folder by ID.
    async fn find_by_id(&self, id: FolderId) -> AppResult<Option<Folder>>;

    /// Create a folder.
    async fn create(&self, data: &CreateFolder) -> AppResult<Folder>;

    /// Rename a folder.
    async fn rename(&self, id: FolderId, name: &str) -> AppResult<Folder>;

    /// Re-parent a folder (`None` = project root).
    async fn set_parent(&self, id: FolderId, parent_id: Option<FolderId>) -> AppResult<Folder>;

    /// Delete one folder row. Rows below it go with it.
    async fn delete(&self, id: FolderId) -> AppResult<bool>;

    /// Direct child folders of `parent_id` (`None` = project root).
    async fn list_children(
        &self,
        project_id: ProjectId,
        parent_id: Option<FolderId>,
    ) -> AppResult<Vec<Folder>>;

    /// Every folder of a project.
    async fn list_by_project(&self, project_id: ProjectId) -> AppResult<Vec<Folder>>;
}

/// PostgreSQL-backed [`FolderRepository`].
#[derive(Debug, Clone)]
pub struct PgFolderRepository {
    pool: PgPool,
}

impl PgFolderRepository {
    /// Create a new folder repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FolderRepository for PgFolderRepository {
    async fn find_by_id(&self, id: FolderId) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>("SELECT * FROM folders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find folder", e))
    }

    async fn create(&self, data: &CreateFolder) -> AppResult<Folder> {
        sqlx::query_as::<_, Folder>(
            "INSERT INTO folders (id, project_id, parent_id, name, owner_id) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(FolderId::new())
        .bind(data.project_id)
        .bind(data.parent_id)
        .bind(&data.name)
        .bind(data.owner_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create folder", e))
    }

    async fn rename(&self, id: FolderId, name: &str) -> AppResult<Folder> {
        sqlx::query_as::<_, Folder>(
            "UPDATE folders SET name = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to rename folder", e))?
        .ok_or_else(|| AppError::not_found(format!("Folder {id} not found")))
    }

    async fn set_parent(&self, id: FolderId, parent_id: Option<FolderId>) -> AppResult<Folder> {
        sqlx::query_as::<_, Folder>(
            "UPDATE folders SET parent_id = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(parent_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to move folder", e))?
        .ok_or_else(|| AppError::not_found(format!("Folder {id} not found")))
    }

    async fn delete(&self, id: FolderId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM folders WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete folder", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_children(
        &self,
        project_id: ProjectId,
        parent_id: Option<FolderId>,
    ) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders \
             WHERE project_id = $1 AND parent_id IS NOT DISTINCT FROM $2 \
             ORDER BY name ASC",
        )
        .bind(project_id)
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list child folders", e))
    }

    async fn list_by_project(&self, project_id: ProjectId) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>("SELECT * FROM folders WHERE project_id = $1 ORDER BY name ASC")
            .bind(project_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list folders", e))
    }
}
