//! Override repository: per-user grants on folders and documents.
//!
//! Folder and document overrides live in separate tables with identical
//! shape; every query picks its table from the [`ResourceRef`] variant.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use codehub_core::error::{AppError, ErrorKind};
use codehub_core::result::AppResult;
use codehub_core::types::{ProjectId, UserId};
use codehub_entity::permission::{
    OverrideFlags, ResourceOverride, ResourceRef, ResourceType, UpsertOverride,
};

/// Storage for [`ResourceOverride`] rows. At most one row per
/// `(resource, user)`.
#[async_trait]
pub trait OverrideRepository: Send + Sync + 'static {
    /// The override for `user_id` on exactly `resource`.
    async fn find(
        &self,
        user_id: UserId,
        resource: ResourceRef,
    ) -> AppResult<Option<ResourceOverride>>;

    /// Insert or overwrite an override.
    async fn upsert(&self, data: &UpsertOverride) -> AppResult<ResourceOverride>;

    /// Remove one override. Returns whether a row existed.
    async fn delete(&self, user_id: UserId, resource: ResourceRef) -> AppResult<bool>;

    /// Remove every override on a resource.
    async fn delete_for_resource(&self, resource: ResourceRef) -> AppResult<u64>;

    /// Remove every override a user holds in a project.
    async fn delete_for_member(&self, project_id: ProjectId, user_id: UserId) -> AppResult<u64>;

    /// Every override on a resource.
    async fn list_for_resource(&self, resource: ResourceRef) -> AppResult<Vec<ResourceOverride>>;
}

#[derive(Debug, FromRow)]
struct OverrideRow {
    resource_id: Uuid,
    user_id: UserId,
    project_id: ProjectId,
    can_edit: bool,
    can_delete: bool,
    granted_by: UserId,
    updated_at: DateTime<Utc>,
}

impl OverrideRow {
    fn into_override(self, resource_type: ResourceType) -> ResourceOverride {
        ResourceOverride {
            project_id: self.project_id,
            user_id: self.user_id,
            resource: ResourceRef::new(resource_type, self.resource_id),
            flags: OverrideFlags::new(self.can_edit, self.can_delete),
            granted_by: self.granted_by,
            updated_at: self.updated_at,
        }
    }
}

/// Table and key column for a resource type.
fn table_of(resource_type: ResourceType) -> (&'static str, &'static str) {
    match resource_type {
        ResourceType::Folder => ("folder_overrides", "folder_id"),
        ResourceType::Document => ("document_overrides", "document_id"),
    }
}

const ROW_COLUMNS: &str = "user_id, project_id, can_edit, can_delete, granted_by, updated_at";

/// PostgreSQL-backed [`OverrideRepository`].
#[derive(Debug, Clone)]
pub struct PgOverrideRepository {
    pool: PgPool,
}

impl PgOverrideRepository {
    /// Create a new override repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OverrideRepository for PgOverrideRepository {
    async fn find(
        &self,
        user_id: UserId,
        resource: ResourceRef,
    ) -> AppResult<Option<ResourceOverride>> {
        let resource_type = resource.resource_type();
        let (table, column) = table_of(resource_type);
        let sql = format!(
            "SELECT {column} AS resource_id, {ROW_COLUMNS} FROM {table} \
             WHERE {column} = $1 AND user_id = $2"
        );
        let row = sqlx::query_as::<_, OverrideRow>(&sql)
            .bind(resource.id())
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find override", e))?;
        Ok(row.map(|r| r.into_override(resource_type)))
    }

    async fn upsert(&self, data: &UpsertOverride) -> AppResult<ResourceOverride> {
        let resource_type = data.resource.resource_type();
        let (table, column) = table_of(resource_type);
        let sql = format!(
            "INSERT INTO {table} ({column}, user_id, project_id, can_edit, can_delete, granted_by) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT ({column}, user_id) DO UPDATE SET \
                can_edit = EXCLUDED.can_edit, \
                can_delete = EXCLUDED.can_delete, \
                granted_by = EXCLUDED.granted_by, \
                updated_at = NOW() \
             RETURNING {column} AS resource_id, {ROW_COLUMNS}"
        );
        let row = sqlx::query_as::<_, OverrideRow>(&sql)
            .bind(data.resource.id())
            .bind(data.user_id)
            .bind(data.project_id)
            .bind(data.flags.can_edit)
            .bind(data.flags.can_delete)
            .bind(data.granted_by)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                    AppError::not_found(format!("Resource {} not found", data.resource))
                }
                _ => AppError::with_source(ErrorKind::Database, "Failed to save override", e),
            })?;
        Ok(row.into_override(resource_type))
    }

    async fn delete(&self, user_id: UserId, resource: ResourceRef) -> AppResult<bool> {
        let (table, column) = table_of(resource.resource_type());
        let sql = format!("DELETE FROM {table} WHERE {column} = $1 AND user_id = $2");
        let result = sqlx::query(&sql)
            .bind(resource.id())
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete override", e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_for_resource(&self, resource: ResourceRef) -> AppResult<u64> {
        let (table, column) = table_of(resource.resource_type());
        let sql = format!("DELETE FROM {table} WHERE {column} = $1");
        let result = sqlx::query(&sql)
            .bind(resource.id())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to purge resource overrides", e)
            })?;
        Ok(result.rows_affected())
    }

    async fn delete_for_member(&self, project_id: ProjectId, user_id: UserId) -> AppResult<u64> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let mut removed = 0;
        for resource_type in [ResourceType::Folder, ResourceType::Document] {
            let (table, _) = table_of(resource_type);
            let sql = format!("DELETE FROM {table} WHERE project_id = $1 AND user_id = $2");
            let result = sqlx::query(&sql)
                .bind(project_id)
                .bind(user_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::with_source(
                        ErrorKind::Database,
                        "Failed to purge member overrides",
                        e,
                    )
                })?;
            removed += result.rows_affected();
        }

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit transaction", e)
        })?;
        Ok(removed)
    }

    async fn list_for_resource(&self, resource: ResourceRef) -> AppResult<Vec<ResourceOverride>> {
        let resource_type = resource.resource_type();
        let (table, column) = table_of(resource_type);
        let sql = format!(
            "SELECT {column} AS resource_id, {ROW_COLUMNS} FROM {table} \
             WHERE {column} = $1 ORDER BY updated_at ASC"
        );
        let rows = sqlx::query_as::<_, OverrideRow>(&sql)
            .bind(resource.id())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to list overrides", e)
            })?;
        Ok(rows
            .into_iter()
            .map(|r| r.into_override(resource_type))
            .collect())
    }
}
