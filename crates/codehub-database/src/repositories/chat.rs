//! Chat message repository.

use async_trait::async_trait;
use sqlx::PgPool;

use codehub_core::error::{AppError, ErrorKind};
use codehub_core::result::AppResult;
use codehub_core::types::pagination::{PageRequest, PageResponse};
use codehub_core::types::{ChatMessageId, ProjectId};
use codehub_entity::chat::{ChatMessage, CreateChatMessage};

/// Storage for project chat history.
#[async_trait]
pub trait ChatRepository: Send + Sync + 'static {
    /// Persist a message.
    async fn create(&self, data: &CreateChatMessage) -> AppResult<ChatMessage>;

    /// Messages of a project, newest first.
    async fn list_for_project(
        &self,
        project_id: ProjectId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<ChatMessage>>;
}

/// PostgreSQL-backed [`ChatRepository`].
#[derive(Debug, Clone)]
pub struct PgChatRepository {
    pool: PgPool,
}

impl PgChatRepository {
    /// Create a new chat repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChatRepository for PgChatRepository {
    async fn create(&self, data: &CreateChatMessage) -> AppResult<ChatMessage> {
        sqlx::query_as::<_, ChatMessage>(
            "INSERT INTO chat_messages (id, project_id, author_id, body) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(ChatMessageId::new())
        .bind(data.project_id)
        .bind(data.author_id)
        .bind(&data.body)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to save chat message", e))
    }

    async fn list_for_project(
        &self,
        project_id: ProjectId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<ChatMessage>> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM chat_messages WHERE project_id = $1")
                .bind(project_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to count chat messages", e)
                })?;

        let messages = sqlx::query_as::<_, ChatMessage>(
            "SELECT * FROM chat_messages WHERE project_id = $1 \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(project_id)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list chat messages", e)
        })?;

        Ok(PageResponse::new(messages, page, total as u64))
    }
}
