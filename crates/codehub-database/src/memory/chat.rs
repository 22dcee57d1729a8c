use async_trait::async_trait;
use chrono::Utc;

use codehub_core::result::AppResult;
use codehub_core::types::pagination::{PageRequest, PageResponse};
use codehub_core::types::{ChatMessageId, ProjectId};
use codehub_entity::chat::{ChatMessage, CreateChatMessage};

use super::MemoryDatabase;
use crate::repositories::ChatRepository;

#[async_trait]
impl ChatRepository for MemoryDatabase {
    async fn create(&self, data: &CreateChatMessage) -> AppResult<ChatMessage> {
        let message = ChatMessage {
            id: ChatMessageId::new(),
            project_id: data.project_id,
            author_id: data.author_id,
            body: data.body.clone(),
            created_at: Utc::now(),
        };
        self.tables.write().await.chat.push(message.clone());
        Ok(message)
    }

    async fn list_for_project(
        &self,
        project_id: ProjectId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<ChatMessage>> {
        let tables = self.tables.read().await;
        let newest_first: Vec<&ChatMessage> = tables
            .chat
            .iter()
            .rev()
            .filter(|m| m.project_id == project_id)
            .collect();
        let total = newest_first.len() as u64;
        let items = newest_first
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .cloned()
            .collect();
        Ok(PageResponse::new(items, page, total))
    }
}
