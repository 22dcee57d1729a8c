//! Chat history and posting.

use std::sync::Arc;

use tracing::debug;

use codehub_auth::{ProjectCapability, RbacEnforcer, RoleStore};
use codehub_core::error::AppError;
use codehub_core::types::{PageRequest, PageResponse, ProjectId};
use codehub_database::repositories::ChatRepository;
use codehub_entity::chat::{ChatMessage, CreateChatMessage};

use crate::context::RequestContext;
use crate::deps::ServiceDeps;

/// Longest accepted chat message, in characters.
pub const MAX_MESSAGE_CHARS: usize = 4000;

/// Persists and lists chat messages.
#[derive(Clone)]
pub struct ChatService {
    chat: Arc<dyn ChatRepository>,
    roles: RoleStore,
    rbac: RbacEnforcer,
}

impl std::fmt::Debug for ChatService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatService").finish_non_exhaustive()
    }
}

impl ChatService {
    /// Creates a new chat service.
    pub fn new(deps: &ServiceDeps) -> Self {
        Self {
            chat: deps.repos.chat.clone(),
            roles: deps.roles.clone(),
            rbac: deps.rbac,
        }
    }

    /// Posts a message. Only the owner and members may post; public
    /// visitors can read but not write.
    pub async fn post_message(
        &self,
        ctx: &RequestContext,
        project_id: ProjectId,
        body: &str,
    ) -> Result<ChatMessage, AppError> {
        let body = body.trim();
        if body.is_empty() {
            return Err(AppError::validation("Message cannot be empty"));
        }
        if body.chars().count() > MAX_MESSAGE_CHARS {
            return Err(AppError::validation(format!(
                "Message exceeds {MAX_MESSAGE_CHARS} characters"
            )));
        }

        if !self.roles.is_participant(project_id, ctx.user_id).await? {
            let role = self.roles.role_of(project_id, ctx.user_id).await?;
            self.rbac.require(role, ProjectCapability::ViewProject)?;
            return Err(AppError::authorization(
                "Only project members can post messages",
            ));
        }

        let message = self
            .chat
            .create(&CreateChatMessage {
                project_id,
                author_id: ctx.user_id,
                body: body.to_string(),
            })
            .await?;

        debug!(
            user_id = %ctx.user_id,
            project_id = %project_id,
            message_id = %message.id,
            "Chat message posted"
        );
        Ok(message)
    }

    /// Chat history, newest first.
    pub async fn list_messages(
        &self,
        ctx: &RequestContext,
        project_id: ProjectId,
        page: PageRequest,
    ) -> Result<PageResponse<ChatMessage>, AppError> {
        let role = self.roles.role_of(project_id, ctx.user_id).await?;
        self.rbac.require(role, ProjectCapability::ViewProject)?;
        self.chat.list_for_project(project_id, &page.normalized()).await
    }
}
