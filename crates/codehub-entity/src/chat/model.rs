//! Chat message entity model.

use chrono::{DateTime, Utc};
use codehub_core::types::{ChatMessageId, ProjectId, UserId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A message posted to a project's chat.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ChatMessage {
    /// Unique message identifier.
    pub id: ChatMessageId,
    /// The project.
    pub project_id: ProjectId,
    /// The author.
    pub author_id: UserId,
    /// Message text.
    pub body: String,
    /// When the message was posted.
    pub created_at: DateTime<Utc>,
}

/// Data required to post a chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateChatMessage {
    /// The project.
    pub project_id: ProjectId,
    /// The author.
    pub author_id: UserId,
    /// Message text.
    pub body: String,
}
