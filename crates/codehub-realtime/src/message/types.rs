//! Inbound and outbound WebSocket message type definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use codehub_core::types::{DocumentId, ProjectId, UserId};
use codehub_entity::chat::ChatMessage;

/// Messages sent by the client to the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundMessage {
    /// Join a document's edit channel. Needs read access.
    JoinDocument {
        /// Document to follow.
        document_id: DocumentId,
    },
    /// Leave a document's edit channel.
    LeaveDocument {
        /// Document to stop following.
        document_id: DocumentId,
    },
    /// Join a project's channel. Needs project access.
    JoinProject {
        /// Project to follow.
        project_id: ProjectId,
    },
    /// Leave a project's channel.
    LeaveProject {
        /// Project to stop following.
        project_id: ProjectId,
    },
    /// A content change on a joined document.
    CodeChange {
        /// Edited document.
        document_id: DocumentId,
        /// Editor-specific change payload, relayed untouched.
        change: serde_json::Value,
    },
    /// Post a chat message to a project.
    Chat {
        /// Target project.
        project_id: ProjectId,
        /// Message text.
        body: String,
    },
    /// Pong response to server ping.
    Pong,
}

/// Messages sent by the server to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    /// Channel joined.
    Joined {
        /// Channel name.
        channel: String,
    },
    /// Channel left.
    Left {
        /// Channel name.
        channel: String,
    },
    /// A change by another participant.
    CodeChange {
        /// Edited document.
        document_id: DocumentId,
        /// Author of the change.
        user_id: UserId,
        /// Change payload as sent by the author.
        change: serde_json::Value,
    },
    /// A persisted chat message.
    Chat {
        /// The stored message.
        message: ChatMessage,
    },
    /// The sender's change was not relayed.
    ChangeRejected {
        /// Document the change targeted.
        document_id: DocumentId,
        /// Whether the sender can still read the document.
        can_view: bool,
        /// Whether the sender can write the document.
        can_edit: bool,
    },
    /// Server keepalive.
    Ping {
        /// Send time.
        timestamp: DateTime<Utc>,
    },
    /// Request failed.
    Error {
        /// Machine-readable code.
        code: String,
        /// Human-readable message.
        message: String,
    },
}

impl OutboundMessage {
    /// Serialize for the wire.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"type":"error","code":"SERIALIZATION","message":"{e}"}}"#)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inbound_wire_format() {
        let id = DocumentId::new();
        let raw = format!(
            r#"{{"type":"code_change","document_id":"{id}","change":{{"op":"insert"}}}}"#
        );
        match serde_json::from_str::<InboundMessage>(&raw).unwrap() {
            InboundMessage::CodeChange {
                document_id,
                change,
            } => {
                assert_eq!(document_id, id);
                assert_eq!(change["op"], "insert");
            }
            other => panic!("unexpected message: {other:?}"),
        }

        let pong: InboundMessage = serde_json::from_str(r#"{"type":"pong"}"#).unwrap();
        assert!(matches!(pong, InboundMessage::Pong));
    }

    #[test]
    fn test_change_rejected_wire_format() {
        let msg = OutboundMessage::ChangeRejected {
            document_id: DocumentId::new(),
            can_view: true,
            can_edit: false,
        };
        let value: serde_json::Value = serde_json::from_str(&msg.to_json()).unwrap();
        assert_eq!(value["type"], "change_rejected");
        assert_eq!(value["can_view"], true);
        assert_eq!(value["can_edit"], false);
    }
}
