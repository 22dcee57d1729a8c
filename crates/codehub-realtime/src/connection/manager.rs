//! Connection manager: connection lifecycle and inbound message routing.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use codehub_auth::{PermissionResolver, RoleStore};
use codehub_core::config::RealtimeConfig;
use codehub_core::error::{AppError, ErrorKind};
use codehub_core::types::{ConnectionId, DocumentId, ProjectId, UserId};
use codehub_entity::permission::{Action, ResourceRef};
use codehub_service::{ChatService, RequestContext};

use crate::channel::{ChannelName, ChannelRegistry};
use crate::message::{InboundMessage, OutboundMessage};

use super::handle::ConnectionHandle;
use super::pool::ConnectionPool;

/// Manages all active WebSocket connections.
pub struct ConnectionManager {
    /// Connection pool.
    pool: Arc<ConnectionPool>,
    /// Channel registry.
    channels: Arc<ChannelRegistry>,
    /// Decides every join and every code change.
    resolver: Arc<PermissionResolver>,
    /// Project access for project channels.
    roles: RoleStore,
    /// Chat persistence.
    chat: ChatService,
    /// Configuration.
    config: RealtimeConfig,
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("connections", &self.pool.connection_count())
            .field("channels", &self.channels.channel_count())
            .finish()
    }
}

impl ConnectionManager {
    /// Creates a new connection manager.
    pub fn new(
        config: RealtimeConfig,
        channels: Arc<ChannelRegistry>,
        resolver: Arc<PermissionResolver>,
        roles: RoleStore,
        chat: ChatService,
    ) -> Self {
        Self {
            pool: Arc::new(ConnectionPool::new()),
            channels,
            resolver,
            roles,
            chat,
            config,
        }
    }

    /// Registers a new authenticated connection.
    ///
    /// Returns the connection handle and a receiver for outbound messages.
    /// A user over the per-user limit loses their oldest connection.
    pub fn register(
        &self,
        user_id: UserId,
        username: String,
    ) -> (Arc<ConnectionHandle>, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(self.config.channel_buffer_size);
        let handle = Arc::new(ConnectionHandle::new(user_id, username, tx));

        let existing = self.pool.user_connections(user_id);
        if existing.len() >= self.config.max_connections_per_user {
            warn!(
                user_id = %user_id,
                count = existing.len(),
                max = self.config.max_connections_per_user,
                "User at max connections, oldest will be replaced"
            );
            if let Some(oldest) = existing.first() {
                self.unregister(oldest.id);
            }
        }

        self.pool.add(handle.clone());
        info!(conn_id = %handle.id, user_id = %user_id, "WebSocket connection registered");

        (handle, rx)
    }

    /// Unregisters a connection and drops its subscriptions.
    pub fn unregister(&self, conn_id: ConnectionId) {
        if let Some(handle) = self.pool.remove(conn_id) {
            handle.mark_dead();
            self.channels.unsubscribe_all(conn_id);
            info!(
                conn_id = %conn_id,
                user_id = %handle.user_id,
                "WebSocket connection unregistered"
            );
        }
    }

    /// Processes an inbound message from a client.
    pub async fn handle_inbound(&self, conn_id: ConnectionId, raw_message: &str) {
        let Some(handle) = self.pool.get(conn_id) else {
            warn!(conn_id = %conn_id, "Message from unknown connection");
            return;
        };
        handle.touch().await;

        let msg: InboundMessage = match serde_json::from_str(raw_message) {
            Ok(m) => m,
            Err(e) => {
                handle.send(&OutboundMessage::Error {
                    code: "INVALID_MESSAGE".to_string(),
                    message: format!("Failed to parse message: {e}"),
                });
                return;
            }
        };

        match msg {
            InboundMessage::JoinDocument { document_id } => {
                self.join_document(&handle, document_id).await;
            }
            InboundMessage::LeaveDocument { document_id } => {
                self.leave(&handle, ChannelName::Document(document_id));
            }
            InboundMessage::JoinProject { project_id } => {
                self.join_project(&handle, project_id).await;
            }
            InboundMessage::LeaveProject { project_id } => {
                self.leave(&handle, ChannelName::Project(project_id));
            }
            InboundMessage::CodeChange {
                document_id,
                change,
            } => {
                self.code_change(&handle, document_id, change).await;
            }
            InboundMessage::Chat { project_id, body } => {
                self.post_chat(&handle, project_id, &body).await;
            }
            InboundMessage::Pong => {
                handle.record_pong().await;
            }
        }
    }

    /// Joins a document channel when the user can read the document.
    async fn join_document(&self, handle: &ConnectionHandle, document_id: DocumentId) {
        let resource = ResourceRef::Document(document_id);
        match self.resolver.decide(handle.user_id, resource, Action::Read).await {
            Ok(decision) if decision.is_allowed() => {
                self.subscribe(handle, ChannelName::Document(document_id));
            }
            Ok(_) => {
                handle.send(&not_found(resource));
            }
            Err(e) => {
                handle.send(&error_message(&e));
            }
        }
    }

    /// Joins a project channel when the user has project access.
    async fn join_project(&self, handle: &ConnectionHandle, project_id: ProjectId) {
        match self.roles.role_of(project_id, handle.user_id).await {
            Ok(role) if role.has_access() => {
                self.subscribe(handle, ChannelName::Project(project_id));
            }
            Ok(_) => {
                handle.send(&OutboundMessage::Error {
                    code: ErrorKind::NotFound.to_string(),
                    message: format!("Project {project_id} not found"),
                });
            }
            Err(e) => {
                handle.send(&error_message(&e));
            }
        }
    }

    fn subscribe(&self, handle: &ConnectionHandle, channel: ChannelName) {
        if !self.channels.is_subscribed(channel, handle.id)
            && self.channels.subscription_count(handle.id)
                >= self.config.max_subscriptions_per_connection
        {
            handle.send(&OutboundMessage::Error {
                code: "MAX_SUBSCRIPTIONS".to_string(),
                message: format!(
                    "Maximum subscriptions ({}) reached",
                    self.config.max_subscriptions_per_connection
                ),
            });
            return;
        }

        self.channels.subscribe(channel, handle.id);
        handle.send(&OutboundMessage::Joined {
            channel: channel.to_string(),
        });
        debug!(conn_id = %handle.id, channel = %channel, "Joined channel");
    }

    fn leave(&self, handle: &ConnectionHandle, channel: ChannelName) {
        self.channels.unsubscribe(channel, handle.id);
        handle.send(&OutboundMessage::Left {
            channel: channel.to_string(),
        });
        debug!(conn_id = %handle.id, channel = %channel, "Left channel");
    }

    /// Relays a change after re-checking write permission for this very
    /// event. A denied change is answered with the current hints; a sender
    /// who lost read access is also dropped from the channel.
    async fn code_change(
        &self,
        handle: &ConnectionHandle,
        document_id: DocumentId,
        change: serde_json::Value,
    ) {
        let channel = ChannelName::Document(document_id);
        if !self.channels.is_subscribed(channel, handle.id) {
            handle.send(&OutboundMessage::Error {
                code: "NOT_JOINED".to_string(),
                message: format!("Join {channel} before sending changes"),
            });
            return;
        }

        let resource = ResourceRef::Document(document_id);
        let decision = match self
            .resolver
            .decide(handle.user_id, resource, Action::Write)
            .await
        {
            Ok(decision) => decision,
            Err(e) => {
                if e.is(ErrorKind::NotFound) {
                    self.channels.unsubscribe(channel, handle.id);
                }
                handle.send(&error_message(&e));
                return;
            }
        };

        if !decision.is_allowed() {
            let hints = match self.resolver.hints(handle.user_id, resource).await {
                Ok(hints) => hints,
                Err(e) => {
                    handle.send(&error_message(&e));
                    return;
                }
            };
            if !hints.can_view {
                self.channels.unsubscribe(channel, handle.id);
            }
            debug!(
                conn_id = %handle.id,
                user_id = %handle.user_id,
                document_id = %document_id,
                "Code change rejected"
            );
            handle.send(&OutboundMessage::ChangeRejected {
                document_id,
                can_view: hints.can_view,
                can_edit: hints.can_edit,
            });
            return;
        }

        let relayed = OutboundMessage::CodeChange {
            document_id,
            user_id: handle.user_id,
            change,
        };
        self.broadcast(channel, &relayed, Some(handle.id));
    }

    /// Persists a chat message, then broadcasts it to the project channel
    /// (sender included).
    async fn post_chat(&self, handle: &ConnectionHandle, project_id: ProjectId, body: &str) {
        let ctx = RequestContext::new(
            handle.user_id,
            handle.username.clone(),
            "websocket".to_string(),
            None,
        );
        match self.chat.post_message(&ctx, project_id, body).await {
            Ok(message) => {
                let sent = self.broadcast(
                    ChannelName::Project(project_id),
                    &OutboundMessage::Chat { message },
                    None,
                );
                if sent == 0 {
                    debug!(
                        conn_id = %handle.id,
                        project_id = %project_id,
                        "Chat stored, no listeners"
                    );
                }
            }
            Err(e) => {
                handle.send(&error_message(&e));
            }
        }
    }

    /// Sends a message to every subscriber of a channel, optionally
    /// skipping one connection. Returns how many connections accepted it.
    pub fn broadcast(
        &self,
        channel: ChannelName,
        message: &OutboundMessage,
        except: Option<ConnectionId>,
    ) -> usize {
        let payload = message.to_json();
        self.channels
            .subscribers(channel)
            .into_iter()
            .filter(|conn_id| Some(*conn_id) != except)
            .filter_map(|conn_id| self.pool.get(conn_id))
            .filter(|conn| conn.send_raw(payload.clone()))
            .count()
    }

    /// Closes every connection.
    pub fn close_all(&self) {
        for handle in self.pool.all() {
            self.unregister(handle.id);
        }
    }

    /// Number of active connections.
    pub fn connection_count(&self) -> usize {
        self.pool.connection_count()
    }
}

fn error_message(error: &AppError) -> OutboundMessage {
    OutboundMessage::Error {
        code: error.kind.to_string(),
        message: error.message.clone(),
    }
}

fn not_found(resource: ResourceRef) -> OutboundMessage {
    OutboundMessage::Error {
        code: ErrorKind::NotFound.to_string(),
        message: format!("{} {} not found", resource.resource_type(), resource.id()),
    }
}
