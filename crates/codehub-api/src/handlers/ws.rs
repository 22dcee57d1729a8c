//! WebSocket upgrade handler.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use tracing::{info, warn};

use codehub_auth::Claims;
use codehub_realtime::connection::heartbeat::run_heartbeat;

use crate::error::ApiError;
use crate::state::AppState;

/// Query parameter for WebSocket authentication.
#[derive(Debug, serde::Deserialize)]
pub struct WsQuery {
    /// Bearer token.
    pub token: String,
}

/// GET /ws?token={jwt}
pub async fn ws_upgrade(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
) -> Result<Response, ApiError> {
    let claims = state.jwt_decoder.decode(&query.token)?;
    Ok(ws.on_upgrade(move |socket| handle_ws_connection(state, claims, socket)))
}

/// Handles an established WebSocket connection.
async fn handle_ws_connection(state: AppState, claims: Claims, socket: WebSocket) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    let connections = state.realtime.connections.clone();
    let (handle, mut outbound_rx) = connections.register(claims.user_id(), claims.username);
    let conn_id = handle.id;
    let mut shutdown_rx = state.realtime.shutdown_receiver();

    info!(conn_id = %conn_id, user_id = %handle.user_id, "WebSocket connection established");

    let outbound_task = tokio::spawn(async move {
        while let Some(msg) = outbound_rx.recv().await {
            if ws_tx.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
        let _ = ws_tx.close().await;
    });

    // Ends once the connection is marked dead: missed pongs or eviction.
    let mut heartbeat_task = tokio::spawn(run_heartbeat(handle.clone(), state.realtime.heartbeat));

    loop {
        tokio::select! {
            frame = ws_rx.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    connections.handle_inbound(conn_id, text.as_str()).await;
                }
                Some(Ok(Message::Pong(_))) => handle.record_pong().await,
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!(conn_id = %conn_id, error = %e, "WebSocket error");
                    break;
                }
            },
            _ = &mut heartbeat_task => break,
            _ = shutdown_rx.recv() => break,
        }
    }

    heartbeat_task.abort();
    connections.unregister(conn_id);
    outbound_task.abort();

    info!(conn_id = %conn_id, user_id = %handle.user_id, "WebSocket connection closed");
}
