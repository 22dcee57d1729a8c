//! Route definitions for the CodeHub HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`; the
//! WebSocket upgrade lives at `/ws`.

use std::time::Duration;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{delete, get, post, put},
};
use tower_http::timeout::TimeoutLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Largest accepted request body. Document content is capped lower by the
/// document service; JSON escaping needs the headroom.
const MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

/// Build the Axum router with all routes and request-level middleware.
pub fn build_router(state: AppState) -> Router {
    let request_timeout = Duration::from_secs(state.config.server.request_timeout_seconds);

    let api_routes = Router::new()
        .merge(project_routes())
        .merge(invitation_routes())
        .merge(folder_routes())
        .merge(document_routes())
        .merge(permission_routes())
        .merge(health_routes())
        .layer(TimeoutLayer::new(request_timeout));

    let ws_routes = Router::new().route("/ws", get(handlers::ws::ws_upgrade));

    Router::new()
        .nest("/api", api_routes)
        .merge(ws_routes)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Projects, members, invitations per project, tree, chat
fn project_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/projects",
            get(handlers::project::list_projects).post(handlers::project::create_project),
        )
        .route(
            "/projects/{id}",
            get(handlers::project::get_project).delete(handlers::project::delete_project),
        )
        .route(
            "/projects/{id}/visibility",
            put(handlers::project::set_visibility),
        )
        .route("/projects/{id}/tree", get(handlers::project::get_tree))
        .route("/projects/{id}/root", get(handlers::project::list_root))
        .route("/projects/{id}/members", get(handlers::member::list_members))
        .route(
            "/projects/{id}/members/{user_id}",
            put(handlers::member::change_role).delete(handlers::member::remove_member),
        )
        .route(
            "/projects/{id}/invitations",
            get(handlers::invitation::list_for_project).post(handlers::invitation::invite),
        )
        .route(
            "/projects/{id}/chat",
            get(handlers::chat::list_messages).post(handlers::chat::post_message),
        )
}

/// Invitations addressed to the caller
fn invitation_routes() -> Router<AppState> {
    Router::new()
        .route("/invitations/mine", get(handlers::invitation::list_mine))
        .route("/invitations/{id}", delete(handlers::invitation::revoke))
        .route("/invitations/{id}/accept", post(handlers::invitation::accept))
        .route("/invitations/{id}/decline", post(handlers::invitation::decline))
}

/// Folder CRUD and subtree overrides
fn folder_routes() -> Router<AppState> {
    Router::new()
        .route("/folders", post(handlers::folder::create_folder))
        .route(
            "/folders/{id}",
            get(handlers::folder::get_folder).delete(handlers::folder::delete_folder),
        )
        .route("/folders/{id}/children", get(handlers::folder::list_children))
        .route("/folders/{id}/path", get(handlers::folder::folder_path))
        .route("/folders/{id}/name", put(handlers::folder::rename_folder))
        .route("/folders/{id}/move", put(handlers::folder::move_folder))
        .route(
            "/folders/{id}/subtree-permissions",
            post(handlers::permission::grant_subtree),
        )
        .route(
            "/folders/{id}/subtree-permissions/{user_id}",
            delete(handlers::permission::revoke_subtree),
        )
}

/// Document CRUD
fn document_routes() -> Router<AppState> {
    Router::new()
        .route("/documents", post(handlers::document::create_document))
        .route(
            "/documents/{id}",
            get(handlers::document::get_document).delete(handlers::document::delete_document),
        )
        .route(
            "/documents/{id}/content",
            put(handlers::document::update_content),
        )
        .route("/documents/{id}/name", put(handlers::document::rename_document))
        .route("/documents/{id}/move", put(handlers::document::move_document))
}

/// Single-resource overrides, introspection, cascade retry
fn permission_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/permissions/{type}/{id}",
            get(handlers::permission::list_overrides).post(handlers::permission::grant),
        )
        .route(
            "/permissions/{type}/{id}/can-edit",
            get(handlers::permission::can_edit),
        )
        .route("/permissions/{type}/{id}/check", get(handlers::permission::check))
        .route(
            "/permissions/{type}/{id}/users/{user_id}",
            delete(handlers::permission::revoke),
        )
        .route("/cascades/retry", post(handlers::permission::retry_cascade))
}

/// Liveness
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
