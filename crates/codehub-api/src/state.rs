//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Instant;

use codehub_auth::JwtDecoder;
use codehub_core::config::AppConfig;
use codehub_realtime::RealtimeEngine;
use codehub_service::{
    ChatService, DocumentService, FolderService, InvitationService, MembershipService,
    PermissionService, ProjectService, ServiceDeps, TreeService,
};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// When the server was started
    pub started_at: Instant,

    // ── Auth ─────────────────────────────────────────────────
    /// Bearer-token validation
    pub jwt_decoder: Arc<JwtDecoder>,

    // ── Engine ───────────────────────────────────────────────
    /// Repositories and the authorization engine
    pub deps: ServiceDeps,

    // ── Services ─────────────────────────────────────────────
    /// Project lifecycle
    pub project_service: Arc<ProjectService>,
    /// Members
    pub membership_service: Arc<MembershipService>,
    /// Invitations
    pub invitation_service: Arc<InvitationService>,
    /// Folders
    pub folder_service: Arc<FolderService>,
    /// Whole-project tree
    pub tree_service: Arc<TreeService>,
    /// Documents
    pub document_service: Arc<DocumentService>,
    /// Overrides, cascades, introspection
    pub permission_service: Arc<PermissionService>,
    /// Project chat
    pub chat_service: Arc<ChatService>,

    // ── Real-time ────────────────────────────────────────────
    /// WebSocket relay
    pub realtime: RealtimeEngine,
}

impl AppState {
    /// Builds every service over `deps`.
    pub fn new(config: AppConfig, deps: ServiceDeps) -> Self {
        let jwt_decoder = Arc::new(JwtDecoder::new(&config.auth));
        let realtime = RealtimeEngine::new(config.realtime.clone(), &deps);

        Self {
            config: Arc::new(config),
            started_at: Instant::now(),
            jwt_decoder,
            project_service: Arc::new(ProjectService::new(&deps)),
            membership_service: Arc::new(MembershipService::new(&deps)),
            invitation_service: Arc::new(InvitationService::new(&deps)),
            folder_service: Arc::new(FolderService::new(&deps)),
            tree_service: Arc::new(TreeService::new(&deps)),
            document_service: Arc::new(DocumentService::new(&deps)),
            permission_service: Arc::new(PermissionService::new(&deps)),
            chat_service: Arc::new(ChatService::new(&deps)),
            realtime,
            deps,
        }
    }
}
