//! Request context carrying the authenticated user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use codehub_core::types::UserId;

/// Context for the current authenticated request.
///
/// Built by the API layer from the validated bearer token and passed into
/// every service method so that each operation knows *who* is acting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated user's ID.
    pub user_id: UserId,
    /// Display name from the token, possibly empty.
    pub username: String,
    /// IP address of the request origin.
    pub ip_address: String,
    /// User-Agent header value.
    pub user_agent: Option<String>,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(
        user_id: UserId,
        username: String,
        ip_address: String,
        user_agent: Option<String>,
    ) -> Self {
        Self {
            user_id,
            username,
            ip_address,
            user_agent,
            request_time: Utc::now(),
        }
    }

    /// Context for work not triggered by an HTTP request (socket events,
    /// tests).
    pub fn system(user_id: UserId) -> Self {
        Self::new(user_id, String::new(), "internal".to_string(), None)
    }
}
