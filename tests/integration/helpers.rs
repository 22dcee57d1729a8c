//! Shared test helpers for integration tests.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::{Value, json};
use tower::ServiceExt;

use codehub_api::{build_app, build_state};
use codehub_auth::Claims;
use codehub_core::config::{AppConfig, StorageBackend};
use codehub_core::types::UserId;
use codehub_database::Repositories;

const TEST_SECRET: &str = "integration-test-secret";

/// Test application over a fresh in-memory store.
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
}

/// A user with a signed bearer token.
#[derive(Debug, Clone)]
pub struct TestUser {
    /// User id (the token subject)
    pub id: UserId,
    /// Bearer token
    pub token: String,
}

/// Status and parsed body of a response.
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// The `data` field of a success envelope.
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    /// The `id` inside `data`, as a string.
    pub fn id(&self) -> String {
        self.body["data"]["id"]
            .as_str()
            .expect("response has no data.id")
            .to_string()
    }
}

impl TestApp {
    /// Create a new test application
    pub fn new() -> Self {
        let mut config = AppConfig::default();
        config.database.backend = StorageBackend::Memory;
        config.auth.jwt_secret = TEST_SECRET.to_string();

        let state = build_state(config, Repositories::memory());
        Self {
            router: build_app(state),
        }
    }

    /// Mint a token for a fresh user.
    pub fn user(&self, username: &str) -> TestUser {
        self.user_with_expiry(username, 3600)
    }

    /// Mint a token that expires `expires_in` seconds from now.
    pub fn user_with_expiry(&self, username: &str, expires_in: i64) -> TestUser {
        let id = UserId::new();
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: id,
            username: username.to_string(),
            iat: now,
            exp: now + expires_in,
            iss: None,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .expect("Failed to sign token");
        TestUser { id, token }
    }

    /// Send a request and parse the JSON response.
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }

    /// `GET` as `user`.
    pub async fn get(&self, path: &str, user: &TestUser) -> TestResponse {
        self.request("GET", path, None, Some(&user.token)).await
    }

    /// `POST` as `user`.
    pub async fn post(&self, path: &str, body: Value, user: &TestUser) -> TestResponse {
        self.request("POST", path, Some(body), Some(&user.token))
            .await
    }

    /// `PUT` as `user`.
    pub async fn put(&self, path: &str, body: Value, user: &TestUser) -> TestResponse {
        self.request("PUT", path, Some(body), Some(&user.token))
            .await
    }

    /// `DELETE` as `user`.
    pub async fn delete(&self, path: &str, user: &TestUser) -> TestResponse {
        self.request("DELETE", path, None, Some(&user.token)).await
    }

    /// Create a project owned by `owner` and return its id.
    pub async fn create_project(&self, owner: &TestUser, name: &str, is_public: bool) -> String {
        let response = self
            .post(
                "/api/projects",
                json!({ "name": name, "is_public": is_public }),
                owner,
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.id()
    }

    /// Invite `member` with `role` and accept on their behalf.
    pub async fn add_member(&self, project: &str, owner: &TestUser, member: &TestUser, role: &str) {
        let invited = self
            .post(
                &format!("/api/projects/{project}/invitations"),
                json!({ "invitee_id": member.id, "role": role }),
                owner,
            )
            .await;
        assert_eq!(invited.status, StatusCode::CREATED, "{:?}", invited.body);

        let accepted = self
            .post(
                &format!("/api/invitations/{}/accept", invited.id()),
                json!({}),
                member,
            )
            .await;
        assert_eq!(accepted.status, StatusCode::OK, "{:?}", accepted.body);
    }

    /// Create a folder and return its id.
    pub async fn create_folder(
        &self,
        user: &TestUser,
        project: &str,
        parent: Option<&str>,
        name: &str,
    ) -> String {
        let response = self
            .post(
                "/api/folders",
                json!({ "project_id": project, "parent_id": parent, "name": name }),
                user,
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.id()
    }

    /// Create a document and return its id.
    pub async fn create_document(
        &self,
        user: &TestUser,
        project: &str,
        folder: Option<&str>,
        name: &str,
    ) -> String {
        let response = self
            .post(
                "/api/documents",
                json!({ "project_id": project, "folder_id": folder, "name": name, "content": "" }),
                user,
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.id()
    }

    /// Replace a document's content as `user`.
    pub async fn write_document(
        &self,
        user: &TestUser,
        document: &str,
        content: &str,
    ) -> TestResponse {
        self.put(
            &format!("/api/documents/{document}/content"),
            json!({ "content": content }),
            user,
        )
        .await
    }
}
