//! Project lifecycle and visibility.

use axum::http::StatusCode;
use serde_json::json;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_owner_sees_own_project() {
    let app = TestApp::new();
    let alice = app.user("alice");
    let project = app.create_project(&alice, "webapp", false).await;

    let response = app.get(&format!("/api/projects/{project}"), &alice).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["name"], "webapp");
    assert_eq!(response.data()["role"], "owner");

    let listed = app.get("/api/projects", &alice).await;
    assert_eq!(listed.data().as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_private_project_hidden_from_strangers() {
    let app = TestApp::new();
    let alice = app.user("alice");
    let mallory = app.user("mallory");
    let project = app.create_project(&alice, "secret", false).await;

    let response = app.get(&format!("/api/projects/{project}"), &mallory).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_public_project_readable_not_writable() {
    let app = TestApp::new();
    let alice = app.user("alice");
    let visitor = app.user("visitor");
    let project = app.create_project(&alice, "oss", true).await;
    let readme = app
        .create_document(&alice, &project, None, "README.md")
        .await;

    let response = app.get(&format!("/api/projects/{project}"), &visitor).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["role"], "viewer");

    let read = app.get(&format!("/api/documents/{readme}"), &visitor).await;
    assert_eq!(read.status, StatusCode::OK);

    let write = app.write_document(&visitor, &readme, "defaced").await;
    assert_eq!(write.status, StatusCode::FORBIDDEN);
    assert_eq!(write.body["details"]["canView"], true);
    assert_eq!(write.body["details"]["canEdit"], false);
}

#[tokio::test]
async fn test_only_owner_changes_visibility() {
    let app = TestApp::new();
    let alice = app.user("alice");
    let bob = app.user("bob");
    let project = app.create_project(&alice, "webapp", false).await;
    app.add_member(&project, &alice, &bob, "admin").await;

    let denied = app
        .put(
            &format!("/api/projects/{project}/visibility"),
            json!({ "is_public": true }),
            &bob,
        )
        .await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);

    let allowed = app
        .put(
            &format!("/api/projects/{project}/visibility"),
            json!({ "is_public": true }),
            &alice,
        )
        .await;
    assert_eq!(allowed.status, StatusCode::OK);
    assert_eq!(allowed.data()["is_public"], true);
}

#[tokio::test]
async fn test_blank_project_name_rejected() {
    let app = TestApp::new();
    let alice = app.user("alice");
    let response = app
        .post("/api/projects", json!({ "name": "" }), &alice)
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION");
}
