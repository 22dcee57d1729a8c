//! Subtree grants, revokes and retries through the routing layer.

use axum::http::StatusCode;
use serde_json::json;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_subtree_grant_then_revoke() {
    let app = TestApp::new();
    let alice = app.user("alice");
    let bob = app.user("bob");
    let project = app.create_project(&alice, "webapp", false).await;
    app.add_member(&project, &alice, &bob, "editor").await;
    let src = app.create_folder(&alice, &project, None, "src").await;
    let lib = app.create_folder(&alice, &project, Some(&src), "lib").await;
    let deep = app.create_folder(&alice, &project, Some(&lib), "deep").await;
    let util = app
        .create_document(&alice, &project, Some(&deep), "util.js")
        .await;

    let granted = app
        .post(
            &format!("/api/folders/{src}/subtree-permissions"),
            json!({ "user_id": bob.id, "can_edit": true, "can_delete": false }),
            &alice,
        )
        .await;
    assert_eq!(granted.status, StatusCode::OK, "{:?}", granted.body);
    assert_eq!(granted.data()["applied"].as_array().map(Vec::len), Some(4));
    assert_eq!(granted.data()["pending"].as_array().map(Vec::len), Some(0));

    assert_eq!(app.write_document(&bob, &util, "x").await.status, StatusCode::OK);
    assert_eq!(
        app.delete(&format!("/api/documents/{util}"), &bob).await.status,
        StatusCode::FORBIDDEN
    );

    let revoked = app
        .delete(
            &format!("/api/folders/{src}/subtree-permissions/{}", bob.id),
            &alice,
        )
        .await;
    assert_eq!(revoked.status, StatusCode::OK);
    assert_eq!(revoked.data()["applied"].as_array().map(Vec::len), Some(4));

    assert_eq!(
        app.write_document(&bob, &util, "y").await.status,
        StatusCode::FORBIDDEN
    );
}

#[tokio::test]
async fn test_subtree_grant_is_idempotent() {
    let app = TestApp::new();
    let alice = app.user("alice");
    let bob = app.user("bob");
    let project = app.create_project(&alice, "webapp", false).await;
    app.add_member(&project, &alice, &bob, "viewer").await;
    let src = app.create_folder(&alice, &project, None, "src").await;
    app.create_document(&alice, &project, Some(&src), "app.js")
        .await;

    for _ in 0..2 {
        let response = app
            .post(
                &format!("/api/folders/{src}/subtree-permissions"),
                json!({ "user_id": bob.id, "can_edit": true }),
                &alice,
            )
            .await;
        assert_eq!(response.status, StatusCode::OK);
    }

    let listed = app
        .get(&format!("/api/permissions/folder/{src}"), &alice)
        .await;
    assert_eq!(listed.data().as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_retry_applies_listed_resources() {
    let app = TestApp::new();
    let alice = app.user("alice");
    let bob = app.user("bob");
    let project = app.create_project(&alice, "webapp", false).await;
    app.add_member(&project, &alice, &bob, "editor").await;
    let src = app.create_folder(&alice, &project, None, "src").await;
    let doc = app
        .create_document(&alice, &project, Some(&src), "app.js")
        .await;

    let response = app
        .post(
            "/api/cascades/retry",
            json!({
                "project_id": project,
                "operation": "grant",
                "user_id": bob.id,
                "can_edit": true,
                "resources": [{ "type": "document", "id": doc }],
            }),
            &alice,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(app.write_document(&bob, &doc, "x").await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_retry_rejects_foreign_resources() {
    let app = TestApp::new();
    let alice = app.user("alice");
    let bob = app.user("bob");
    let project = app.create_project(&alice, "webapp", false).await;
    let other = app.create_project(&alice, "other", false).await;
    app.add_member(&project, &alice, &bob, "editor").await;
    let foreign = app.create_folder(&alice, &other, None, "x").await;

    let response = app
        .post(
            "/api/cascades/retry",
            json!({
                "project_id": project,
                "operation": "revoke",
                "user_id": bob.id,
                "resources": [{ "type": "folder", "id": foreign }],
            }),
            &alice,
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_retry_needs_resources() {
    let app = TestApp::new();
    let alice = app.user("alice");
    let project = app.create_project(&alice, "webapp", false).await;

    let response = app
        .post(
            "/api/cascades/retry",
            json!({
                "project_id": project,
                "operation": "revoke",
                "user_id": alice.id,
                "resources": [],
            }),
            &alice,
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["details"]["fields"][0], "resources");
}
