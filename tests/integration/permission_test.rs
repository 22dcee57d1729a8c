//! Per-resource decisions through the routing layer.

use axum::http::StatusCode;
use serde_json::json;

use crate::helpers::{TestApp, TestUser};

/// Alice owns the project, Bob is an editor. The tree is
/// `src/app.js`, `src/lib/util.js` and a root-level `readme.md`.
struct Workspace {
    app: TestApp,
    alice: TestUser,
    bob: TestUser,
    src: String,
    lib: String,
    app_js: String,
    util_js: String,
    readme: String,
}

async fn workspace() -> Workspace {
    let app = TestApp::new();
    let alice = app.user("alice");
    let bob = app.user("bob");
    let project = app.create_project(&alice, "webapp", false).await;
    app.add_member(&project, &alice, &bob, "editor").await;

    let src = app.create_folder(&alice, &project, None, "src").await;
    let lib = app.create_folder(&alice, &project, Some(&src), "lib").await;
    let app_js = app
        .create_document(&alice, &project, Some(&src), "app.js")
        .await;
    let util_js = app
        .create_document(&alice, &project, Some(&lib), "util.js")
        .await;
    let readme = app
        .create_document(&alice, &project, None, "readme.md")
        .await;

    Workspace {
        app,
        alice,
        bob,
        src,
        lib,
        app_js,
        util_js,
        readme,
    }
}

#[tokio::test]
async fn test_folder_override_grants_document_write() {
    let ws = workspace().await;

    let before = ws.app.write_document(&ws.bob, &ws.app_js, "v1").await;
    assert_eq!(before.status, StatusCode::FORBIDDEN);
    assert_eq!(before.body["details"]["canView"], true);
    assert_eq!(before.body["details"]["canEdit"], false);

    let granted = ws
        .app
        .post(
            &format!("/api/permissions/folder/{}", ws.src),
            json!({ "user_id": ws.bob.id, "can_edit": true }),
            &ws.alice,
        )
        .await;
    assert_eq!(granted.status, StatusCode::OK, "{:?}", granted.body);

    let after = ws.app.write_document(&ws.bob, &ws.app_js, "v2").await;
    assert_eq!(after.status, StatusCode::OK);
    assert_eq!(after.data()["content"], "v2");

    let root = ws.app.write_document(&ws.bob, &ws.readme, "nope").await;
    assert_eq!(root.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_folder_override_does_not_reach_grandchildren() {
    let ws = workspace().await;
    ws.app
        .post(
            &format!("/api/permissions/folders/{}", ws.src),
            json!({ "user_id": ws.bob.id, "can_edit": true }),
            &ws.alice,
        )
        .await;

    let nested = ws.app.write_document(&ws.bob, &ws.util_js, "x").await;
    assert_eq!(nested.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_document_override_beats_folder_override() {
    let ws = workspace().await;
    ws.app
        .post(
            &format!("/api/permissions/folder/{}", ws.src),
            json!({ "user_id": ws.bob.id, "can_edit": true }),
            &ws.alice,
        )
        .await;
    ws.app
        .post(
            &format!("/api/permissions/document/{}", ws.app_js),
            json!({ "user_id": ws.bob.id, "can_edit": false }),
            &ws.alice,
        )
        .await;

    let check = ws
        .app
        .get(
            &format!("/api/permissions/document/{}/check?action=write", ws.app_js),
            &ws.bob,
        )
        .await;
    assert_eq!(check.status, StatusCode::OK);
    assert_eq!(check.data()["decision"], "deny");
    assert_eq!(check.data()["source"], "resource_override");
}

#[tokio::test]
async fn test_editor_default_covers_root_folders_only() {
    let ws = workspace().await;

    let rename_root = ws
        .app
        .put(
            &format!("/api/folders/{}/name", ws.src),
            json!({ "name": "source" }),
            &ws.bob,
        )
        .await;
    assert_eq!(rename_root.status, StatusCode::OK);

    let rename_nested = ws
        .app
        .put(
            &format!("/api/folders/{}/name", ws.lib),
            json!({ "name": "library" }),
            &ws.bob,
        )
        .await;
    assert_eq!(rename_nested.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_can_edit_introspection() {
    let ws = workspace().await;

    let bob = ws
        .app
        .get(
            &format!("/api/permissions/document/{}/can-edit", ws.app_js),
            &ws.bob,
        )
        .await;
    assert_eq!(bob.status, StatusCode::OK);
    assert_eq!(bob.data()["canEdit"], false);
    assert_eq!(bob.data()["isOwner"], false);
    assert_eq!(bob.data()["role"], "editor");

    let alice = ws
        .app
        .get(
            &format!("/api/permissions/document/{}/can-edit", ws.app_js),
            &ws.alice,
        )
        .await;
    assert_eq!(alice.data()["canEdit"], true);
    assert_eq!(alice.data()["isOwner"], true);

    let stranger = ws.app.user("eve");
    let hidden = ws
        .app
        .get(
            &format!("/api/permissions/document/{}/can-edit", ws.app_js),
            &stranger,
        )
        .await;
    assert_eq!(hidden.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_only_managers_grant() {
    let ws = workspace().await;

    let response = ws
        .app
        .post(
            &format!("/api/permissions/folder/{}", ws.src),
            json!({ "user_id": ws.bob.id, "can_edit": true }),
            &ws.bob,
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_grant_target_must_be_member() {
    let ws = workspace().await;
    let outsider = ws.app.user("outsider");

    let response = ws
        .app
        .post(
            &format!("/api/permissions/folder/{}", ws.src),
            json!({ "user_id": outsider.id, "can_edit": true }),
            &ws.alice,
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_revoke_single_override() {
    let ws = workspace().await;
    ws.app
        .post(
            &format!("/api/permissions/folder/{}", ws.src),
            json!({ "user_id": ws.bob.id, "can_edit": true }),
            &ws.alice,
        )
        .await;

    let revoked = ws
        .app
        .delete(
            &format!("/api/permissions/folder/{}/users/{}", ws.src, ws.bob.id),
            &ws.alice,
        )
        .await;
    assert_eq!(revoked.status, StatusCode::OK);
    assert_eq!(revoked.data()["removed"], true);

    let listed = ws
        .app
        .get(&format!("/api/permissions/folder/{}", ws.src), &ws.alice)
        .await;
    assert_eq!(listed.data().as_array().map(Vec::len), Some(0));

    let write = ws.app.write_document(&ws.bob, &ws.app_js, "x").await;
    assert_eq!(write.status, StatusCode::FORBIDDEN);
}
