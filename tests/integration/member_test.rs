//! Members, invitations and chat.

use axum::http::StatusCode;
use serde_json::json;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_invitation_flow() {
    let app = TestApp::new();
    let alice = app.user("alice");
    let bob = app.user("bob");
    let project = app.create_project(&alice, "webapp", false).await;

    let invited = app
        .post(
            &format!("/api/projects/{project}/invitations"),
            json!({ "invitee_id": bob.id, "role": "viewer" }),
            &alice,
        )
        .await;
    assert_eq!(invited.status, StatusCode::CREATED);

    let mine = app.get("/api/invitations/mine", &bob).await;
    assert_eq!(mine.data().as_array().map(Vec::len), Some(1));

    let declined = app
        .post(
            &format!("/api/invitations/{}/decline", invited.id()),
            json!({}),
            &bob,
        )
        .await;
    assert_eq!(declined.status, StatusCode::OK);
    assert_eq!(declined.data()["status"], "declined");

    let again = app
        .post(
            &format!("/api/invitations/{}/accept", invited.id()),
            json!({}),
            &bob,
        )
        .await;
    assert_eq!(again.status, StatusCode::CONFLICT);

    let project_view = app.get(&format!("/api/projects/{project}"), &bob).await;
    assert_eq!(project_view.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_cannot_invite_admin() {
    let app = TestApp::new();
    let alice = app.user("alice");
    let carol = app.user("carol");
    let dave = app.user("dave");
    let project = app.create_project(&alice, "webapp", false).await;
    app.add_member(&project, &alice, &carol, "admin").await;

    let response = app
        .post(
            &format!("/api/projects/{project}/invitations"),
            json!({ "invitee_id": dave.id, "role": "admin" }),
            &carol,
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let editor = app
        .post(
            &format!("/api/projects/{project}/invitations"),
            json!({ "invitee_id": dave.id, "role": "editor" }),
            &carol,
        )
        .await;
    assert_eq!(editor.status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_removing_member_purges_overrides() {
    let app = TestApp::new();
    let alice = app.user("alice");
    let bob = app.user("bob");
    let project = app.create_project(&alice, "webapp", false).await;
    app.add_member(&project, &alice, &bob, "editor").await;
    let src = app.create_folder(&alice, &project, None, "src").await;
    app.post(
        &format!("/api/permissions/folder/{src}"),
        json!({ "user_id": bob.id, "can_edit": true }),
        &alice,
    )
    .await;

    let removed = app
        .delete(&format!("/api/projects/{project}/members/{}", bob.id), &alice)
        .await;
    assert_eq!(removed.status, StatusCode::OK);

    let listed = app
        .get(&format!("/api/permissions/folder/{src}"), &alice)
        .await;
    assert_eq!(listed.data().as_array().map(Vec::len), Some(0));

    let members = app
        .get(&format!("/api/projects/{project}/members"), &alice)
        .await;
    assert_eq!(members.data()["members"].as_array().map(Vec::len), Some(0));
    assert_eq!(members.data()["owner_id"], json!(alice.id));
}

#[tokio::test]
async fn test_member_can_leave() {
    let app = TestApp::new();
    let alice = app.user("alice");
    let bob = app.user("bob");
    let project = app.create_project(&alice, "webapp", false).await;
    app.add_member(&project, &alice, &bob, "viewer").await;

    let left = app
        .delete(&format!("/api/projects/{project}/members/{}", bob.id), &bob)
        .await;
    assert_eq!(left.status, StatusCode::OK);
    assert_eq!(
        app.get(&format!("/api/projects/{project}"), &bob).await.status,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_role_change_takes_effect() {
    let app = TestApp::new();
    let alice = app.user("alice");
    let bob = app.user("bob");
    let project = app.create_project(&alice, "webapp", false).await;
    app.add_member(&project, &alice, &bob, "viewer").await;
    let src = app.create_folder(&alice, &project, None, "src").await;

    let rename_path = format!("/api/folders/{src}/name");
    let before = app.put(&rename_path, json!({ "name": "source" }), &bob).await;
    assert_eq!(before.status, StatusCode::FORBIDDEN);

    let changed = app
        .put(
            &format!("/api/projects/{project}/members/{}", bob.id),
            json!({ "role": "editor" }),
            &alice,
        )
        .await;
    assert_eq!(changed.status, StatusCode::OK);

    let after = app.put(&rename_path, json!({ "name": "source" }), &bob).await;
    assert_eq!(after.status, StatusCode::OK);
}

#[tokio::test]
async fn test_chat_is_participant_only() {
    let app = TestApp::new();
    let alice = app.user("alice");
    let visitor = app.user("visitor");
    let project = app.create_project(&alice, "oss", true).await;

    let posted = app
        .post(
            &format!("/api/projects/{project}/chat"),
            json!({ "body": "  hello team  " }),
            &alice,
        )
        .await;
    assert_eq!(posted.status, StatusCode::CREATED);
    assert_eq!(posted.data()["body"], "hello team");

    let history = app
        .get(&format!("/api/projects/{project}/chat"), &visitor)
        .await;
    assert_eq!(history.status, StatusCode::OK);
    assert_eq!(history.data()["total_items"], 1);

    let denied = app
        .post(
            &format!("/api/projects/{project}/chat"),
            json!({ "body": "drive-by" }),
            &visitor,
        )
        .await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);
}
