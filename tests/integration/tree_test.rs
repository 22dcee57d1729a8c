//! Tree restructuring through the routing layer.

use axum::http::StatusCode;
use serde_json::json;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_move_into_descendant_rejected() {
    let app = TestApp::new();
    let alice = app.user("alice");
    let project = app.create_project(&alice, "webapp", false).await;
    let a = app.create_folder(&alice, &project, None, "a").await;
    let b = app.create_folder(&alice, &project, Some(&a), "b").await;
    let c = app.create_folder(&alice, &project, Some(&b), "c").await;

    let response = app
        .put(
            &format!("/api/folders/{a}/move"),
            json!({ "parent_id": c }),
            &alice,
        )
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.body["error"], "STRUCTURAL_VIOLATION");

    let path = app.get(&format!("/api/folders/{c}/path"), &alice).await;
    let names: Vec<&str> = path
        .data()
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["a", "b", "c"]);
}

#[tokio::test]
async fn test_cross_project_parent_rejected() {
    let app = TestApp::new();
    let alice = app.user("alice");
    let first = app.create_project(&alice, "first", false).await;
    let second = app.create_project(&alice, "second", false).await;
    let foreign = app.create_folder(&alice, &second, None, "other").await;

    let response = app
        .post(
            "/api/folders",
            json!({ "project_id": first, "parent_id": foreign, "name": "x" }),
            &alice,
        )
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_moving_document_changes_decision() {
    let app = TestApp::new();
    let alice = app.user("alice");
    let bob = app.user("bob");
    let project = app.create_project(&alice, "webapp", false).await;
    app.add_member(&project, &alice, &bob, "editor").await;
    let open = app.create_folder(&alice, &project, None, "open").await;
    let closed = app.create_folder(&alice, &project, None, "closed").await;
    let doc = app
        .create_document(&alice, &project, Some(&closed), "notes.md")
        .await;
    app.post(
        &format!("/api/permissions/folder/{open}"),
        json!({ "user_id": bob.id, "can_edit": true }),
        &alice,
    )
    .await;

    assert_eq!(
        app.write_document(&bob, &doc, "x").await.status,
        StatusCode::FORBIDDEN
    );

    let moved = app
        .put(
            &format!("/api/documents/{doc}/move"),
            json!({ "folder_id": open }),
            &alice,
        )
        .await;
    assert_eq!(moved.status, StatusCode::OK);

    assert_eq!(app.write_document(&bob, &doc, "x").await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_project_tree_nests_children() {
    let app = TestApp::new();
    let alice = app.user("alice");
    let project = app.create_project(&alice, "webapp", false).await;
    let src = app.create_folder(&alice, &project, None, "src").await;
    app.create_folder(&alice, &project, Some(&src), "lib").await;
    app.create_document(&alice, &project, Some(&src), "app.js")
        .await;
    app.create_document(&alice, &project, None, "readme.md")
        .await;

    let tree = app
        .get(&format!("/api/projects/{project}/tree"), &alice)
        .await;
    assert_eq!(tree.status, StatusCode::OK);
    let data = tree.data();
    assert_eq!(data["total_folders"], 2);
    assert_eq!(data["total_documents"], 2);
    assert_eq!(data["folders"][0]["name"], "src");
    assert_eq!(data["folders"][0]["children"][0]["name"], "lib");
    assert_eq!(data["folders"][0]["documents"][0]["name"], "app.js");
    assert_eq!(data["documents"][0]["name"], "readme.md");
}

#[tokio::test]
async fn test_delete_folder_removes_subtree() {
    let app = TestApp::new();
    let alice = app.user("alice");
    let project = app.create_project(&alice, "webapp", false).await;
    let src = app.create_folder(&alice, &project, None, "src").await;
    let lib = app.create_folder(&alice, &project, Some(&src), "lib").await;
    let doc = app
        .create_document(&alice, &project, Some(&lib), "util.js")
        .await;

    let deleted = app.delete(&format!("/api/folders/{src}"), &alice).await;
    assert_eq!(deleted.status, StatusCode::OK, "{:?}", deleted.body);
    assert_eq!(deleted.data()["applied"].as_array().map(Vec::len), Some(3));

    assert_eq!(
        app.get(&format!("/api/folders/{lib}"), &alice).await.status,
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        app.get(&format!("/api/documents/{doc}"), &alice).await.status,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_invalid_names_rejected() {
    let app = TestApp::new();
    let alice = app.user("alice");
    let project = app.create_project(&alice, "webapp", false).await;

    for name in ["..", "a/b", "   "] {
        let response = app
            .post(
                "/api/folders",
                json!({ "project_id": project, "name": name }),
                &alice,
            )
            .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "name {name:?}");
    }
}
