mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{Factory, TestApp};
use pubhub::models::Subject;

#[tokio::test]
async fn test_create_environment() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app.state);
    let auth = factory.create_user().await;
    let project = factory.create_project(&auth).await;

    let response = app
        .server
        .post(&format!("/api/projects/{}/environments", project.id))
        .add_header("Authorization", auth.auth_header())
        .json(&json!({ "name": "staging", "kind": 2 }))
        .await;

    response.assert_status(StatusCode::OK);

    let body: serde_json::Value = response.json();
    assert_eq!(body["name"].as_str().unwrap(), "staging");
    assert_eq!(body["kind"].as_i64().unwrap(), 2);
    assert_eq!(body["project_id"].as_i64().unwrap(), project.id);
    assert_eq!(body["creator_id"].as_i64().unwrap(), auth.user_id);
}

#[tokio::test]
async fn test_create_environment_any_member_may_write() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app.state);
    let owner = factory.create_user().await;
    let member = factory.create_user().await;
    let project = factory.create_project(&owner).await;
    factory
        .add_member(&owner, Subject::Project(project.id), &member, 10)
        .await;

    let response = app
        .server
        .post(&format!("/api/projects/{}/environments", project.id))
        .add_header("Authorization", member.auth_header())
        .json(&json!({ "name": "dev", "kind": 1 }))
        .await;

    response.assert_status(StatusCode::OK);
}

#[tokio::test]
async fn test_create_environment_outsider_forbidden() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app.state);
    let owner = factory.create_user().await;
    let outsider = factory.create_user().await;
    let project = factory.create_project(&owner).await;

    let response = app
        .server
        .post(&format!("/api/projects/{}/environments", project.id))
        .add_header("Authorization", outsider.auth_header())
        .json(&json!({ "name": "dev", "kind": 1 }))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_create_environment_missing_project() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app.state);
    let auth = factory.create_user().await;

    let response = app
        .server
        .post("/api/projects/999/environments")
        .add_header("Authorization", auth.auth_header())
        .json(&json!({ "name": "dev", "kind": 1 }))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_environment_kind_out_of_range() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app.state);
    let auth = factory.create_user().await;
    let project = factory.create_project(&auth).await;

    let response = app
        .server
        .post(&format!("/api/projects/{}/environments", project.id))
        .add_header("Authorization", auth.auth_header())
        .json(&json!({ "name": "dev", "kind": 5 }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_environments() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app.state);
    let auth = factory.create_user().await;
    let project = factory.create_project(&auth).await;
    let other = factory.create_project(&auth).await;
    factory.create_environment(&auth, project.id, "dev").await;
    factory.create_environment(&auth, project.id, "prod").await;
    factory.create_environment(&auth, other.id, "elsewhere").await;

    let response = app
        .server
        .get(&format!("/api/projects/{}/environments", project.id))
        .add_header("Authorization", auth.auth_header())
        .await;

    response.assert_status(StatusCode::OK);

    let body: serde_json::Value = response.json();
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["dev", "prod"]);
}

#[tokio::test]
async fn test_get_environment() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app.state);
    let hierarchy = factory.create_hierarchy().await;

    let response = app
        .server
        .get(&format!("/api/environments/{}", hierarchy.environment.id))
        .add_header("Authorization", hierarchy.auth.auth_header())
        .await;

    response.assert_status(StatusCode::OK);

    let body: serde_json::Value = response.json();
    assert_eq!(body["name"].as_str().unwrap(), "prod");
}

#[tokio::test]
async fn test_delete_environment() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app.state);
    let hierarchy = factory.create_hierarchy().await;
    let env_id = hierarchy.environment.id;

    app.server
        .delete(&format!("/api/environments/{env_id}"))
        .add_header("Authorization", hierarchy.auth.auth_header())
        .await
        .assert_status(StatusCode::OK);

    app.server
        .get(&format!("/api/environments/{env_id}"))
        .add_header("Authorization", hierarchy.auth.auth_header())
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let response = app
        .server
        .get(&format!("/api/projects/{}/environments", hierarchy.project.id))
        .add_header("Authorization", hierarchy.auth.auth_header())
        .await;
    let body: serde_json::Value = response.json();
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_environment_outsider_forbidden() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app.state);
    let hierarchy = factory.create_hierarchy().await;
    let outsider = factory.create_user().await;

    let response = app
        .server
        .delete(&format!("/api/environments/{}", hierarchy.environment.id))
        .add_header("Authorization", outsider.auth_header())
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_environments_survive_project_delete() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app.state);
    let hierarchy = factory.create_hierarchy().await;

    app.server
        .delete(&format!("/api/projects/{}", hierarchy.project.id))
        .add_header("Authorization", hierarchy.auth.auth_header())
        .await
        .assert_status(StatusCode::OK);

    app.server
        .get(&format!("/api/environments/{}", hierarchy.environment.id))
        .add_header("Authorization", hierarchy.auth.auth_header())
        .await
        .assert_status(StatusCode::OK);

    let response = app
        .server
        .get(&format!("/api/projects/{}/environments", hierarchy.project.id))
        .add_header("Authorization", hierarchy.auth.auth_header())
        .await;
    let body: serde_json::Value = response.json();
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}
