mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{Factory, TestApp};

#[tokio::test]
async fn test_create_domain() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app.state);
    let hierarchy = factory.create_hierarchy().await;

    let response = app
        .server
        .post(&format!("/api/projects/{}/domains", hierarchy.project.id))
        .add_header("Authorization", hierarchy.auth.auth_header())
        .json(&json!({
            "environment_id": hierarchy.environment.id,
            "host": "alpha.example.com"
        }))
        .await;

    response.assert_status(StatusCode::OK);

    let body: serde_json::Value = response.json();
    assert_eq!(body["host"].as_str().unwrap(), "alpha.example.com");
    assert_eq!(
        body["environment_id"].as_i64().unwrap(),
        hierarchy.environment.id
    );
    assert_eq!(body["project_id"].as_i64().unwrap(), hierarchy.project.id);
}

#[tokio::test]
async fn test_hosts_need_not_be_unique() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app.state);
    let hierarchy = factory.create_hierarchy().await;

    for _ in 0..2 {
        app.server
            .post(&format!("/api/projects/{}/domains", hierarchy.project.id))
            .add_header("Authorization", hierarchy.auth.auth_header())
            .json(&json!({
                "environment_id": hierarchy.environment.id,
                "host": "shared.example.com"
            }))
            .await
            .assert_status(StatusCode::OK);
    }

    let response = app
        .server
        .get(&format!("/api/projects/{}/domains", hierarchy.project.id))
        .add_header("Authorization", hierarchy.auth.auth_header())
        .await;
    let body: serde_json::Value = response.json();
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_create_domain_environment_from_other_project() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app.state);
    let hierarchy = factory.create_hierarchy().await;
    let other = factory.create_project(&hierarchy.auth).await;
    let foreign_env = factory
        .create_environment(&hierarchy.auth, other.id, "prod")
        .await;

    let response = app
        .server
        .post(&format!("/api/projects/{}/domains", hierarchy.project.id))
        .add_header("Authorization", hierarchy.auth.auth_header())
        .json(&json!({
            "environment_id": foreign_env.id,
            "host": "alpha.example.com"
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_domain_unknown_environment() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app.state);
    let hierarchy = factory.create_hierarchy().await;

    let response = app
        .server
        .post(&format!("/api/projects/{}/domains", hierarchy.project.id))
        .add_header("Authorization", hierarchy.auth.auth_header())
        .json(&json!({ "environment_id": 999, "host": "alpha.example.com" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_domain_short_host() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app.state);
    let hierarchy = factory.create_hierarchy().await;

    let response = app
        .server
        .post(&format!("/api/projects/{}/domains", hierarchy.project.id))
        .add_header("Authorization", hierarchy.auth.auth_header())
        .json(&json!({ "environment_id": hierarchy.environment.id, "host": "a" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_domain_outsider_forbidden() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app.state);
    let hierarchy = factory.create_hierarchy().await;
    let outsider = factory.create_user().await;

    let response = app
        .server
        .post(&format!("/api/projects/{}/domains", hierarchy.project.id))
        .add_header("Authorization", outsider.auth_header())
        .json(&json!({
            "environment_id": hierarchy.environment.id,
            "host": "alpha.example.com"
        }))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_domain_survives_environment_delete() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app.state);
    let hierarchy = factory.create_hierarchy().await;
    let domain = factory
        .create_domain(
            &hierarchy.auth,
            hierarchy.project.id,
            hierarchy.environment.id,
            "alpha.example.com",
        )
        .await;

    app.server
        .delete(&format!("/api/environments/{}", hierarchy.environment.id))
        .add_header("Authorization", hierarchy.auth.auth_header())
        .await
        .assert_status(StatusCode::OK);

    let response = app
        .server
        .get(&format!("/api/domains/{}", domain.id))
        .add_header("Authorization", hierarchy.auth.auth_header())
        .await;

    response.assert_status(StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(
        body["environment_id"].as_i64().unwrap(),
        hierarchy.environment.id
    );
}

#[tokio::test]
async fn test_delete_domain() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app.state);
    let hierarchy = factory.create_hierarchy().await;
    let domain = factory
        .create_domain(
            &hierarchy.auth,
            hierarchy.project.id,
            hierarchy.environment.id,
            "alpha.example.com",
        )
        .await;

    app.server
        .delete(&format!("/api/domains/{}", domain.id))
        .add_header("Authorization", hierarchy.auth.auth_header())
        .await
        .assert_status(StatusCode::OK);

    app.server
        .get(&format!("/api/domains/{}", domain.id))
        .add_header("Authorization", hierarchy.auth.auth_header())
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
