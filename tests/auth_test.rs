mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{Factory, TestApp};

#[tokio::test]
async fn test_register_success() {
    let app = TestApp::new().await;

    let response = app
        .server
        .post("/api/auth/register")
        .json(&json!({
            "name": "alice",
            "password": "password123"
        }))
        .await;

    response.assert_status(StatusCode::OK);

    let body: serde_json::Value = response.json();
    assert!(body["token"].as_str().is_some());
    assert_eq!(body["user"]["id"].as_i64().unwrap(), 1);
    assert_eq!(body["user"]["name"].as_str().unwrap(), "alice");
    assert!(body["user"]["password_hash"].is_null());
}

#[tokio::test]
async fn test_register_duplicate_name() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app.state);
    let auth = factory.create_user().await;

    let response = app
        .server
        .post("/api/auth/register")
        .json(&json!({
            "name": auth.name,
            "password": "password123"
        }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_register_short_password() {
    let app = TestApp::new().await;

    let response = app
        .server
        .post("/api/auth/register")
        .json(&json!({
            "name": "bob",
            "password": "short"
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json();
    assert!(body["details"].as_str().unwrap().contains("password"));
}

#[tokio::test]
async fn test_register_empty_name() {
    let app = TestApp::new().await;

    let response = app
        .server
        .post("/api/auth/register")
        .json(&json!({
            "name": "",
            "password": "password123"
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_success() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app.state);
    factory.create_user_with_name("carol", "secret-pass").await;

    let response = app
        .server
        .post("/api/auth/login")
        .json(&json!({
            "name": "carol",
            "password": "secret-pass"
        }))
        .await;

    response.assert_status(StatusCode::OK);

    let body: serde_json::Value = response.json();
    assert!(body["token"].as_str().is_some());
    assert_eq!(body["user"]["name"].as_str().unwrap(), "carol");
}

#[tokio::test]
async fn test_login_failures_look_alike() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app.state);
    factory.create_user_with_name("dave", "secret-pass").await;

    let wrong_password = app
        .server
        .post("/api/auth/login")
        .json(&json!({ "name": "dave", "password": "not-it" }))
        .await;
    let unknown_user = app
        .server
        .post("/api/auth/login")
        .json(&json!({ "name": "nobody", "password": "secret-pass" }))
        .await;

    wrong_password.assert_status(StatusCode::UNAUTHORIZED);
    unknown_user.assert_status(StatusCode::UNAUTHORIZED);

    let a: serde_json::Value = wrong_password.json();
    let b: serde_json::Value = unknown_user.json();
    assert_eq!(a, b);
}

#[tokio::test]
async fn test_me() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app.state);
    let auth = factory.create_user().await;

    let response = app
        .server
        .get("/api/auth/me")
        .add_header("Authorization", auth.auth_header())
        .await;

    response.assert_status(StatusCode::OK);

    let body: serde_json::Value = response.json();
    assert_eq!(body["id"].as_i64().unwrap(), auth.user_id);
    assert_eq!(body["name"].as_str().unwrap(), auth.name);
}

#[tokio::test]
async fn test_me_without_token() {
    let app = TestApp::new().await;

    let response = app.server.get("/api/auth/me").await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_with_garbage_token() {
    let app = TestApp::new().await;

    let response = app
        .server
        .get("/api/auth/me")
        .add_header("Authorization", "Bearer not-a-jwt")
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health_is_public() {
    let app = TestApp::new().await;

    let response = app.server.get("/").await;

    response.assert_status(StatusCode::OK);
    response.assert_text("Hello, pubhub!");
}
