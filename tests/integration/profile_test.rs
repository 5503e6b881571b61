//! Integration tests for registration, profile access, and health.

use std::sync::Arc;

use http::StatusCode;
use serde_json::json;

use crate::helpers::{TestApp, UnreachableStore, field, test_config};

const PASSWORD: &str = "password123";

#[tokio::test]
async fn test_register_then_login() {
    let app = TestApp::new();

    let response = app
        .request(
            "POST",
            "/api/v1/auth/register",
            Some(json!({
                "email": "New.User@Example.com",
                "password": PASSWORD,
                "first_name": "New",
            })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["data"]["email"], "new.user@example.com");
    assert_eq!(response.body["data"]["is_active"], true);
    assert!(response.body["data"].get("password_hash").is_none());

    let data = app.login("new.user@example.com", PASSWORD).await;
    assert_eq!(field(&data, "token_type"), "bearer");
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let app = TestApp::new();
    app.create_test_user("taken@example.com", PASSWORD).await;

    let response = app
        .request(
            "POST",
            "/api/v1/auth/register",
            Some(json!({"email": "Taken@example.com", "password": PASSWORD})),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.message(),
        "The user with this username already exists in the system."
    );
}

#[tokio::test]
async fn test_register_rejects_bad_input() {
    let app = TestApp::new();

    let short = app
        .request(
            "POST",
            "/api/v1/auth/register",
            Some(json!({"email": "short@example.com", "password": "abc"})),
            None,
        )
        .await;
    assert_eq!(short.status, StatusCode::BAD_REQUEST);
    assert_eq!(short.body["error"], "VALIDATION_ERROR");

    let bad_email = app
        .request(
            "POST",
            "/api/v1/auth/register",
            Some(json!({"email": "not-an-email", "password": PASSWORD})),
            None,
        )
        .await;
    assert_eq!(bad_email.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_profile_requires_token() {
    let app = TestApp::new();

    let missing = app.request("GET", "/api/v1/users/profile", None, None).await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);
    assert_eq!(missing.message(), "Not authenticated");

    let garbage = app
        .request("GET", "/api/v1/users/profile", None, Some("not.a.token"))
        .await;
    assert_eq!(garbage.status, StatusCode::UNAUTHORIZED);
    assert_eq!(garbage.message(), "Could not validate credentials");
}

#[tokio::test]
async fn test_get_and_update_profile() {
    let app = TestApp::new();
    let id = app.create_test_user("Profile@Example.com", PASSWORD).await;
    let data = app.login("profile@example.com", PASSWORD).await;
    let token = field(&data, "access_token");

    let profile = app
        .request("GET", "/api/v1/users/profile", None, Some(token))
        .await;
    assert_eq!(profile.status, StatusCode::OK);
    assert_eq!(profile.body["data"]["id"], id.to_string());
    assert_eq!(profile.body["data"]["email"], "profile@example.com");

    let updated = app
        .request(
            "PUT",
            "/api/v1/users/profile",
            Some(json!({"first_name": "Pat"})),
            Some(token),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["data"]["first_name"], "Pat");

    let again = app
        .request("GET", "/api/v1/users/profile", None, Some(token))
        .await;
    assert_eq!(again.body["data"]["first_name"], "Pat");
}

#[tokio::test]
async fn test_deactivated_user_loses_access() {
    let app = TestApp::new();
    let id = app.create_test_user("leaver@example.com", PASSWORD).await;
    let data = app.login("leaver@example.com", PASSWORD).await;

    assert!(app.directory.set_active(id, false));

    let profile = app
        .request(
            "GET",
            "/api/v1/users/profile",
            None,
            Some(field(&data, "access_token")),
        )
        .await;
    assert_eq!(profile.status, StatusCode::FORBIDDEN);
    assert_eq!(profile.message(), "Inactive user");
}

#[tokio::test]
async fn test_deleted_user_token_rejected() {
    let app = TestApp::new();
    let id = app.create_test_user("gone@example.com", PASSWORD).await;
    let data = app.login("gone@example.com", PASSWORD).await;

    assert!(app.directory.remove(id).is_some());

    let profile = app
        .request(
            "GET",
            "/api/v1/users/profile",
            None,
            Some(field(&data, "access_token")),
        )
        .await;
    assert_eq!(profile.status, StatusCode::NOT_FOUND);
    assert_eq!(profile.message(), "User not found");
}

#[tokio::test]
async fn test_root_banner() {
    let app = TestApp::new();
    let response = app.request("GET", "/", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["message"], "Service is up and running");
}

#[tokio::test]
async fn test_health_reports_backends() {
    let app = TestApp::new();
    let response = app.request("GET", "/health", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "healthy");
    assert_eq!(response.body["data"]["revocation_store"], "connected");

    let down = TestApp::with_store(test_config(), Arc::new(UnreachableStore));
    let response = down.request("GET", "/health", None, None).await;
    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.body["data"]["status"], "unhealthy");
    assert_eq!(response.body["data"]["revocation_store"], "disconnected");
}
