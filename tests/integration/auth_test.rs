//! Integration tests for the login, refresh, and logout flows.

use std::sync::Arc;

use http::StatusCode;
use serde_json::json;

use sentinel_core::config::FailurePolicy;

use crate::helpers::{TestApp, UnreachableStore, field, test_config};

const PASSWORD: &str = "password123";

#[tokio::test]
async fn test_login_success() {
    let app = TestApp::new();
    app.create_test_user("testuser@example.com", PASSWORD).await;

    let data = app.login("testuser@example.com", PASSWORD).await;
    assert_eq!(field(&data, "token_type"), "bearer");
    assert!(!field(&data, "access_token").is_empty());
    assert!(!field(&data, "refresh_token").is_empty());
}

#[tokio::test]
async fn test_login_failures_look_identical() {
    let app = TestApp::new();
    app.create_test_user("testuser2@example.com", PASSWORD).await;

    let wrong_password = app
        .request(
            "POST",
            "/api/v1/auth/login",
            Some(json!({"email": "testuser2@example.com", "password": "wrongpassword"})),
            None,
        )
        .await;
    let unknown_user = app
        .request(
            "POST",
            "/api/v1/auth/login",
            Some(json!({"email": "nobody@example.com", "password": PASSWORD})),
            None,
        )
        .await;

    for response in [&wrong_password, &unknown_user] {
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.message(), "Incorrect email or password");
        assert_eq!(response.body["success"], false);
    }
}

#[tokio::test]
async fn test_login_inactive_user() {
    let app = TestApp::new();
    let id = app.create_test_user("sleepy@example.com", PASSWORD).await;
    app.directory.set_active(id, false);

    let response = app
        .request(
            "POST",
            "/api/v1/auth/login",
            Some(json!({"email": "sleepy@example.com", "password": PASSWORD})),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.message(), "Inactive user");
}

#[tokio::test]
async fn test_logout_revokes_access_token() {
    let app = TestApp::new();
    app.create_test_user("logout@example.com", PASSWORD).await;
    let data = app.login("logout@example.com", PASSWORD).await;
    let token = field(&data, "access_token");

    let profile = app
        .request("GET", "/api/v1/users/profile", None, Some(token))
        .await;
    assert_eq!(profile.status, StatusCode::OK);

    let logout = app
        .request("POST", "/api/v1/auth/logout", None, Some(token))
        .await;
    assert_eq!(logout.status, StatusCode::OK);
    assert_eq!(logout.body["data"]["message"], "Successfully logged out");

    let after = app
        .request("GET", "/api/v1/users/profile", None, Some(token))
        .await;
    assert_eq!(after.status, StatusCode::UNAUTHORIZED);
    assert_eq!(after.message(), "Token has been revoked");

    // A repeated logout with the same token still succeeds.
    let again = app
        .request("POST", "/api/v1/auth/logout", None, Some(token))
        .await;
    assert_eq!(again.status, StatusCode::OK);
    assert_eq!(app.store.entry_count().await, 1);

    // A fresh login gets a working token.
    let fresh = app.login("logout@example.com", PASSWORD).await;
    let profile = app
        .request(
            "GET",
            "/api/v1/users/profile",
            None,
            Some(field(&fresh, "access_token")),
        )
        .await;
    assert_eq!(profile.status, StatusCode::OK);
}

#[tokio::test]
async fn test_logout_with_refresh_token_ends_session() {
    let app = TestApp::new();
    app.create_test_user("session@example.com", PASSWORD).await;
    let data = app.login("session@example.com", PASSWORD).await;

    let logout = app
        .request(
            "POST",
            "/api/v1/auth/logout",
            Some(json!({"refresh_token": field(&data, "refresh_token")})),
            Some(field(&data, "access_token")),
        )
        .await;
    assert_eq!(logout.status, StatusCode::OK);

    let refresh = app
        .request(
            "POST",
            "/api/v1/auth/refresh",
            Some(json!({"refresh_token": field(&data, "refresh_token")})),
            None,
        )
        .await;
    assert_eq!(refresh.status, StatusCode::UNAUTHORIZED);
    assert_eq!(refresh.message(), "Token has been revoked");
}

#[tokio::test]
async fn test_logout_requires_token() {
    let app = TestApp::new();
    let response = app.request("POST", "/api/v1/auth/logout", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.message(), "Not authenticated");
}

#[tokio::test]
async fn test_refresh_rotates_and_rejects_replay() {
    let app = TestApp::new();
    app.create_test_user("rotate@example.com", PASSWORD).await;
    let data = app.login("rotate@example.com", PASSWORD).await;
    let original = field(&data, "refresh_token").to_string();

    let first = app
        .request(
            "POST",
            "/api/v1/auth/refresh",
            Some(json!({"refresh_token": original})),
            None,
        )
        .await;
    assert_eq!(first.status, StatusCode::OK);
    let rotated = field(&first.body["data"], "refresh_token").to_string();
    assert_ne!(rotated, original);

    let replay = app
        .request(
            "POST",
            "/api/v1/auth/refresh",
            Some(json!({"refresh_token": original})),
            None,
        )
        .await;
    assert_eq!(replay.status, StatusCode::UNAUTHORIZED);
    assert_eq!(replay.message(), "Token has been revoked");

    let next = app
        .request(
            "POST",
            "/api/v1/auth/refresh",
            Some(json!({"refresh_token": rotated})),
            None,
        )
        .await;
    assert_eq!(next.status, StatusCode::OK);
}

#[tokio::test]
async fn test_refresh_without_rotation_returns_same_token() {
    let mut config = test_config();
    config.auth.rotate_refresh_tokens = false;
    let app = TestApp::with_config(config);
    app.create_test_user("static@example.com", PASSWORD).await;
    let data = app.login("static@example.com", PASSWORD).await;

    let response = app
        .request(
            "POST",
            "/api/v1/auth/refresh",
            Some(json!({"refresh_token": field(&data, "refresh_token")})),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        field(&response.body["data"], "refresh_token"),
        field(&data, "refresh_token")
    );
}

#[tokio::test]
async fn test_token_type_confusion_rejected() {
    let app = TestApp::new();
    app.create_test_user("confused@example.com", PASSWORD).await;
    let data = app.login("confused@example.com", PASSWORD).await;

    let refresh_as_access = app
        .request(
            "GET",
            "/api/v1/users/profile",
            None,
            Some(field(&data, "refresh_token")),
        )
        .await;
    assert_eq!(refresh_as_access.status, StatusCode::UNAUTHORIZED);
    assert_eq!(refresh_as_access.message(), "Could not validate credentials");

    let access_as_refresh = app
        .request(
            "POST",
            "/api/v1/auth/refresh",
            Some(json!({"refresh_token": field(&data, "access_token")})),
            None,
        )
        .await;
    assert_eq!(access_as_refresh.status, StatusCode::UNAUTHORIZED);
    assert_eq!(access_as_refresh.message(), "Could not validate credentials");
}

#[tokio::test]
async fn test_expired_tokens_rejected() {
    let app = TestApp::new();
    app.create_test_user("expiry@example.com", PASSWORD).await;
    let data = app.login("expiry@example.com", PASSWORD).await;

    app.clock.advance(chrono::Duration::minutes(31));
    let profile = app
        .request(
            "GET",
            "/api/v1/users/profile",
            None,
            Some(field(&data, "access_token")),
        )
        .await;
    assert_eq!(profile.status, StatusCode::UNAUTHORIZED);
    assert_eq!(profile.message(), "Could not validate credentials");

    app.clock.advance(chrono::Duration::days(7));
    let refresh = app
        .request(
            "POST",
            "/api/v1/auth/refresh",
            Some(json!({"refresh_token": field(&data, "refresh_token")})),
            None,
        )
        .await;
    assert_eq!(refresh.status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.store.entry_count().await, 0);
}

#[tokio::test]
async fn test_store_outage_fails_closed() {
    let app = TestApp::with_store(test_config(), Arc::new(UnreachableStore));
    app.create_test_user("outage@example.com", PASSWORD).await;
    let data = app.login("outage@example.com", PASSWORD).await;
    let token = field(&data, "access_token");

    let profile = app
        .request("GET", "/api/v1/users/profile", None, Some(token))
        .await;
    assert_eq!(profile.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(profile.message(), "Authentication temporarily unavailable");

    let logout = app
        .request("POST", "/api/v1/auth/logout", None, Some(token))
        .await;
    assert_eq!(logout.status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_store_outage_fail_open_admits_reads_only() {
    let mut config = test_config();
    config.revocation.failure_policy = FailurePolicy::FailOpen;
    let app = TestApp::with_store(config, Arc::new(UnreachableStore));
    app.create_test_user("open@example.com", PASSWORD).await;
    let data = app.login("open@example.com", PASSWORD).await;

    let profile = app
        .request(
            "GET",
            "/api/v1/users/profile",
            None,
            Some(field(&data, "access_token")),
        )
        .await;
    assert_eq!(profile.status, StatusCode::OK);

    // Rotation must write, so it still fails closed.
    let refresh = app
        .request(
            "POST",
            "/api/v1/auth/refresh",
            Some(json!({"refresh_token": field(&data, "refresh_token")})),
            None,
        )
        .await;
    assert_eq!(refresh.status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_concurrent_refresh_single_winner() {
    let app = TestApp::new();
    app.create_test_user("race@example.com", PASSWORD).await;
    let data = app.login("race@example.com", PASSWORD).await;
    let body = json!({"refresh_token": field(&data, "refresh_token")});

    let attempts = (0..6).map(|_| {
        app.request("POST", "/api/v1/auth/refresh", Some(body.clone()), None)
    });
    let responses = futures::future::join_all(attempts).await;

    let winners = responses
        .iter()
        .filter(|r| r.status == StatusCode::OK)
        .count();
    assert_eq!(winners, 1);
    assert!(responses
        .iter()
        .filter(|r| r.status != StatusCode::OK)
        .all(|r| r.message() == "Token has been revoked"));
}

#[tokio::test]
async fn test_form_login_on_users_routes() {
    let app = TestApp::new();
    app.create_test_user("form@example.com", PASSWORD).await;

    let response = app
        .post_form(
            "/api/v1/users/login",
            "grant_type=password&username=form%40example.com&password=password123",
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["token_type"], "bearer");

    let wrong = app
        .post_form(
            "/api/v1/users/login",
            "username=form%40example.com&password=nope",
        )
        .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.message(), "Incorrect email or password");

    let missing = app.post_form("/api/v1/users/login", "password=x").await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_session_flow_on_users_routes() {
    let app = TestApp::new();

    let registered = app
        .request(
            "POST",
            "/api/v1/users/register",
            Some(json!({"email": "legacy@example.com", "password": PASSWORD})),
            None,
        )
        .await;
    assert_eq!(registered.status, StatusCode::CREATED);

    let login = app
        .request(
            "POST",
            "/api/v1/users/login",
            Some(json!({"username": "legacy@example.com", "password": PASSWORD})),
            None,
        )
        .await;
    assert_eq!(login.status, StatusCode::OK);
    let data = &login.body["data"];

    let refreshed = app
        .request(
            "POST",
            "/api/v1/users/refresh",
            Some(json!({"refresh_token": field(data, "refresh_token")})),
            None,
        )
        .await;
    assert_eq!(refreshed.status, StatusCode::OK);
    let access = field(&refreshed.body["data"], "access_token");

    let logout = app
        .request("POST", "/api/v1/users/logout", None, Some(access))
        .await;
    assert_eq!(logout.status, StatusCode::OK);

    let profile = app
        .request("GET", "/api/v1/users/profile", None, Some(access))
        .await;
    assert_eq!(profile.status, StatusCode::UNAUTHORIZED);
    assert_eq!(profile.message(), "Token has been revoked");
}
