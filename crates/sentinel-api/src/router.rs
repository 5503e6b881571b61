//! Route definitions for the Sentinel HTTP API.
//!
//! Auth and profile routes are mounted under `/api/v1`, with the auth
//! routes reachable at both `/api/v1/auth/*` and `/api/v1/users/*`. Health
//! and the service banner sit at the root.

use std::time::Duration;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config.server.request_timeout_seconds);

    // Auth routes answer under `/auth` and under `/users`, where existing
    // clients of the service expect them.
    let api_routes = Router::new()
        .nest("/auth", auth_routes())
        .nest("/users", auth_routes().merge(user_routes()));

    Router::new()
        .nest("/api/v1", api_routes)
        .merge(health_routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(axum_middleware::from_fn(middleware::logging::request_logging))
                .layer(TimeoutLayer::new(timeout)),
        )
        .with_state(state)
}

/// Auth endpoints: login, refresh, logout, register
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(handlers::auth::login))
        .route("/refresh", post(handlers::auth::refresh))
        .route("/logout", post(handlers::auth::logout))
        .route("/register", post(handlers::auth::register))
}

/// User self-service endpoints
fn user_routes() -> Router<AppState> {
    Router::new().route(
        "/profile",
        get(handlers::user::get_profile).put(handlers::user::update_profile),
    )
}

/// Health and banner
fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::health::root))
        .route("/health", get(handlers::health::health))
}
