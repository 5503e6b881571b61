//! Health check handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use tracing::warn;

use crate::dto::response::{ApiResponse, HealthResponse, MessageResponse};
use crate::state::AppState;

/// GET /
pub async fn root() -> Json<ApiResponse<MessageResponse>> {
    Json(ApiResponse::ok(MessageResponse {
        message: "Service is up and running".to_string(),
    }))
}

/// GET /health
///
/// Reports reachability of the revocation store and the user directory.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<ApiResponse<HealthResponse>>) {
    let store_ok = match state.revocation_store.health_check().await {
        Ok(ok) => ok,
        Err(e) => {
            warn!(error = %e, "Revocation store health check failed");
            false
        }
    };

    let directory_ok = match &state.db_pool {
        Some(pool) => match pool.health_check().await {
            Ok(ok) => ok,
            Err(e) => {
                warn!(error = %e, "Database health check failed");
                false
            }
        },
        None => true,
    };

    let healthy = store_ok && directory_ok;
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(ApiResponse::ok(HealthResponse {
            status: if healthy { "healthy" } else { "unhealthy" }.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            revocation_store: connection_label(store_ok),
            directory: connection_label(directory_ok),
        })),
    )
}

fn connection_label(ok: bool) -> String {
    if ok { "connected" } else { "disconnected" }.to_string()
}
