//! Auth handlers: login, refresh, logout, register.

use axum::body::Bytes;
use axum::extract::{FromRequest, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, StatusCode};
use axum::{Form, Json};

use sentinel_core::error::{AppError, ErrorKind};

use super::validate_body;
use crate::dto::request::{LoginRequest, LogoutRequest, RefreshRequest, RegisterRequest};
use crate::dto::response::{ApiResponse, MessageResponse, TokenResponse, UserResponse};
use crate::error::ApiError;
use crate::extractors::BearerToken;
use crate::state::AppState;

/// POST /api/v1/auth/login
///
/// Accepts JSON `{email, password}` or the OAuth2 password form
/// (`username`, `password`, form-encoded).
pub async fn login(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<ApiResponse<TokenResponse>>, ApiError> {
    let req = if is_form(request.headers()) {
        let Form(req) = Form::<LoginRequest>::from_request(request, &state)
            .await
            .map_err(|e| AppError::validation(e.body_text()))?;
        req
    } else {
        let Json(req) = Json::<LoginRequest>::from_request(request, &state)
            .await
            .map_err(|e| AppError::validation(e.body_text()))?;
        req
    };
    validate_body(&req)?;

    let pair = state.sessions.login(&req.email, &req.password).await?;
    Ok(Json(ApiResponse::ok(pair.into())))
}

/// POST /api/v1/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<ApiResponse<TokenResponse>>, ApiError> {
    validate_body(&req)?;

    let pair = state.sessions.refresh(&req.refresh_token).await?;
    Ok(Json(ApiResponse::ok(pair.into())))
}

/// POST /api/v1/auth/logout
///
/// The body is optional; when present it may name the session's refresh token.
pub async fn logout(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    body: Bytes,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let req: LogoutRequest = if body.iter().all(u8::is_ascii_whitespace) {
        LogoutRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::validation(format!("Invalid request body: {e}")))?
    };

    state
        .sessions
        .logout(&token, req.refresh_token.as_deref())
        .await?;

    Ok(Json(ApiResponse::ok(MessageResponse {
        message: "Successfully logged out".to_string(),
    })))
}

/// POST /api/v1/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), ApiError> {
    validate_body(&req)?;

    let user = state
        .sessions
        .register(&req.email, &req.password, req.first_name, req.last_name)
        .await
        .map_err(|e| match e.kind {
            ErrorKind::Conflict => AppError::validation(
                "The user with this username already exists in the system.",
            ),
            _ => e,
        })?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(user.into()))))
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/x-www-form-urlencoded"))
}
