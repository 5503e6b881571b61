//! User self-service handlers.

use axum::Json;
use axum::extract::State;

use sentinel_auth::AuthError;
use sentinel_entity::user::UpdateProfile;

use super::validate_body;
use crate::dto::request::UpdateProfileRequest;
use crate::dto::response::{ApiResponse, UserResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/v1/users/profile
pub async fn get_profile(auth: AuthUser) -> Json<ApiResponse<UserResponse>> {
    Json(ApiResponse::ok(auth.0.user.into()))
}

/// PUT /api/v1/users/profile
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    validate_body(&req)?;

    let user = state
        .directory
        .update_profile(
            auth.id(),
            UpdateProfile {
                first_name: req.first_name,
                last_name: req.last_name,
            },
        )
        .await?
        .ok_or(AuthError::UserNotFound)?;

    Ok(Json(ApiResponse::ok(user.into())))
}
