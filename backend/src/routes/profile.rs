//! User profile API routes

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::services::UserService;
use crate::state::AppState;
use axum::{extract::State, routing::get, Json, Router};
use hackathon_shared::{UpdateProfileRequest, UserProfile};

/// Create profile routes
pub fn profile_routes() -> Router<AppState> {
    Router::new().route("/", get(get_profile).patch(update_profile))
}

/// GET /api/v1/profile - Get the authenticated user's profile
async fn get_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<UserProfile>> {
    let profile = UserService::get_profile(state.db(), auth.user_id).await?;
    Ok(Json(profile))
}

/// PATCH /api/v1/profile - Partially update the authenticated user's profile
///
/// `telegram_id` and the Telegram-sourced fields are not accepted here; they
/// follow the latest login.
async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<UpdateProfileRequest>,
) -> ApiResult<Json<UserProfile>> {
    let profile = UserService::update_profile(state.db(), auth.user_id, &req).await?;
    Ok(Json(profile))
}
