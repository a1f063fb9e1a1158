//! Authentication routes
//!
//! Telegram Mini App login, init-data check, token refresh and the current
//! user. Init-data is read from the JSON body (`init_data`) and, when the
//! body does not carry it, from the `X-Telegram-Init-Data` header.

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::services::{TelegramAuthService, UserService};
use crate::state::AppState;
use axum::{
    extract::State,
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use hackathon_shared::{
    AuthTokens, InitDataCheckResponse, TelegramLoginRequest, TelegramLoginResponse, UserProfile,
};
use serde::Deserialize;

/// Header carrying raw init-data for clients that do not send a body
pub const INIT_DATA_HEADER: &str = "x-telegram-init-data";

/// Create auth routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/telegram", post(telegram_login))
        .route("/telegram/check", post(check_init_data))
        .route("/refresh", post(refresh_token))
        .route("/me", get(get_me))
}

/// Pick init-data from the body, falling back to the header
///
/// Missing init-data becomes an empty string, which the verifier rejects as
/// malformed (and logs and counts like any other rejection).
fn extract_init_data(headers: &HeaderMap, body: Option<TelegramLoginRequest>) -> String {
    body.and_then(|req| req.init_data)
        .filter(|raw| !raw.trim().is_empty())
        .or_else(|| {
            headers
                .get(INIT_DATA_HEADER)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        })
        .unwrap_or_default()
}

/// Log in with Telegram Mini App init-data
///
/// POST /api/v1/auth/telegram
async fn telegram_login(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Option<Json<TelegramLoginRequest>>,
) -> ApiResult<Json<TelegramLoginResponse>> {
    let init_data = extract_init_data(&headers, body.map(|Json(req)| req));
    let response =
        TelegramAuthService::login(state.db(), state.verifier(), state.jwt(), &init_data).await?;
    Ok(Json(response))
}

/// Verify init-data without logging in
///
/// POST /api/v1/auth/telegram/check
async fn check_init_data(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Option<Json<TelegramLoginRequest>>,
) -> ApiResult<Json<InitDataCheckResponse>> {
    let init_data = extract_init_data(&headers, body.map(|Json(req)| req));
    let response = TelegramAuthService::check(state.verifier(), &init_data)?;
    Ok(Json(response))
}

/// Refresh token request
#[derive(Debug, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// Refresh access token
///
/// POST /api/v1/auth/refresh
async fn refresh_token(
    State(state): State<AppState>,
    Json(req): Json<RefreshTokenRequest>,
) -> ApiResult<Json<AuthTokens>> {
    let tokens = UserService::refresh_token(state.db(), state.jwt(), &req.refresh_token).await?;
    Ok(Json(tokens))
}

/// Get current user profile (requires authentication)
///
/// GET /api/v1/auth/me
async fn get_me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> ApiResult<Json<UserProfile>> {
    let profile = UserService::get_profile(state.db(), auth_user.user_id).await?;
    Ok(Json(profile))
}
