//! API request and response types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Authentication tokens response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Telegram Mini App login request
///
/// `init_data` is the raw `Telegram.WebApp.initData` string. When absent the
/// backend falls back to the `X-Telegram-Init-Data` header.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelegramLoginRequest {
    #[serde(default)]
    pub init_data: Option<String>,
}

/// Successful Telegram login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramLoginResponse {
    pub user: UserProfile,
    pub tokens: AuthTokens,
    /// True when this login created the local account
    pub created: bool,
}

/// Result of an init-data check that does not log the user in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitDataCheckResponse {
    pub valid: bool,
    pub telegram_id: i64,
    pub auth_date: DateTime<Utc>,
}

/// User profile response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub telegram_id: i64,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<i32>,
    pub language: String,
    pub theme: String,
    pub is_premium: bool,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<DateTime<Utc>>,
}

/// Partial profile update
///
/// Identity fields (`id`, `telegram_id`) and the Telegram-sourced fields
/// (display name, username, avatar) are not updatable here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub age: Option<i32>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub theme: Option<String>,
}

impl UpdateProfileRequest {
    /// True when the request carries no field to update
    pub fn is_empty(&self) -> bool {
        self.bio.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.age.is_none()
            && self.language.is_none()
            && self.theme.is_none()
    }
}
