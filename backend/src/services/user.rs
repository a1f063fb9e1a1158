//! User service: Telegram upsert, profile and session refresh

use crate::auth::{JwtService, TokenType, VerifiedIdentity};
use crate::error::ApiError;
use crate::repositories::{
    RepositoryError, TelegramProfile, TelegramUserStore, UserRecord, UserRepository,
};
use hackathon_shared::validation::validate_profile_update;
use hackathon_shared::{AuthTokens, UpdateProfileRequest, UserProfile};
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;
use validator::ValidateEmail;

/// Result of a Telegram upsert
#[derive(Debug, Clone)]
pub struct UpsertOutcome {
    pub user: UserRecord,
    /// True when this call inserted the record
    pub created: bool,
}

/// User service for account operations
pub struct UserService;

impl UserService {
    /// Find or create the local user for a verified Telegram identity
    ///
    /// Existing users get their display name, username, avatar and premium
    /// flag overwritten (last write wins). If the insert loses a race against
    /// a concurrent first login, the unique violation is taken as the signal
    /// to update the row the other request created.
    pub async fn upsert_telegram_user<S>(
        store: &S,
        identity: &VerifiedIdentity,
    ) -> Result<UpsertOutcome, ApiError>
    where
        S: TelegramUserStore + ?Sized,
    {
        let profile = TelegramProfile::from(identity);

        if store.find_by_telegram_id(profile.telegram_id).await?.is_some() {
            let user = store.update_telegram_profile(&profile).await?;
            return Ok(UpsertOutcome { user, created: false });
        }

        match store.insert_telegram_user(&profile).await {
            Ok(user) => {
                info!(telegram_id = profile.telegram_id, user_id = %user.id, "Created user from Telegram login");
                Ok(UpsertOutcome { user, created: true })
            }
            Err(RepositoryError::UniqueViolation) => {
                debug!(
                    telegram_id = profile.telegram_id,
                    "Concurrent first login detected, retrying as update"
                );
                let user = store.update_telegram_profile(&profile).await?;
                Ok(UpsertOutcome { user, created: false })
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Get user profile
    pub async fn get_profile(pool: &PgPool, user_id: Uuid) -> Result<UserProfile, ApiError> {
        let user = UserRepository::find_by_id(pool, user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        Ok(user.into_profile())
    }

    /// Validate and apply a partial profile update
    pub async fn update_profile(
        pool: &PgPool,
        user_id: Uuid,
        req: &UpdateProfileRequest,
    ) -> Result<UserProfile, ApiError> {
        if req.is_empty() {
            return Err(ApiError::validation("No fields to update"));
        }
        validate_profile_update(req)?;
        // RFC-level check on top of the shared shape check
        if let Some(email) = req.email.as_deref() {
            if !email.validate_email() {
                return Err(ApiError::Validation {
                    message: "Invalid email format".to_string(),
                    field: Some("email".to_string()),
                });
            }
        }

        let user = UserRepository::update_profile(pool, user_id, req)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        Ok(user.into_profile())
    }

    /// Exchange a refresh token for a new token pair
    pub async fn refresh_token(
        pool: &PgPool,
        jwt_service: &JwtService,
        refresh_token: &str,
    ) -> Result<AuthTokens, ApiError> {
        let claims = jwt_service
            .validate(refresh_token, TokenType::Refresh)
            .map_err(|e| ApiError::Unauthorized(format!("Invalid refresh token: {}", e)))?;

        let user_id = claims
            .user_id()
            .map_err(|e| ApiError::Unauthorized(e.to_string()))?;

        // Verify user still exists
        let user = UserRepository::find_by_id(pool, user_id)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("User not found".to_string()))?;

        Ok(jwt_service.issue_tokens(user.id, user.telegram_id)?)
    }
}
