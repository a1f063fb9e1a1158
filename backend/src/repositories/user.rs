//! User repository for database operations
//!
//! Users are keyed by their Telegram ID. The `users.telegram_id` unique index
//! is what keeps two concurrent first logins from creating two accounts, so
//! `insert_telegram_user` deliberately has no `ON CONFLICT` clause: the
//! violation must reach the caller.

use super::{RepositoryError, RepositoryResult};
use crate::auth::VerifiedIdentity;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hackathon_shared::{UpdateProfileRequest, UserProfile};
use sqlx::PgPool;
use uuid::Uuid;

const USER_COLUMNS: &str = "id, telegram_id, display_name, username, avatar_url, bio, email, \
     phone, age, language, theme, is_premium, created_at, updated_at, last_login_at";

/// User record from database
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub telegram_id: i64,
    pub display_name: String,
    pub username: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub age: Option<i32>,
    pub language: String,
    pub theme: String,
    pub is_premium: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl UserRecord {
    pub fn into_profile(self) -> UserProfile {
        UserProfile {
            id: self.id.to_string(),
            telegram_id: self.telegram_id,
            display_name: self.display_name,
            username: self.username,
            avatar_url: self.avatar_url,
            bio: self.bio,
            email: self.email,
            phone: self.phone,
            age: self.age,
            language: self.language,
            theme: self.theme,
            is_premium: self.is_premium,
            created_at: self.created_at,
            last_login_at: self.last_login_at,
        }
    }
}

/// Telegram-sourced profile fields, written on every login
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelegramProfile {
    pub telegram_id: i64,
    pub display_name: String,
    pub username: Option<String>,
    pub avatar_url: Option<String>,
    /// Seeds `users.language` on insert only
    pub language_code: Option<String>,
    pub is_premium: bool,
}

impl From<&VerifiedIdentity> for TelegramProfile {
    fn from(identity: &VerifiedIdentity) -> Self {
        Self {
            telegram_id: identity.telegram_id,
            display_name: identity.user.display_name(),
            username: identity.user.username.clone(),
            avatar_url: identity.user.photo_url.clone(),
            language_code: identity.user.language_code.clone(),
            is_premium: identity.user.is_premium,
        }
    }
}

/// Storage operations the Telegram login upsert needs
///
/// Implementations must enforce uniqueness of `telegram_id` atomically and
/// report a conflicting insert as [`RepositoryError::UniqueViolation`].
#[async_trait]
pub trait TelegramUserStore: Send + Sync {
    async fn find_by_telegram_id(&self, telegram_id: i64) -> RepositoryResult<Option<UserRecord>>;

    /// Insert a new user; the login is recorded as `last_login_at`
    async fn insert_telegram_user(&self, profile: &TelegramProfile) -> RepositoryResult<UserRecord>;

    /// Overwrite the Telegram-sourced fields of an existing user and record
    /// the login. Never touches `id`, `telegram_id` or `created_at`.
    async fn update_telegram_profile(&self, profile: &TelegramProfile) -> RepositoryResult<UserRecord>;
}

/// User repository for database operations
pub struct UserRepository;

impl UserRepository {
    /// Find user by Telegram ID
    pub async fn find_by_telegram_id(
        pool: &PgPool,
        telegram_id: i64,
    ) -> RepositoryResult<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {} FROM users WHERE telegram_id = $1",
            USER_COLUMNS
        ))
        .bind(telegram_id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Find user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> RepositoryResult<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Insert a user created by a first Telegram login
    pub async fn insert_telegram_user(
        pool: &PgPool,
        profile: &TelegramProfile,
    ) -> RepositoryResult<UserRecord> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            r#"
            INSERT INTO users (telegram_id, display_name, username, avatar_url, language,
                               is_premium, last_login_at)
            VALUES ($1, $2, $3, $4, COALESCE($5, 'en'), $6, NOW())
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(profile.telegram_id)
        .bind(&profile.display_name)
        .bind(&profile.username)
        .bind(&profile.avatar_url)
        .bind(&profile.language_code)
        .bind(profile.is_premium)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Last-write-wins update of the Telegram-sourced fields
    pub async fn update_telegram_profile(
        pool: &PgPool,
        profile: &TelegramProfile,
    ) -> RepositoryResult<UserRecord> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            r#"
            UPDATE users SET
                display_name = $2,
                username = $3,
                avatar_url = $4,
                is_premium = $5,
                last_login_at = NOW(),
                updated_at = NOW()
            WHERE telegram_id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(profile.telegram_id)
        .bind(&profile.display_name)
        .bind(&profile.username)
        .bind(&profile.avatar_url)
        .bind(profile.is_premium)
        .fetch_optional(pool)
        .await?;

        user.ok_or(RepositoryError::NotFound)
    }

    /// Apply a partial profile update; absent fields are left unchanged
    pub async fn update_profile(
        pool: &PgPool,
        id: Uuid,
        updates: &UpdateProfileRequest,
    ) -> RepositoryResult<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            r#"
            UPDATE users SET
                bio = COALESCE($2, bio),
                email = COALESCE($3, email),
                phone = COALESCE($4, phone),
                age = COALESCE($5, age),
                language = COALESCE($6, language),
                theme = COALESCE($7, theme),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(id)
        .bind(&updates.bio)
        .bind(&updates.email)
        .bind(&updates.phone)
        .bind(updates.age)
        .bind(&updates.language)
        .bind(updates.theme.as_ref().map(|t| t.to_lowercase()))
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }
}

#[async_trait]
impl TelegramUserStore for PgPool {
    async fn find_by_telegram_id(&self, telegram_id: i64) -> RepositoryResult<Option<UserRecord>> {
        UserRepository::find_by_telegram_id(self, telegram_id).await
    }

    async fn insert_telegram_user(&self, profile: &TelegramProfile) -> RepositoryResult<UserRecord> {
        UserRepository::insert_telegram_user(self, profile).await
    }

    async fn update_telegram_profile(&self, profile: &TelegramProfile) -> RepositoryResult<UserRecord> {
        UserRepository::update_telegram_profile(self, profile).await
    }
}
