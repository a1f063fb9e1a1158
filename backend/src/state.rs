//! Application state management
//!
//! This module provides the shared application state that is passed
//! to all request handlers via Axum's state extraction.
//!
//! Expensive resources (JWT keys, the init-data signing key, the DB pool)
//! are created once; every field clones in O(1).

use crate::auth::{InitDataVerifier, JwtService};
use crate::config::AppConfig;
use chrono::Duration;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Pre-initialized JWT service with cached keys
    pub jwt: JwtService,
    /// Init-data verifier with the derived bot key
    pub verifier: InitDataVerifier,
}

impl AppState {
    /// Create a new application state
    ///
    /// Derives the JWT keys and the init-data key from the configured
    /// secrets; call once at startup.
    pub fn new(db: PgPool, config: AppConfig) -> Self {
        let jwt = JwtService::new(
            &config.jwt.secret,
            config.jwt.access_token_expiry_secs,
            config.jwt.refresh_token_expiry_secs,
        );

        let telegram = &config.telegram;
        let verifier = InitDataVerifier::new(telegram.bot_token.expose_secret(), telegram.scheme)
            .with_max_age(Duration::seconds(telegram.max_age_secs))
            .with_clock_skew(Duration::seconds(telegram.clock_skew_secs));

        Self {
            db,
            config: Arc::new(config),
            jwt,
            verifier,
        }
    }

    #[inline]
    pub fn db(&self) -> &PgPool {
        &self.db
    }

    #[inline]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    #[inline]
    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }

    #[inline]
    pub fn verifier(&self) -> &InitDataVerifier {
        &self.verifier
    }
}
