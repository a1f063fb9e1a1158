//! Session tokens
//!
//! After a Telegram login the backend hands out its own HS256 JWT pair:
//! a short-lived access token and a longer-lived refresh token. Keys are
//! derived once at startup and shared through `AppState`.

use anyhow::Result;
use chrono::{Duration, Utc};
use hackathon_shared::AuthTokens;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Kind of session token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
        }
    }
}

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (local user ID)
    pub sub: String,
    /// Telegram user ID the session was issued for
    pub tg: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    pub token_type: TokenType,
}

impl Claims {
    /// Parse the subject back into a user ID
    pub fn user_id(&self) -> Result<Uuid> {
        Uuid::parse_str(&self.sub).map_err(|_| anyhow::anyhow!("Invalid user ID in token"))
    }
}

/// Pre-computed JWT keys, shared across clones
#[derive(Clone)]
struct JwtKeys {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
}

impl JwtKeys {
    fn new(secret: &str) -> Self {
        Self {
            encoding: Arc::new(EncodingKey::from_secret(secret.as_bytes())),
            decoding: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
        }
    }
}

/// JWT service for session token operations
///
/// Create once at startup and store in `AppState`; do not build per request.
#[derive(Clone)]
pub struct JwtService {
    keys: JwtKeys,
    access_token_expiry_secs: i64,
    refresh_token_expiry_secs: i64,
}

impl JwtService {
    pub fn new(secret: &str, access_token_expiry_secs: i64, refresh_token_expiry_secs: i64) -> Self {
        Self {
            keys: JwtKeys::new(secret),
            access_token_expiry_secs,
            refresh_token_expiry_secs,
        }
    }

    /// Issue an access + refresh token pair for a user
    pub fn issue_tokens(&self, user_id: Uuid, telegram_id: i64) -> Result<AuthTokens> {
        Ok(AuthTokens {
            access_token: self.generate_token(user_id, telegram_id, TokenType::Access)?,
            refresh_token: self.generate_token(user_id, telegram_id, TokenType::Refresh)?,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_expiry_secs,
        })
    }

    fn generate_token(&self, user_id: Uuid, telegram_id: i64, token_type: TokenType) -> Result<String> {
        let expiry_secs = match token_type {
            TokenType::Access => self.access_token_expiry_secs,
            TokenType::Refresh => self.refresh_token_expiry_secs,
        };
        let now = Utc::now();
        let exp = now + Duration::seconds(expiry_secs);

        let claims = Claims {
            sub: user_id.to_string(),
            tg: telegram_id,
            exp: exp.timestamp(),
            iat: now.timestamp(),
            token_type,
        };

        encode(&Header::default(), &claims, &self.keys.encoding)
            .map_err(|e| anyhow::anyhow!("Failed to generate {} token: {}", token_type.as_str(), e))
    }

    /// Validate a token of the expected type and return its claims
    pub fn validate(&self, token: &str, expected: TokenType) -> Result<Claims> {
        let token_data = decode::<Claims>(token, &self.keys.decoding, &Validation::default())
            .map_err(|e| anyhow::anyhow!("Invalid token: {}", e))?;

        if token_data.claims.token_type != expected {
            return Err(anyhow::anyhow!("Not an {} token", expected.as_str()));
        }
        Ok(token_data.claims)
    }
}
