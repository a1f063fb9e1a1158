//! Telegram login payload verification
//!
//! Verifies that init-data was signed by Telegram for our bot and is fresh:
//!
//! 1. the `hash` field is detached from the payload;
//! 2. the remaining fields are canonicalized (sorted `key=value` lines);
//! 3. a per-bot key is derived from the bot token;
//! 4. HMAC-SHA256 of the canonical string under that key must equal `hash`
//!    (compared in constant time);
//! 5. `auth_date` must be within the staleness window.
//!
//! The bot token is passed in explicitly and the derived key is computed
//! once, when the verifier is built.

use super::init_data::{data_check_string, LoginPayload};
use chrono::{DateTime, Duration, TimeZone, Utc};
use hackathon_shared::WebAppUser;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Constant the Mini App scheme HMACs the bot token with
const WEB_APP_DATA: &[u8] = b"WebAppData";

/// Default staleness threshold (24 hours)
pub const DEFAULT_MAX_AGE_SECS: i64 = 86_400;

/// Default tolerance for `auth_date` values slightly in the future
pub const DEFAULT_CLOCK_SKEW_SECS: i64 = 60;

/// Why a payload was rejected
///
/// The reason is meant for logs and metrics. Callers must only ever see a
/// generic "invalid authentication data".
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InitDataError {
    #[error("init data has no signature")]
    MissingSignature,

    #[error("init data signature does not match")]
    SignatureMismatch,

    #[error("init data is stale ({age_secs}s old)")]
    StalePayload { age_secs: i64 },

    #[error("malformed init data: {0}")]
    MalformedPayload(String),
}

impl InitDataError {
    /// Stable reason code for logs and metrics
    pub fn reason_code(&self) -> &'static str {
        match self {
            InitDataError::MissingSignature => "missing_signature",
            InitDataError::SignatureMismatch => "signature_mismatch",
            InitDataError::StalePayload { .. } => "stale_payload",
            InitDataError::MalformedPayload(_) => "malformed_payload",
        }
    }
}

/// How the signing key is derived from the bot token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitDataScheme {
    /// Mini App init-data: `HMAC_SHA256(key = "WebAppData", msg = bot_token)`
    ///
    /// The constant is the HMAC key and the bot token the message, as
    /// Telegram computes it. Swapping the two makes every real payload fail.
    #[default]
    MiniApp,
    /// Login Widget data: `SHA256(bot_token)`
    LoginWidget,
}

impl InitDataScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            InitDataScheme::MiniApp => "mini_app",
            InitDataScheme::LoginWidget => "login_widget",
        }
    }

    fn derive_key(self, bot_token: &[u8]) -> [u8; 32] {
        match self {
            InitDataScheme::MiniApp => hmac_sha256(WEB_APP_DATA, bot_token),
            InitDataScheme::LoginWidget => Sha256::digest(bot_token).into(),
        }
    }
}

/// Identity extracted from a payload that passed every check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub telegram_id: i64,
    pub user: WebAppUser,
    pub auth_date: DateTime<Utc>,
    /// Every signed field of the payload (the signature excluded)
    pub fields: BTreeMap<String, String>,
}

/// Verifier for Telegram-signed login payloads
///
/// Cloning is cheap: the derived key is shared behind an `Arc`.
#[derive(Clone)]
pub struct InitDataVerifier {
    secret_key: Arc<[u8; 32]>,
    scheme: InitDataScheme,
    max_age: Duration,
    clock_skew: Duration,
}

impl fmt::Debug for InitDataVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InitDataVerifier")
            .field("scheme", &self.scheme)
            .field("max_age_secs", &self.max_age.num_seconds())
            .field("clock_skew_secs", &self.clock_skew.num_seconds())
            .finish_non_exhaustive()
    }
}

impl InitDataVerifier {
    /// Build a verifier for the given bot token
    ///
    /// Uses a 24 hour staleness window; see [`Self::with_max_age`].
    pub fn new(bot_token: &str, scheme: InitDataScheme) -> Self {
        Self {
            secret_key: Arc::new(scheme.derive_key(bot_token.as_bytes())),
            scheme,
            max_age: Duration::seconds(DEFAULT_MAX_AGE_SECS),
            clock_skew: Duration::seconds(DEFAULT_CLOCK_SKEW_SECS),
        }
    }

    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    pub fn with_clock_skew(mut self, clock_skew: Duration) -> Self {
        self.clock_skew = clock_skew;
        self
    }

    pub fn scheme(&self) -> InitDataScheme {
        self.scheme
    }

    /// Verify a raw init-data string against the current time
    pub fn verify(&self, raw: &str) -> Result<VerifiedIdentity, InitDataError> {
        self.verify_at(raw, Utc::now())
    }

    /// Verify a raw init-data string as of `now`
    pub fn verify_at(&self, raw: &str, now: DateTime<Utc>) -> Result<VerifiedIdentity, InitDataError> {
        let payload = LoginPayload::parse(raw)?;
        self.verify_payload(payload, now)
    }

    /// Verify an already decoded payload as of `now`
    pub fn verify_payload(
        &self,
        payload: LoginPayload,
        now: DateTime<Utc>,
    ) -> Result<VerifiedIdentity, InitDataError> {
        self.check_signature(&payload)?;

        let auth_date = parse_auth_date(&payload)?;
        let age = now.signed_duration_since(auth_date);
        if age > self.max_age || age < -self.clock_skew {
            return Err(InitDataError::StalePayload {
                age_secs: age.num_seconds(),
            });
        }

        let user = extract_user(&payload)?;
        Ok(VerifiedIdentity {
            telegram_id: user.id,
            user,
            auth_date,
            fields: payload.into_fields(),
        })
    }

    /// Hex HMAC of the given fields under this verifier's key
    ///
    /// A `hash` entry in `fields` is ignored.
    pub fn sign(&self, fields: &BTreeMap<String, String>) -> String {
        let payload = LoginPayload::from_fields(fields.clone());
        hex::encode(hmac_sha256(self.secret_key.as_ref(), payload.data_check_string().as_bytes()))
    }

    fn check_signature(&self, payload: &LoginPayload) -> Result<(), InitDataError> {
        let received = payload
            .signature()
            .filter(|s| !s.is_empty())
            .ok_or(InitDataError::MissingSignature)?;

        // A signature that is not hex can never match
        let received = hex::decode(received).map_err(|_| InitDataError::SignatureMismatch)?;

        let mut mac = new_mac(self.secret_key.as_ref());
        mac.update(data_check_string(payload.fields()).as_bytes());
        // verify_slice compares in constant time
        mac.verify_slice(&received)
            .map_err(|_| InitDataError::SignatureMismatch)
    }
}

fn new_mac(key: &[u8]) -> HmacSha256 {
    HmacSha256::new_from_slice(key).expect("HMAC-SHA256 accepts keys of any length")
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> [u8; 32] {
    let mut mac = new_mac(key);
    mac.update(data);
    mac.finalize().into_bytes().into()
}

fn parse_auth_date(payload: &LoginPayload) -> Result<DateTime<Utc>, InitDataError> {
    let raw = payload
        .get("auth_date")
        .ok_or_else(|| InitDataError::MalformedPayload("missing auth_date".to_string()))?;
    let secs: i64 = raw
        .parse()
        .map_err(|_| InitDataError::MalformedPayload(format!("non-numeric auth_date: {}", raw)))?;
    Utc.timestamp_opt(secs, 0)
        .single()
        .ok_or_else(|| InitDataError::MalformedPayload(format!("auth_date out of range: {}", secs)))
}

/// Mini App payloads carry the user as JSON in `user`; Login Widget payloads
/// carry flat `id`/`first_name`/... fields.
fn extract_user(payload: &LoginPayload) -> Result<WebAppUser, InitDataError> {
    let user = match payload.get("user") {
        Some(json) => serde_json::from_str::<WebAppUser>(json)
            .map_err(|e| InitDataError::MalformedPayload(format!("invalid user field: {}", e)))?,
        None => {
            let id = payload
                .get("id")
                .ok_or_else(|| InitDataError::MalformedPayload("missing user id".to_string()))?;
            let id = id
                .parse()
                .map_err(|_| InitDataError::MalformedPayload(format!("non-numeric user id: {}", id)))?;
            let optional = |key: &str| payload.get(key).filter(|v| !v.is_empty()).map(str::to_string);
            WebAppUser {
                id,
                first_name: payload.get("first_name").unwrap_or_default().to_string(),
                last_name: optional("last_name"),
                username: optional("username"),
                photo_url: optional("photo_url"),
                language_code: optional("language_code"),
                is_premium: payload.get("is_premium") == Some("true"),
            }
        }
    };

    if user.id <= 0 {
        return Err(InitDataError::MalformedPayload(format!(
            "invalid user id: {}",
            user.id
        )));
    }
    Ok(user)
}
