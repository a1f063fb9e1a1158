//! Telegram login flow
//!
//! verify init-data → upsert local user → issue session tokens.
//!
//! Rejections are logged and counted with their reason code; the error that
//! reaches the client renders as a generic "Invalid authentication data".

use crate::auth::{InitDataError, InitDataVerifier, JwtService, VerifiedIdentity};
use crate::error::ApiError;
use crate::repositories::TelegramUserStore;
use crate::services::user::UserService;
use hackathon_shared::{InitDataCheckResponse, TelegramLoginResponse};
use tracing::{info, warn};

/// Counter of login payload verifications, labelled by `outcome`
pub const AUTH_ATTEMPTS_METRIC: &str = "telegram_auth_attempts_total";

/// Telegram authentication service
pub struct TelegramAuthService;

impl TelegramAuthService {
    /// Log a user in from Mini App init-data
    pub async fn login<S>(
        store: &S,
        verifier: &InitDataVerifier,
        jwt_service: &JwtService,
        init_data: &str,
    ) -> Result<TelegramLoginResponse, ApiError>
    where
        S: TelegramUserStore + ?Sized,
    {
        let identity = Self::verify(verifier, init_data)?;
        let outcome = UserService::upsert_telegram_user(store, &identity).await?;

        let tokens = jwt_service.issue_tokens(outcome.user.id, outcome.user.telegram_id)?;

        info!(
            telegram_id = identity.telegram_id,
            user_id = %outcome.user.id,
            created = outcome.created,
            "Telegram login succeeded"
        );

        Ok(TelegramLoginResponse {
            user: outcome.user.into_profile(),
            tokens,
            created: outcome.created,
        })
    }

    /// Verify init-data without touching any user record
    pub fn check(
        verifier: &InitDataVerifier,
        init_data: &str,
    ) -> Result<InitDataCheckResponse, ApiError> {
        let identity = Self::verify(verifier, init_data)?;
        Ok(InitDataCheckResponse {
            valid: true,
            telegram_id: identity.telegram_id,
            auth_date: identity.auth_date,
        })
    }

    fn verify(verifier: &InitDataVerifier, init_data: &str) -> Result<VerifiedIdentity, InitDataError> {
        match verifier.verify(init_data) {
            Ok(identity) => {
                metrics::counter!(AUTH_ATTEMPTS_METRIC, "outcome" => "accepted").increment(1);
                Ok(identity)
            }
            Err(err) => {
                let reason = err.reason_code();
                metrics::counter!(AUTH_ATTEMPTS_METRIC, "outcome" => reason).increment(1);
                warn!(reason, error = %err, "Telegram init data rejected");
                Err(err)
            }
        }
    }
}
