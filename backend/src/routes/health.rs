//! Health check endpoints
//!
//! - /health - Basic health check
//! - /health/ready - Readiness probe (database reachable, bot token configured)
//! - /health/live - Liveness probe

use crate::{db, state::AppState};
use axum::{extract::State, http::StatusCode, Json};
use secrecy::ExposeSecret;
use serde::Serialize;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checks: Option<HealthChecks>,
}

/// Individual health checks
#[derive(Serialize)]
pub struct HealthChecks {
    pub database: CheckStatus,
    pub telegram: CheckStatus,
}

/// Status of an individual check
#[derive(Serialize)]
pub struct CheckStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CheckStatus {
    fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            message: None,
        }
    }

    fn unhealthy(message: impl Into<String>) -> Self {
        Self {
            status: "unhealthy".to_string(),
            message: Some(message.into()),
        }
    }

    fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

fn simple(status: &str) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: None,
    })
}

/// Basic health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    simple("healthy")
}

/// Readiness probe
///
/// Without a bot token every login would be rejected, so the instance is
/// not ready either.
pub async fn readiness_check(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let database = match db::health_check(state.db()).await {
        Ok(_) => CheckStatus::healthy(),
        Err(e) => CheckStatus::unhealthy(e.to_string()),
    };
    let telegram = telegram_check(&state);

    let is_ready = database.is_healthy() && telegram.is_healthy();
    let response = HealthResponse {
        status: if is_ready { "ready" } else { "not_ready" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: Some(HealthChecks { database, telegram }),
    };

    if is_ready {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

fn telegram_check(state: &AppState) -> CheckStatus {
    if state.config().telegram.bot_token.expose_secret().is_empty() {
        CheckStatus::unhealthy("bot token not configured")
    } else {
        CheckStatus::healthy()
    }
}

/// Liveness probe - always OK while the server is running
pub async fn liveness_check() -> Json<HealthResponse> {
    simple("alive")
}
