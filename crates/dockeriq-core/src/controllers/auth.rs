use axum::{
    Router,
    extract::State,
    http::HeaderMap,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use crate::auth::{LoginOutcome, bearer_token, resolve_principal};
use crate::error::ApiError;
use crate::extractors::Json;

use super::AppState;

// ── Request / Response types ──

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
}

// ── Routes ──

/// Public routes; mounted outside the authenticator layer.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/validate", get(validate))
}

async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<axum::Json<LoginOutcome>, ApiError> {
    let outcome = state
        .auth
        .authenticate(payload.email.trim(), &payload.password)
        .await?;
    Ok(axum::Json(outcome))
}

/// `{"valid": true}` only for a token the authenticator would accept.
async fn validate(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<axum::Json<ValidateResponse>, ApiError> {
    let token =
        bearer_token(&headers).ok_or_else(|| ApiError::BadRequest("Invalid token".to_string()))?;

    let claims = match state.tokens.verify(token) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::debug!(error = %e, "token failed validation");
            return Ok(axum::Json(ValidateResponse { valid: false }));
        }
    };

    // A good signature is not enough; the stored identity must still match.
    let valid = match resolve_principal(&state, &claims).await {
        Ok(_) => true,
        Err(ApiError::Unauthorized(_) | ApiError::Forbidden(_)) => false,
        Err(e) => return Err(e),
    };

    Ok(axum::Json(ValidateResponse { valid }))
}
