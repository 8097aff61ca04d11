use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::auth::jwt::TokenService;
use crate::auth::password;
use crate::error::ApiError;
use crate::models::user;
use crate::store::IdentityStore;

/// Message returned for every failed login, whatever the cause.
pub const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Why a login attempt was refused. Only ever logged; callers see [`INVALID_CREDENTIALS`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    #[error("no identity with that email")]
    NotFound,

    #[error("identity is deactivated")]
    Inactive,

    #[error("password does not match")]
    BadPassword,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Failure(#[from] AuthFailure),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Failure(_) => ApiError::BadRequest(INVALID_CREDENTIALS.to_string()),
            AuthError::Api(e) => e,
        }
    }
}

/// Successful login: a fresh token plus basic profile fields.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginOutcome {
    pub token: String,
    pub email: String,
    pub role: String,
    pub first_name: String,
    pub last_name: String,
}

/// Checks credentials and issues session tokens.
#[derive(Clone)]
pub struct AuthService {
    identities: Arc<dyn IdentityStore>,
    tokens: Arc<TokenService>,
}

impl AuthService {
    pub fn new(identities: Arc<dyn IdentityStore>, tokens: Arc<TokenService>) -> Self {
        AuthService { identities, tokens }
    }

    pub async fn authenticate(&self, email: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let result = self.try_authenticate(email, password).await;
        if let Err(AuthError::Failure(reason)) = &result {
            tracing::warn!(%email, %reason, "login refused");
        }
        result
    }

    async fn try_authenticate(&self, email: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let identity = self
            .identities
            .find_identity(email)
            .await
            .map_err(ApiError::from)?
            .ok_or(AuthFailure::NotFound)?;

        if !identity.active {
            return Err(AuthFailure::Inactive.into());
        }

        if !password::verify_password(password, &identity.password_hash)? {
            return Err(AuthFailure::BadPassword.into());
        }

        let token = self
            .tokens
            .issue(&identity.email, &identity.role)
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        let details = self
            .identities
            .find_details(&identity.email)
            .await
            .map_err(ApiError::from)?;
        let (first_name, last_name) = details
            .map(|d| (d.first_name, d.last_name))
            .unwrap_or_default();

        tracing::info!(email = %identity.email, role = %identity.role, "login succeeded");

        Ok(LoginOutcome {
            token,
            email: identity.email,
            role: identity.role,
            first_name,
            last_name,
        })
    }

    /// Replace the stored password with its hash unless it is already hashed.
    ///
    /// Safe to call any number of times on the same identity.
    pub fn encode_password(identity: &mut user::Model) -> Result<(), ApiError> {
        identity.password_hash = password::encode_password(&identity.password_hash)?;
        Ok(())
    }
}
