use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::ApiError;

pub const AUTHENTICATION_REQUIRED: &str = "Authentication required";

/// Authenticated caller, placed in request extensions by
/// [`authenticate`](crate::auth::middleware::authenticate).
///
/// Handlers that take a `Principal` argument are only reachable with a
/// valid bearer token:
/// ```rust,ignore
/// async fn my_handler(principal: Principal) -> impl IntoResponse {
///     // principal.subject is the caller's email
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Identity email
    pub subject: String,
    /// Current role, canonical case
    pub role: String,
    /// `"ROLE_" + role.uppercase()`
    pub authority: String,
}

impl Principal {
    pub fn has_authority(&self, authority: &str) -> bool {
        self.authority == authority
    }
}

impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .ok_or_else(|| ApiError::Unauthorized(AUTHENTICATION_REQUIRED.to_string()))
    }
}
