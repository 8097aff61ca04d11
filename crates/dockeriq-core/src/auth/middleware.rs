use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::auth::Claims;
use crate::controllers::AppState;
use crate::error::ApiError;
use crate::extractors::Principal;
use crate::models::user::authority_for;

pub const USER_NOT_FOUND: &str = "User not found";
pub const ROLE_MISMATCH: &str = "Role is null or empty or does not match";
pub const ACCOUNT_INACTIVE: &str = "User account is inactive";

/// Token from an `Authorization: Bearer <token>` header, if there is one.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

/// Middleware that turns a bearer token into a [`Principal`].
///
/// Requests without a bearer header pass through untouched; route guards
/// decide whether they may proceed. A presented token must verify, name an
/// existing identity, carry that identity's current role and belong to an
/// active account, otherwise the request stops here.
///
/// ```rust,ignore
/// Router::new()
///     .nest("/shipments", shipments::routes())
///     .layer(middleware::from_fn_with_state(state.clone(), authenticate))
/// ```
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(token) = bearer_token(req.headers()).map(str::to_owned) else {
        return Ok(next.run(req).await);
    };

    let claims = state.tokens.verify(&token).map_err(|e| {
        tracing::warn!(error = %e, path = %req.uri().path(), "rejected bearer token");
        ApiError::Unauthorized(e.to_string())
    })?;

    let principal = resolve_principal(&state, &claims).await?;
    req.extensions_mut().insert(principal);

    Ok(next.run(req).await)
}

/// Match verified claims against the stored identity.
///
/// The subject must exist, the role claim must equal its current role and
/// the account must be active.
pub async fn resolve_principal(state: &AppState, claims: &Claims) -> Result<Principal, ApiError> {
    let identity = state
        .identities
        .find_identity(&claims.sub)
        .await?
        .ok_or_else(|| {
            tracing::warn!(subject = %claims.sub, "token subject has no identity");
            ApiError::Unauthorized(USER_NOT_FOUND.to_string())
        })?;

    if claims.role.is_empty() || claims.role != identity.role {
        tracing::warn!(
            subject = %claims.sub,
            token_role = %claims.role,
            current_role = %identity.role,
            "token role is stale"
        );
        return Err(ApiError::Forbidden(ROLE_MISMATCH.to_string()));
    }

    if !identity.active {
        tracing::warn!(subject = %claims.sub, "token presented for inactive account");
        return Err(ApiError::Forbidden(ACCOUNT_INACTIVE.to_string()));
    }

    Ok(Principal {
        authority: authority_for(&identity.role),
        subject: identity.email,
        role: identity.role,
    })
}
