use std::future::Future;
use std::pin::Pin;

use axum::{extract::Request, middleware::Next, response::Response};

use crate::error::ApiError;
use crate::extractors::principal::{AUTHENTICATION_REQUIRED, Principal};
use crate::models::user::Role;

/// Middleware that requires the principal to hold `required`.
///
/// Must sit inside the `authenticate` layer so the principal is already resolved.
///
/// ```rust,ignore
/// use axum::middleware;
///
/// Router::new()
///     .nest("/users", users::routes())
///     .layer(middleware::from_fn(require_role(Role::Supervisor)))
/// ```
pub fn require_role(
    required: Role,
) -> impl Fn(Request, Next) -> Pin<Box<dyn Future<Output = Result<Response, ApiError>> + Send>>
+ Clone
+ Send
+ Sync
+ 'static {
    move |req: Request, next: Next| {
        Box::pin(async move {
            let principal = req
                .extensions()
                .get::<Principal>()
                .ok_or_else(|| ApiError::Unauthorized(AUTHENTICATION_REQUIRED.to_string()))?;

            if !principal.has_authority(&required.authority()) {
                tracing::warn!(
                    subject = %principal.subject,
                    authority = %principal.authority,
                    required = %required,
                    "insufficient privileges"
                );
                return Err(ApiError::Forbidden(format!(
                    "Insufficient privileges - {} role required",
                    required.label()
                )));
            }

            Ok(next.run(req).await)
        })
    }
}
