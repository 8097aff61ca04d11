use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, put},
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::extractors::{Json, Path, Principal};
use crate::models::user::{Role, UserResponse};
use crate::services::{CreateUser, UpdateDetails};

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct ChangeRoleRequest {
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct SetActiveRequest {
    pub active: bool,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Supervisor-only identity management. The role guard is applied by the app router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route(
            "/{email}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/{email}/role", put(change_role))
        .route("/{email}/active", put(set_active))
}

async fn list_users(
    State(state): State<AppState>,
    _principal: Principal,
) -> Result<axum::Json<Vec<UserResponse>>, ApiError> {
    Ok(axum::Json(state.users.list().await?))
}

async fn create_user(
    State(state): State<AppState>,
    principal: Principal,
    Json(payload): Json<CreateUser>,
) -> Result<(StatusCode, axum::Json<UserResponse>), ApiError> {
    let user = state
        .users
        .create(payload, Some(&principal.subject))
        .await?;
    Ok((StatusCode::CREATED, axum::Json(user)))
}

async fn get_user(
    State(state): State<AppState>,
    _principal: Principal,
    Path(email): Path<String>,
) -> Result<axum::Json<UserResponse>, ApiError> {
    Ok(axum::Json(state.users.get(&email).await?))
}

async fn update_user(
    State(state): State<AppState>,
    _principal: Principal,
    Path(email): Path<String>,
    Json(payload): Json<UpdateDetails>,
) -> Result<axum::Json<UserResponse>, ApiError> {
    Ok(axum::Json(state.users.update_details(&email, payload).await?))
}

async fn change_role(
    State(state): State<AppState>,
    _principal: Principal,
    Path(email): Path<String>,
    Json(payload): Json<ChangeRoleRequest>,
) -> Result<axum::Json<UserResponse>, ApiError> {
    Ok(axum::Json(state.users.change_role(&email, payload.role).await?))
}

async fn set_active(
    State(state): State<AppState>,
    principal: Principal,
    Path(email): Path<String>,
    Json(payload): Json<SetActiveRequest>,
) -> Result<axum::Json<UserResponse>, ApiError> {
    if !payload.active && principal.subject == email {
        return Err(ApiError::BadRequest(
            "Cannot deactivate your own account".to_string(),
        ));
    }
    Ok(axum::Json(state.users.set_active(&email, payload.active).await?))
}

async fn delete_user(
    State(state): State<AppState>,
    principal: Principal,
    Path(email): Path<String>,
) -> Result<axum::Json<MessageResponse>, ApiError> {
    if principal.subject == email {
        return Err(ApiError::BadRequest(
            "Cannot delete your own account".to_string(),
        ));
    }
    state.users.delete(&email).await?;
    Ok(axum::Json(MessageResponse {
        message: "User deleted successfully".to_string(),
    }))
}
