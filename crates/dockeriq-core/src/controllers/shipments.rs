use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, put},
};

use crate::error::ApiError;
use crate::extractors::{Json, Path, Principal};
use crate::models::shipment::{AddShipment, ShipmentResponse};
use crate::services::UpdateStatus;

use super::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_shipments).post(create_shipment))
        .route("/{id}", get(get_shipment).delete(delete_shipment))
        .route("/{id}/status", put(update_status))
        .route("/tracking/{tracking_number}", get(get_by_tracking_number))
}

async fn create_shipment(
    State(state): State<AppState>,
    principal: Principal,
    Json(payload): Json<AddShipment>,
) -> Result<(StatusCode, axum::Json<ShipmentResponse>), ApiError> {
    let shipment = state.shipments.create(payload, &principal.subject).await?;
    Ok((StatusCode::CREATED, axum::Json(shipment)))
}

async fn list_shipments(
    State(state): State<AppState>,
    _principal: Principal,
) -> Result<axum::Json<Vec<ShipmentResponse>>, ApiError> {
    Ok(axum::Json(state.shipments.list().await?))
}

async fn get_shipment(
    State(state): State<AppState>,
    _principal: Principal,
    Path(id): Path<i32>,
) -> Result<axum::Json<ShipmentResponse>, ApiError> {
    Ok(axum::Json(state.shipments.get(id).await?))
}

async fn get_by_tracking_number(
    State(state): State<AppState>,
    _principal: Principal,
    Path(tracking_number): Path<String>,
) -> Result<axum::Json<ShipmentResponse>, ApiError> {
    Ok(axum::Json(
        state.shipments.get_by_tracking_number(&tracking_number).await?,
    ))
}

async fn update_status(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateStatus>,
) -> Result<axum::Json<ShipmentResponse>, ApiError> {
    Ok(axum::Json(
        state
            .shipments
            .update_status(id, payload, &principal.subject)
            .await?,
    ))
}

async fn delete_shipment(
    State(state): State<AppState>,
    _principal: Principal,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    state.shipments.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
