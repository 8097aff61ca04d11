use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set,
};
use serde::Deserialize;
use tokio::sync::Mutex;
use validator::Validate;

use crate::error::ApiError;
use crate::models::shipment::{self, AddShipment, Entity as Shipment, ShipmentResponse};
use crate::tracking::{self, TrackingError, TrackingNumberGenerator};

/// Payload for `PUT /shipments/{id}/status`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateStatus {
    #[validate(length(min = 1, max = 50, message = "Status must be 1 to 50 characters"))]
    pub status: String,
}

/// Shipment CRUD. Creation mints the tracking number.
#[derive(Clone)]
pub struct ShipmentService {
    db: DatabaseConnection,
    generator: TrackingNumberGenerator,
    /// Held from sequence read to insert so two creations never read the same max.
    issue_lock: Arc<Mutex<()>>,
}

impl ShipmentService {
    pub fn new(db: DatabaseConnection, generator: TrackingNumberGenerator) -> Self {
        ShipmentService {
            db,
            generator,
            issue_lock: Arc::new(Mutex::new(())),
        }
    }

    pub async fn create(
        &self,
        payload: AddShipment,
        created_by: &str,
    ) -> Result<ShipmentResponse, ApiError> {
        payload.validate()?;

        let info = payload.basic_information;
        let customer_fields = serde_json::to_value(&payload.customer_fields)
            .map_err(|e| ApiError::Internal(e.to_string()))?;
        let tags =
            serde_json::to_value(&payload.tags).map_err(|e| ApiError::Internal(e.to_string()))?;
        let now = Utc::now().naive_utc();

        let saved = {
            let _guard = self.issue_lock.lock().await;
            let tracking_number = self.generator.generate(&self.db).await?;

            shipment::ActiveModel {
                tracking_number: Set(tracking_number),
                shipment_title: Set(info.shipment_title),
                destination: Set(info.destination),
                barcode: Set(info.barcode),
                origin: Set(info.origin),
                carrier: Set(info.carrier),
                weight: Set(info.weight),
                weight_unit: Set(info.weight_unit),
                dimensions: Set(info.dimensions),
                dimension_unit: Set(info.dimension_unit),
                priority: Set(info.priority),
                estimated_delivery_date: Set(info.estimated_delivery_date),
                customer_fields: Set(customer_fields),
                notes: Set(payload.notes),
                device_information: Set(payload.device_information),
                tags: Set(tags),
                status: Set(shipment::STATUS_CREATED.to_string()),
                created_by: Set(created_by.to_string()),
                last_modified_by: Set(Some(created_by.to_string())),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(&self.db)
            .await?
        };

        tracing::info!(
            tracking_number = %saved.tracking_number,
            %created_by,
            "shipment created"
        );
        Ok(saved.into())
    }

    pub async fn get(&self, id: i32) -> Result<ShipmentResponse, ApiError> {
        Ok(self.find(id).await?.into())
    }

    /// Look up by tracking number. Malformed numbers are rejected before querying.
    pub async fn get_by_tracking_number(
        &self,
        tracking_number: &str,
    ) -> Result<ShipmentResponse, ApiError> {
        if !tracking::validate_format(tracking_number) {
            return Err(TrackingError::InvalidFormat(tracking_number.to_string()).into());
        }

        Shipment::find()
            .filter(shipment::Column::TrackingNumber.eq(tracking_number))
            .one(&self.db)
            .await?
            .map(Into::into)
            .ok_or_else(|| {
                ApiError::NotFound(format!(
                    "Shipment not found with tracking number: {}",
                    tracking_number
                ))
            })
    }

    pub async fn list(&self) -> Result<Vec<ShipmentResponse>, ApiError> {
        let shipments = Shipment::find()
            .order_by_asc(shipment::Column::Id)
            .all(&self.db)
            .await?;
        Ok(shipments.into_iter().map(Into::into).collect())
    }

    pub async fn update_status(
        &self,
        id: i32,
        payload: UpdateStatus,
        updated_by: &str,
    ) -> Result<ShipmentResponse, ApiError> {
        payload.validate()?;
        let status = payload.status.trim().to_uppercase();

        let mut record = self.find(id).await?.into_active_model();
        record.status = Set(status.clone());
        record.last_modified_by = Set(Some(updated_by.to_string()));
        record.updated_at = Set(Utc::now().naive_utc());
        let saved = record.update(&self.db).await?;

        tracing::info!(id, %status, %updated_by, "shipment status updated");
        Ok(saved.into())
    }

    pub async fn delete(&self, id: i32) -> Result<(), ApiError> {
        let existing = self.find(id).await?;
        Shipment::delete_by_id(existing.id).exec(&self.db).await?;
        tracing::info!(id, tracking_number = %existing.tracking_number, "shipment deleted");
        Ok(())
    }

    async fn find(&self, id: i32) -> Result<shipment::Model, ApiError> {
        Shipment::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Shipment not found with id: {}", id)))
    }
}
