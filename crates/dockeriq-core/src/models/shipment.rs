use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use validator::Validate;

pub const STATUS_CREATED: &str = "CREATED";

/// Shipment entity. The basic information block is flattened into columns.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "shipments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub tracking_number: String,

    pub shipment_title: String,
    pub destination: String,
    pub barcode: Option<String>,
    pub origin: Option<String>,
    pub carrier: Option<String>,
    pub weight: Option<f64>,
    pub weight_unit: Option<String>,
    pub dimensions: Option<f64>,
    pub dimension_unit: Option<String>,
    pub priority: Option<String>,
    pub estimated_delivery_date: Option<String>,

    /// String map, stored as a JSON object
    pub customer_fields: Json,

    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub device_information: Option<String>,

    /// String list, stored as a JSON array
    pub tags: Json,

    pub status: String,

    pub created_by: String,
    pub last_modified_by: Option<String>,

    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Descriptive block of a shipment, shared by requests and responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BasicInformation {
    #[validate(length(min = 1, max = 100, message = "Shipment title must be 1 to 100 characters"))]
    pub shipment_title: String,

    #[validate(length(min = 1, max = 200, message = "Destination must be 1 to 200 characters"))]
    pub destination: String,

    pub barcode: Option<String>,
    pub origin: Option<String>,
    pub carrier: Option<String>,
    pub weight: Option<f64>,
    pub weight_unit: Option<String>,
    pub dimensions: Option<f64>,
    pub dimension_unit: Option<String>,
    pub priority: Option<String>,
    pub estimated_delivery_date: Option<String>,
}

/// Payload for `POST /shipments`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddShipment {
    #[validate(nested)]
    pub basic_information: BasicInformation,

    #[serde(default)]
    pub customer_fields: BTreeMap<String, String>,

    #[validate(length(max = 1000, message = "Notes cannot exceed 1000 characters"))]
    pub notes: Option<String>,

    #[validate(length(max = 500, message = "Device information cannot exceed 500 characters"))]
    pub device_information: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentResponse {
    pub id: i32,
    pub tracking_number: String,
    pub basic_information: BasicInformation,
    pub customer_fields: BTreeMap<String, String>,
    pub notes: Option<String>,
    pub device_information: Option<String>,
    pub tags: Vec<String>,
    pub status: String,
    pub created_by: String,
    pub last_modified_by: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<Model> for ShipmentResponse {
    fn from(s: Model) -> Self {
        ShipmentResponse {
            id: s.id,
            tracking_number: s.tracking_number,
            basic_information: BasicInformation {
                shipment_title: s.shipment_title,
                destination: s.destination,
                barcode: s.barcode,
                origin: s.origin,
                carrier: s.carrier,
                weight: s.weight,
                weight_unit: s.weight_unit,
                dimensions: s.dimensions,
                dimension_unit: s.dimension_unit,
                priority: s.priority,
                estimated_delivery_date: s.estimated_delivery_date,
            },
            customer_fields: serde_json::from_value(s.customer_fields).unwrap_or_default(),
            notes: s.notes,
            device_information: s.device_information,
            tags: serde_json::from_value(s.tags).unwrap_or_default(),
            status: s.status,
            created_by: s.created_by,
            last_modified_by: s.last_modified_by,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}
