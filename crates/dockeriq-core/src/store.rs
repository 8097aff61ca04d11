//! Storage seams used by the auth core and the tracking-number generator.
//!
//! Production code implements them on [`DatabaseConnection`]; tests can
//! swap in anything that answers the same questions.

use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QuerySelect,
};

use crate::models::shipment::{self, Entity as Shipment};
use crate::models::user::{self, Entity as User};
use crate::models::user_details::{self, Entity as UserDetails};

/// Looks up identities and their profiles by email.
#[async_trait::async_trait]
pub trait IdentityStore: Send + Sync {
    async fn find_identity(&self, email: &str) -> Result<Option<user::Model>, DbErr>;

    async fn find_details(&self, email: &str) -> Result<Option<user_details::Model>, DbErr>;
}

/// Answers prefix scans over persisted tracking numbers.
#[async_trait::async_trait]
pub trait TrackingNumberSource: Send + Sync {
    async fn tracking_numbers_with_prefix(&self, prefix: &str) -> Result<Vec<String>, DbErr>;
}

#[async_trait::async_trait]
impl IdentityStore for DatabaseConnection {
    async fn find_identity(&self, email: &str) -> Result<Option<user::Model>, DbErr> {
        User::find()
            .filter(user::Column::Email.eq(email))
            .one(self)
            .await
    }

    async fn find_details(&self, email: &str) -> Result<Option<user_details::Model>, DbErr> {
        UserDetails::find()
            .filter(user_details::Column::Email.eq(email))
            .one(self)
            .await
    }
}

#[async_trait::async_trait]
impl TrackingNumberSource for DatabaseConnection {
    async fn tracking_numbers_with_prefix(&self, prefix: &str) -> Result<Vec<String>, DbErr> {
        Shipment::find()
            .select_only()
            .column(shipment::Column::TrackingNumber)
            .filter(shipment::Column::TrackingNumber.starts_with(prefix))
            .into_tuple::<String>()
            .all(self)
            .await
    }
}
