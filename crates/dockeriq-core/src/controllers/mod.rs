use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::auth::{AuthService, TokenService};
use crate::config::Config;
use crate::services::{ShipmentService, UserService};
use crate::store::IdentityStore;
use crate::tracking::TrackingNumberGenerator;

/// Shared application state available in all handlers.
///
/// Everything here is built once at startup and never mutated.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<Config>,
    pub tokens: Arc<TokenService>,
    pub identities: Arc<dyn IdentityStore>,
    pub auth: AuthService,
    pub users: UserService,
    pub shipments: ShipmentService,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: Config) -> Self {
        let tokens = Arc::new(TokenService::new(
            &config.jwt_secret,
            chrono::Duration::minutes(config.jwt_expiry_minutes),
        ));
        let identities: Arc<dyn IdentityStore> = Arc::new(db.clone());
        let generator = TrackingNumberGenerator::new(config.tracking_prefix.clone());

        AppState {
            auth: AuthService::new(identities.clone(), tokens.clone()),
            users: UserService::new(db.clone()),
            shipments: ShipmentService::new(db.clone(), generator),
            db,
            config: Arc::new(config),
            tokens,
            identities,
        }
    }
}

pub mod auth;
pub mod shipments;
pub mod users;
