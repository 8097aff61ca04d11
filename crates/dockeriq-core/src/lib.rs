pub mod app;
pub mod auth;
pub mod config;
pub mod controllers;
pub mod db;
pub mod error;
pub mod extractors;
pub mod logging;
pub mod models;
pub mod services;
pub mod store;
pub mod testing;
pub mod tracking;

pub use app::App;
pub use config::Config;
pub use error::ApiError;
pub use testing::{TestApp, TestClient, TestResponse};
pub use tracking::TrackingNumberGenerator;
