use axum::Router;
use axum::http::Uri;
use axum::middleware;
use sea_orm::DatabaseConnection;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};

use crate::auth::authenticate;
use crate::config::Config;
use crate::controllers::{self, AppState};
use crate::error::ApiError;
use crate::extractors::require_role;
use crate::models::user::Role;
use crate::services::CreateUser;

/// The DockerIQ application: database, shared state and router.
pub struct App {
    pub config: Config,
    pub db: DatabaseConnection,
    state: AppState,
}

impl App {
    /// Build the application from environment configuration.
    pub async fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let config = Config::from_env()?;
        Self::with_config(config).await
    }

    /// Build the application with a given config.
    pub async fn with_config(config: Config) -> Result<Self, Box<dyn std::error::Error>> {
        config.validate()?;

        let db = crate::db::connect(&config).await?;
        crate::db::ensure_schema(&db).await?;
        tracing::info!("Database schema ready.");

        let state = AppState::new(db.clone(), config.clone());
        seed_supervisor(&state).await?;

        Ok(App { config, db, state })
    }

    /// Shared state handed to every handler.
    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    pub fn router(&self) -> Router {
        build_router(self.state())
    }

    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let addr = self.config.server_addr();
        let router = self.router();

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        tracing::info!("DockerIQ service running on http://{}", addr);

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

/// Assemble the HTTP surface.
///
/// `/auth` is public. Everything else sits behind the authenticator, and
/// `/users` additionally needs the supervisor role.
pub fn build_router(state: AppState) -> Router {
    let users = controllers::users::routes()
        .layer(middleware::from_fn(require_role(Role::Supervisor)));

    let protected = Router::new()
        .nest("/users", users)
        .nest("/shipments", controllers::shipments::routes())
        .layer(middleware::from_fn_with_state(state.clone(), authenticate));

    let x_request_id = axum::http::HeaderName::from_static("x-request-id");

    Router::new()
        .nest("/auth", controllers::auth::routes())
        .merge(protected)
        .fallback(route_not_found)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(tracing::Level::INFO))
                .on_response(DefaultOnResponse::new().level(tracing::Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(x_request_id, MakeRequestUuid))
}

async fn route_not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("No route for {}", uri.path()))
}

/// Create the configured supervisor when no identity exists yet.
async fn seed_supervisor(state: &AppState) -> Result<(), ApiError> {
    let (Some(email), Some(password)) = (
        state.config.seed_supervisor_email.clone(),
        state.config.seed_supervisor_password.clone(),
    ) else {
        return Ok(());
    };

    if state.users.count().await? > 0 {
        return Ok(());
    }

    let seed = CreateUser {
        email,
        password,
        role: Role::Supervisor,
        active: true,
        first_name: "Default".to_string(),
        last_name: "Supervisor".to_string(),
        address: None,
        phone_number: None,
    };
    let created = state.users.create(seed, Some("system")).await?;
    tracing::info!(email = %created.email, "seeded supervisor account");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down DockerIQ service...");
}
