use serde::Deserialize;
use thiserror::Error;

const DEV_JWT_SECRET: &str = "dockeriq-dev-secret-change-me";

/// Errors raised while reading configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} has an invalid value: {value}")]
    InvalidValue { name: &'static str, value: String },

    #[error("{0} must be set outside development")]
    Missing(&'static str),
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Database connection URL (e.g. sqlite://dockeriq.db?mode=rwc, postgres://...)
    pub database_url: String,

    /// HS256 signing secret for session tokens
    pub jwt_secret: String,

    /// Session token lifetime in minutes (default: 60)
    pub jwt_expiry_minutes: i64,

    /// Four uppercase letters that start every tracking number (default: DKIQ)
    pub tracking_prefix: String,

    /// Server host (default: 127.0.0.1)
    pub server_host: String,

    /// Server port (default: 8080)
    pub server_port: u16,

    /// Environment: development, production, test
    pub environment: String,

    /// Supervisor account created when the users table is empty
    pub seed_supervisor_email: Option<String>,
    pub seed_supervisor_password: Option<String>,
}

impl Config {
    /// Load configuration from environment variables (with .env support).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if missing)
        let _ = dotenvy::dotenv();

        let environment =
            std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let jwt_secret = match std::env::var("JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ if environment == "development" || environment == "test" => {
                tracing::warn!("JWT_SECRET not set, using the development secret");
                DEV_JWT_SECRET.to_string()
            }
            _ => return Err(ConfigError::Missing("JWT_SECRET")),
        };

        let config = Config {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://dockeriq.db?mode=rwc".to_string()),
            jwt_secret,
            jwt_expiry_minutes: parse_var("JWT_EXPIRY_MINUTES", 60)?,
            tracking_prefix: std::env::var("TRACKING_PREFIX")
                .unwrap_or_else(|_| "DKIQ".to_string()),
            server_host: std::env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: parse_var("SERVER_PORT", 8080)?,
            environment,
            seed_supervisor_email: std::env::var("SEED_SUPERVISOR_EMAIL").ok(),
            seed_supervisor_password: std::env::var("SEED_SUPERVISOR_PASSWORD").ok(),
        };

        config.validate()?;
        Ok(config)
    }

    /// Check values that have a fixed shape.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let prefix_ok = self.tracking_prefix.len() == 4
            && self.tracking_prefix.bytes().all(|b| b.is_ascii_uppercase());
        if !prefix_ok {
            return Err(ConfigError::InvalidValue {
                name: "TRACKING_PREFIX",
                value: self.tracking_prefix.clone(),
            });
        }

        if self.jwt_expiry_minutes <= 0 {
            return Err(ConfigError::InvalidValue {
                name: "JWT_EXPIRY_MINUTES",
                value: self.jwt_expiry_minutes.to_string(),
            });
        }

        Ok(())
    }

    /// Check if running in development mode.
    pub fn is_dev(&self) -> bool {
        self.environment == "development"
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value: raw }),
        Err(_) => Ok(default),
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_url: "sqlite::memory:".to_string(),
            jwt_secret: DEV_JWT_SECRET.to_string(),
            jwt_expiry_minutes: 60,
            tracking_prefix: "DKIQ".to_string(),
            server_host: "127.0.0.1".to_string(),
            server_port: 8080,
            environment: "development".to_string(),
            seed_supervisor_email: None,
            seed_supervisor_password: None,
        }
    }
}
