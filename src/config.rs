use anyhow::Result;
use config::{Config, ConfigError, Environment, File};
use model::repositories::DbActivityRepository;
use sea_orm::Database;
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;

use crate::auth::JwtService;
use crate::schemas::AppState;

/// Runtime configuration.
///
/// Values are layered: built-in defaults, then an optional `backoffice.toml`,
/// then `BACKOFFICE__*` environment variables (after `.env` is loaded).
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_address: String,
    pub jwt_secret: String,
    /// Lifetime of issued bearer tokens
    pub jwt_expiry_seconds: i64,
    /// Root directory for uploaded files; channel logos go to `<upload_dir>/channels`
    pub upload_dir: PathBuf,
    pub max_upload_mb: usize,
    /// Default page size of the activity listings
    pub activity_per_page: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://backoffice.db?mode=rwc".to_string(),
            bind_address: "0.0.0.0:3000".to_string(),
            jwt_secret: "change-me".to_string(),
            jwt_expiry_seconds: 60 * 60 * 24,
            upload_dir: PathBuf::from("public/upload"),
            max_upload_mb: 2,
            activity_per_page: common::DEFAULT_PER_PAGE,
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, `backoffice.toml` and the environment
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();
        Config::builder()
            .set_default("database_url", defaults.database_url)?
            .set_default("bind_address", defaults.bind_address)?
            .set_default("jwt_secret", defaults.jwt_secret)?
            .set_default("jwt_expiry_seconds", defaults.jwt_expiry_seconds)?
            .set_default("upload_dir", defaults.upload_dir.to_string_lossy().to_string())?
            .set_default("max_upload_mb", defaults.max_upload_mb as u64)?
            .set_default("activity_per_page", defaults.activity_per_page)?
            .add_source(File::with_name("backoffice").required(false))
            .add_source(Environment::with_prefix("BACKOFFICE").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// Maximum accepted upload size in bytes
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb * 1024 * 1024
    }
}

/// Initialize application state from a loaded configuration
pub async fn initialize_app_state(config: AppConfig) -> Result<AppState> {
    tracing::info!("Connecting to database: {}", config.database_url);
    let db = Database::connect(&config.database_url).await?;

    Ok(build_app_state(db, config))
}

/// Wire an existing connection into the shared state
pub fn build_app_state(db: sea_orm::DatabaseConnection, config: AppConfig) -> AppState {
    let jwt = JwtService::new(&config.jwt_secret, config.jwt_expiry_seconds);
    let activities = DbActivityRepository::new(db.clone());

    AppState {
        db,
        config: Arc::new(config),
        jwt,
        activities,
    }
}
