use anyhow::Result;
use tracing::{debug, info, trace};

use super::initdb::{apply_migrations, connect};
use super::serve::run_server;
use crate::config::{build_app_state, AppConfig};

pub async fn migrate_and_serve(config: AppConfig) -> Result<()> {
    trace!("Entering migrate_and_serve function");
    info!("Applying database migrations and starting server");
    debug!("Database URL: {}", config.database_url);
    debug!("Bind address: {}", config.bind_address);

    let db = connect(&config.database_url).await?;
    apply_migrations(&db).await?;

    trace!("Initializing application state");
    let state = build_app_state(db, config);
    debug!("Application state initialized successfully");

    run_server(state).await
}
