use anyhow::Result;
use migration::{Migrator, MigratorTrait};
use tracing::{debug, error, info, trace};

use super::initdb::connect;

pub async fn rollback(database_url: &str, steps: u32) -> Result<()> {
    trace!("Entering rollback function");
    info!("Reverting {} migration(s)", steps);
    debug!("Database URL: {}", database_url);

    let db = connect(database_url).await?;

    match Migrator::down(&db, Some(steps)).await {
        Ok(_) => {
            info!("Rollback completed successfully");
        }
        Err(e) => {
            error!("Failed to revert migrations: {}", e);
            return Err(e.into());
        }
    }

    Ok(())
}
