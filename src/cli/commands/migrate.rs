use anyhow::Context;

use crate::cli::{utils, OutputFormat};
use crate::config::{config, StorageBackend};
use crate::database::DatabaseManager;

pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let database = &config().database;
    if database.backend != StorageBackend::Postgres {
        anyhow::bail!("migrate requires DATABASE_URL to point at PostgreSQL");
    }

    let pool = DatabaseManager::connect(database)
        .await
        .context("connecting to database")?;
    DatabaseManager::migrate(&pool).await.context("applying migrations")?;

    utils::output_success(&output_format, "Migrations applied", None)
}
