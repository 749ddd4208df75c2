use anyhow::Context;
use registrar_migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::info;

pub async fn init_pool_and_migrate(database_url: &str) -> anyhow::Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(database_url);
    options.sqlx_logging(false);

    let db = Database::connect(options)
        .await
        .with_context(|| format!("failed to connect to {database_url}"))?;

    Migrator::up(&db, None)
        .await
        .context("failed to apply database migrations")?;
    info!("database schema is up to date");

    Ok(db)
}
