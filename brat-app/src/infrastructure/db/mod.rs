pub mod entities;
mod pg_store;

pub use pg_store::PgStore;

use crate::config::DbPoolConfig;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};

pub async fn create_connection(
    database_url: &str,
    pool: &DbPoolConfig,
) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(database_url);
    opt.max_connections(pool.max_connections)
        .min_connections(pool.min_connections)
        .connect_timeout(pool.timeout)
        .acquire_timeout(pool.timeout)
        .idle_timeout(pool.idle_timeout)
        .sqlx_logging(false);

    tracing::debug!(
        "Connecting to Postgres (pool {}..{})",
        pool.min_connections,
        pool.max_connections
    );
    Database::connect(opt).await
}

pub async fn run_migrations(db: &DatabaseConnection) -> Result<(), DbErr> {
    let migration = include_str!("../../../../migrations/001_initial.sql");

    for statement in migration.split(';') {
        let statement = statement.trim();
        if !statement.is_empty() {
            // Statements are all IF NOT EXISTS; a failure here means the object is already in place.
            if let Err(e) = db
                .execute(Statement::from_string(
                    sea_orm::DatabaseBackend::Postgres,
                    statement.to_string(),
                ))
                .await
            {
                tracing::debug!("Migration statement skipped: {}", e);
            }
        }
    }

    Ok(())
}
