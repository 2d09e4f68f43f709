use std::sync::OnceLock;
use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tracing::info;

use crate::config::AppConfig;

/// Errors from DatabaseManager and the query executor
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Invalid database URL: {0}")]
    InvalidDatabaseUrl(#[from] url::ParseError),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Owner of the process-wide connection pool.
///
/// `init` runs once at startup and hands the pool to the router state;
/// `close` drains it on shutdown.
pub struct DatabaseManager;

impl DatabaseManager {
    fn slot() -> &'static OnceLock<PgPool> {
        static POOL: OnceLock<PgPool> = OnceLock::new();
        &POOL
    }

    /// Connect using the given config and register the pool globally.
    /// Calling it again returns the pool created first.
    pub async fn init(config: &AppConfig) -> Result<PgPool, DatabaseError> {
        if let Some(pool) = Self::slot().get() {
            return Ok(pool.clone());
        }

        let pool = Self::connect(config).await?;
        let pool = Self::slot().get_or_init(|| pool).clone();
        info!(
            "Database pool ready (max {} connections)",
            config.database.max_connections
        );
        Ok(pool)
    }

    /// Build a pool without touching the global slot.
    pub async fn connect(config: &AppConfig) -> Result<PgPool, DatabaseError> {
        let url = config.database_url()?;
        let pool = PgPoolOptions::new()
            .max_connections(config.database.max_connections)
            .acquire_timeout(Duration::from_secs(config.database.connection_timeout))
            .connect(&url)
            .await?;
        Ok(pool)
    }

    /// Apply pending migrations from `migrations/`
    pub async fn migrate(pool: &PgPool) -> Result<(), DatabaseError> {
        MIGRATOR.run(pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    /// Close the global pool (e.g., on shutdown)
    pub async fn close() {
        if let Some(pool) = Self::slot().get() {
            pool.close().await;
            info!("Closed database pool");
        }
    }
}
