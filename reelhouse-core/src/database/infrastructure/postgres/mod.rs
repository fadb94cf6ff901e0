//! Postgres adapters for the repository ports.

pub mod repositories;

use std::{fmt, sync::Arc, time::Duration};

use sqlx::{PgPool, postgres::PgPoolOptions};
use tracing::info;

use crate::config::DatabaseConfig;
use crate::error::{CoreError, Result, StoreError};

pub use repositories::{
    PostgresContentRepository, PostgresMyListRepository,
    PostgresWatchProgressRepository,
};

/// Embedded schema migrations.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Owns the connection pool and hands out repository adapters sharing it.
#[derive(Clone)]
pub struct PostgresDatabase {
    pool: PgPool,
    max_connections: u32,
}

impl fmt::Debug for PostgresDatabase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresDatabase")
            .field("pool_size", &self.pool.size())
            .field("idle", &self.pool.num_idle())
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

impl PostgresDatabase {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let url = config.url.as_deref().ok_or_else(|| {
            CoreError::Config("DATABASE_URL is not set".to_string())
        })?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .test_before_acquire(true)
            .connect(url)
            .await
            .map_err(StoreError::from)?;

        info!(
            max_connections = config.max_connections,
            "database pool initialized"
        );

        Ok(Self::from_pool(pool, config.max_connections))
    }

    pub fn from_pool(pool: PgPool, max_connections: u32) -> Self {
        Self {
            pool,
            max_connections,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply any pending migrations.
    pub async fn migrate(&self) -> Result<()> {
        MIGRATOR.run(&self.pool).await.map_err(|e| {
            CoreError::PersistenceFailed(StoreError::Backend(format!(
                "migration failed: {e}"
            )))
        })?;
        info!("database migrations applied");
        Ok(())
    }

    pub fn content(&self) -> Arc<PostgresContentRepository> {
        Arc::new(PostgresContentRepository::new(self.pool.clone()))
    }

    pub fn watch_progress(&self) -> Arc<PostgresWatchProgressRepository> {
        Arc::new(PostgresWatchProgressRepository::new(self.pool.clone()))
    }

    pub fn my_list(&self) -> Arc<PostgresMyListRepository> {
        Arc::new(PostgresMyListRepository::new(self.pool.clone()))
    }
}
