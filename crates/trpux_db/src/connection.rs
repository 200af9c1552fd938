//! Database connection management.

use std::path::Path;
use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use tracing::{debug, info};

use crate::error::DbResult;

/// Connection to the catalog database.
///
/// The catalog holds servers, their arguments, discovered sources and the
/// card/source compatibility records seeded from registered parsers.
#[derive(Debug, Clone)]
pub struct CatalogDb {
    pool: SqlitePool,
}

impl CatalogDb {
    /// Open or create a catalog database at the given path.
    ///
    /// This will:
    /// 1. Create the database file (and its directory) if it doesn't exist
    /// 2. Configure SQLite (WAL mode, foreign keys)
    /// 3. Run any pending migrations
    pub async fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        info!("Opening catalog database: {}", path.display());

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .pragma("synchronous", "NORMAL") // Safe with WAL
            .pragma("foreign_keys", "ON");

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        debug!("Database connection established");

        Self::run_migrations(&pool).await?;

        Ok(Self { pool })
    }

    /// Open an in-memory database (for testing).
    pub async fn open_in_memory() -> DbResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?
            .journal_mode(SqliteJournalMode::Memory)
            .pragma("foreign_keys", "ON");

        // In-memory must be a single, never-recycled connection to share state
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Self::run_migrations(&pool).await?;

        Ok(Self { pool })
    }

    async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
        debug!("Running database migrations");
        sqlx::migrate!("./migrations").run(pool).await?;
        info!("Database migrations complete");
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Check if the database is healthy.
    pub async fn health_check(&self) -> DbResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Get database statistics.
    pub async fn stats(&self) -> DbResult<DbStats> {
        let servers: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM servers")
            .fetch_one(&self.pool)
            .await?;

        let sources: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sources")
            .fetch_one(&self.pool)
            .await?;

        let card_types: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM card_types")
            .fetch_one(&self.pool)
            .await?;

        let source_types: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM source_types")
            .fetch_one(&self.pool)
            .await?;

        Ok(DbStats {
            server_count: servers.0 as u64,
            source_count: sources.0 as u64,
            card_type_count: card_types.0 as u64,
            source_type_count: source_types.0 as u64,
        })
    }
}

/// Database statistics.
#[derive(Debug, Clone)]
pub struct DbStats {
    pub server_count: u64,
    pub source_count: u64,
    pub card_type_count: u64,
    pub source_type_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_in_memory() {
        let db = CatalogDb::open_in_memory().await.unwrap();
        db.health_check().await.unwrap();

        let stats = db.stats().await.unwrap();
        assert_eq!(stats.server_count, 0);
        assert_eq!(stats.source_count, 0);
        assert_eq!(stats.card_type_count, 0);
        assert_eq!(stats.source_type_count, 0);
    }
}
