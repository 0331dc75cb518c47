//! SQLite store - schema and connection pool
//!
//! One shared r2d2 pool per process. Registry operations live in
//! `wallets.rs` and `tokens.rs`.

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use std::path::Path;
use std::time::Duration;

use crate::ports::RegistryError;

/// Pooled connection type alias for convenience
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// Default database file, relative to the working directory
pub const DEFAULT_DB_PATH: &str = "wallets.db";

impl From<rusqlite::Error> for RegistryError {
    fn from(e: rusqlite::Error) -> Self {
        RegistryError::Storage(e.to_string())
    }
}

impl From<r2d2::Error> for RegistryError {
    fn from(e: r2d2::Error) -> Self {
        RegistryError::Storage(format!("Connection pool error: {}", e))
    }
}

/// Wallet and token registry backed by SQLite
#[derive(Clone)]
pub struct Database {
    pool: Pool<SqliteConnectionManager>,
}

impl Database {
    /// Open (or create) a database file and initialize the schema
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, RegistryError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| RegistryError::Storage(format!("Failed to create {}: {}", parent.display(), e)))?;
            }
        }

        // WAL lets list() run while a write is in flight
        let manager = SqliteConnectionManager::file(path).with_init(|conn| {
            conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA busy_timeout=5000;")
        });

        let pool = Pool::builder()
            .max_size(8)
            .connection_timeout(Duration::from_secs(10))
            .build(manager)?;

        let db = Self { pool };
        db.init()?;
        tracing::debug!("Opened wallet database at {}", path.display());
        Ok(db)
    }

    /// Private in-memory database. Limited to one connection since every
    /// `:memory:` connection is a separate database.
    pub fn in_memory() -> Result<Self, RegistryError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .connection_timeout(Duration::from_secs(10))
            .build(manager)?;

        let db = Self { pool };
        db.init()?;
        Ok(db)
    }

    /// Get a connection from the pool
    pub(crate) fn conn(&self) -> Result<DbConn, RegistryError> {
        Ok(self.pool.get()?)
    }

    fn init(&self) -> Result<(), RegistryError> {
        let conn = self.conn()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS wallets (
                address TEXT PRIMARY KEY,
                name TEXT
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS tokens (
                address TEXT PRIMARY KEY,
                ticker TEXT NOT NULL,
                name TEXT
            )",
            [],
        )?;

        Ok(())
    }
}
