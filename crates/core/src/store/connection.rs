//! Database connection management with pragma configuration.
//!
//! This module handles opening the SQLite database, applying required pragmas
//! for performance and concurrency (WAL mode), running migrations, and the
//! per-write deadline that bounds every transaction.

use super::migrations;
use crate::{AppConfig, Error};
use std::path::Path;
use std::time::{Duration, Instant};
use tokio_rusqlite::Connection;

const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(2);

/// Wiki database handle.
///
/// Wraps a tokio-rusqlite Connection that runs database operations
/// on a background thread. Cloning shares that connection.
#[derive(Clone, Debug)]
pub struct WikiDb {
    pub(crate) conn: Connection,
    write_timeout: Duration,
}

/// Point in time by which a write transaction must be ready to commit.
///
/// Checked right before `COMMIT`; a transaction that misses it is dropped,
/// which rolls it back.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Deadline {
    at: Instant,
    budget: Duration,
}

impl Deadline {
    pub(crate) fn after(budget: Duration) -> Self {
        Self { at: Instant::now() + budget, budget }
    }

    pub(crate) fn check(&self, op: &str) -> Result<(), Error> {
        if Instant::now() >= self.at {
            tracing::warn!(op, budget_ms = self.budget.as_millis() as u64, "write missed its deadline, rolling back");
            return Err(Error::Timeout(format!("{op} did not finish within {}ms", self.budget.as_millis())));
        }
        Ok(())
    }
}

impl WikiDb {
    /// Open a database at the specified path.
    ///
    /// Creates the file if it doesn't exist, applies performance pragmas,
    /// and runs any pending migrations.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let conn = Connection::open(path).await.map_err(|e| Error::Database(e.into()))?;
        Self::prepare(conn, DEFAULT_BUSY_TIMEOUT).await
    }

    /// Open the database named by `config.db_path` with its timeouts.
    pub async fn open_with_config(config: &AppConfig) -> Result<Self, Error> {
        let conn = Connection::open(&config.db_path)
            .await
            .map_err(|e| Error::Database(e.into()))?;
        let db = Self::prepare(conn, config.busy_timeout()).await?;
        Ok(db.with_write_timeout(config.store_timeout()))
    }

    /// Open an in-memory database for testing.
    ///
    /// Creates a temporary in-memory SQLite database with the same
    /// pragma configuration as file-based databases.
    pub async fn open_in_memory() -> Result<Self, Error> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| Error::Database(e.into()))?;
        Self::prepare(conn, DEFAULT_BUSY_TIMEOUT).await
    }

    async fn prepare(conn: Connection, busy_timeout: Duration) -> Result<Self, Error> {
        conn.call(move |conn| {
            conn.busy_timeout(busy_timeout)?;
            conn.execute_batch(
                "PRAGMA journal_mode=WAL;
                 PRAGMA synchronous=NORMAL;
                 PRAGMA temp_store=MEMORY;
                 PRAGMA foreign_keys=ON;",
            )?;
            Ok(())
        })
        .await
        .map_err(Error::Database)?;

        migrations::run(&conn).await?;

        Ok(Self { conn, write_timeout: DEFAULT_WRITE_TIMEOUT })
    }

    /// Set the deadline applied to each write transaction.
    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    pub(crate) fn deadline(&self) -> Deadline {
        Deadline::after(self.write_timeout)
    }
}
