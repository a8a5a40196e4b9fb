//! SQLite storage bootstrap.
//!
//! # Design
//! `Database` holds only the path of the SQLite file. Migrations run once in
//! `Database::open`; after that every request calls `connect` to get its own
//! connection, so no connection is shared between requests.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rusqlite::{Connection, TransactionBehavior};
use tracing::{error, info};

pub mod migrations;

pub type DbResult<T> = Result<T, DbError>;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error("database schema version {db_version} is newer than supported {latest_supported}")]
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },

    #[error("failed to prepare database directory `{}`: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Handle to a migrated SQLite database file.
#[derive(Debug, Clone)]
pub struct Database {
    path: PathBuf,
}

impl Database {
    /// Opens (creating if needed) the database at `path` and applies pending
    /// migrations.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        let path = path.as_ref().to_path_buf();
        let started_at = Instant::now();
        info!(path = %path.display(), "opening database");

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| DbError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let db = Self { path };
        let result = db.connect().and_then(|mut conn| migrations::apply_migrations(&mut conn));
        match result {
            Ok(()) => {
                info!(
                    path = %db.path.display(),
                    duration_ms = started_at.elapsed().as_millis() as u64,
                    "database ready"
                );
                Ok(db)
            }
            Err(err) => {
                error!(
                    path = %db.path.display(),
                    duration_ms = started_at.elapsed().as_millis() as u64,
                    error = %err,
                    "database bootstrap failed"
                );
                Err(err)
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Opens a fresh, configured connection. Callers own it for the duration
    /// of one unit of work.
    pub fn connect(&self) -> DbResult<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        // journal_mode returns a row, so it cannot go through execute_batch.
        let _mode: String = conn.query_row("PRAGMA journal_mode = WAL;", [], |row| row.get(0))?;
        Ok(conn)
    }

    /// Runs `work` inside an immediate transaction on a new connection.
    ///
    /// The write lock is taken at `BEGIN`, under the busy timeout, so
    /// concurrent units of work on the same rows queue up instead of failing
    /// when a read snapshot is upgraded. Commits when `work` returns `Ok`. Any
    /// `Err` (or a panic) drops the transaction, which rolls it back.
    pub fn with_transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&rusqlite::Transaction<'_>) -> Result<T, E>,
        E: From<DbError>,
    {
        let mut conn = self.connect()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(DbError::from)?;
        let value = work(&tx)?;
        tx.commit().map_err(DbError::from)?;
        Ok(value)
    }
}
