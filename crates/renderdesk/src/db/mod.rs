//! Document store for render jobs.
//!
//! Uses rusqlite (SQLite) with a thread-safe `Database` handle. Job documents
//! are stored one row per document, with embedded render layers kept in a
//! child table keyed by `(maya_job_id, layer_name)` so a single layer can be
//! updated without rewriting its siblings.

use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::config::DatabaseConfig;

mod assign;
pub mod error;
pub mod light_preset_repo;
pub mod maya_job_repo;
pub mod migrations;
pub mod nuke_job_repo;

pub use error::DatabaseError;

/// Thread-safe database handle wrapping a single rusqlite connection.
///
/// Cloning is cheap (inner `Arc`). All access is serialized through
/// a `Mutex`.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Opens (or creates) the database at the given path and runs all
    /// pending migrations.
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| DatabaseError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;

        migrations::run_all(&conn)?;

        log::info!("Database opened at {}", path.display());

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Opens an in-memory database. Runs all migrations.
    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;

        migrations::run_all(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Provides locked access to the underlying connection.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, DatabaseError>
    where
        F: FnOnce(&Connection) -> Result<T, DatabaseError>,
    {
        let conn = self.conn.lock().map_err(|_| DatabaseError::LockPoisoned)?;
        f(&conn)
    }

    /// Runs `f` inside a transaction that commits only if `f` succeeds.
    pub fn with_transaction<F, T>(&self, f: F) -> Result<T, DatabaseError>
    where
        F: FnOnce(&Connection) -> Result<T, DatabaseError>,
    {
        self.with_conn(|conn| {
            let tx = conn.unchecked_transaction()?;
            let value = f(&tx)?;
            tx.commit()?;
            Ok(value)
        })
    }
}

/// A connection scope: the store is opened when the session is created and
/// released when it is dropped.
pub struct Session {
    db: Database,
    alias: String,
}

impl Session {
    pub fn open(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let db = match config.path() {
            Some(path) => Database::open(&path)?,
            None => Database::open_in_memory()?,
        };
        log::debug!("Connected '{}' as alias '{}'", config.name, config.alias);
        Ok(Self {
            db,
            alias: config.alias.clone(),
        })
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn db(&self) -> &Database {
        &self.db
    }
}

impl Deref for Session {
    type Target = Database;

    fn deref(&self) -> &Database {
        &self.db
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        log::debug!("Disconnected alias '{}'", self.alias);
    }
}

/// Opens a session, runs `f` against it and releases the connection whether
/// or not `f` succeeded.
pub fn with_session<F, T, E>(config: &DatabaseConfig, f: F) -> Result<T, E>
where
    F: FnOnce(&Database) -> Result<T, E>,
    E: From<DatabaseError>,
{
    let session = Session::open(config)?;
    f(session.db())
}

/// Text stored for a scene file, the natural key of a job.
pub(crate) fn scene_key(path: &Path) -> String {
    crate::model::normalize_scene_path(path)
        .to_string_lossy()
        .into_owned()
}

/// Returns the default data directory: `<platform data dir>/renderdesk`.
pub fn default_data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("renderdesk"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory() {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(|conn| {
            let count: u32 =
                conn.query_row("SELECT COUNT(*) FROM _migrations", [], |r| r.get(0))?;
            assert!(count > 0);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_open_file_db() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("rendering.db");
        Database::open(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_transaction_rolls_back_on_error() {
        let db = Database::open_in_memory().unwrap();
        let result: Result<(), DatabaseError> = db.with_transaction(|conn| {
            conn.execute(
                "INSERT INTO light_presets (name, lights) VALUES ('rolled_back', '[]')",
                [],
            )?;
            Err(DatabaseError::LockPoisoned)
        });
        assert!(result.is_err());

        db.with_conn(|conn| {
            let count: u32 =
                conn.query_row("SELECT COUNT(*) FROM light_presets", [], |r| r.get(0))?;
            assert_eq!(count, 0);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_session_scope() {
        let dir = tempfile::tempdir().unwrap();
        let config = DatabaseConfig {
            name: "rendering".to_string(),
            directory: Some(dir.path().to_path_buf()),
            alias: "farm".to_string(),
            in_memory: false,
        };

        let count = with_session(&config, |db| {
            db.with_conn(|conn| {
                let n: u32 =
                    conn.query_row("SELECT COUNT(*) FROM maya_jobs", [], |r| r.get(0))?;
                Ok(n)
            })
        })
        .unwrap();
        assert_eq!(count, 0);
        assert!(dir.path().join("rendering.db").exists());

        let session = Session::open(&config).unwrap();
        assert_eq!(session.alias(), "farm");
    }

    #[test]
    fn test_in_memory_session() {
        let session = Session::open(&DatabaseConfig::in_memory()).unwrap();
        session
            .with_conn(|conn| {
                conn.execute_batch("SELECT 1")?;
                Ok(())
            })
            .unwrap();
    }
}
