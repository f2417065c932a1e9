//! Database error types.

use std::path::PathBuf;
use thiserror::Error;

use crate::validation::ValidationError;

/// Errors from database operations.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// SQLite error from rusqlite.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// IO error when creating directories or files.
    #[error("IO error for path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A migration failed to apply.
    #[error("Migration failed at version {version}: {reason}")]
    Migration { version: u32, reason: String },

    /// The database lock was poisoned.
    #[error("Database lock poisoned")]
    LockPoisoned,

    /// A unique field collided with an existing document.
    #[error("A document with {field} '{value}' already exists")]
    NotUnique { field: &'static str, value: String },

    /// The addressed document does not exist.
    #[error("{kind} not found: {key}")]
    NotFound { kind: &'static str, key: String },

    /// The document failed write-time validation.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// A JSON column could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DatabaseError {
    /// Converts a UNIQUE constraint failure into [`DatabaseError::NotUnique`],
    /// passing every other error through.
    pub(crate) fn unique(err: rusqlite::Error, field: &'static str, value: &str) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _)
                if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
            {
                DatabaseError::NotUnique {
                    field,
                    value: value.to_string(),
                }
            }
            _ => DatabaseError::Sqlite(err),
        }
    }

    pub(crate) fn not_found(kind: &'static str, key: impl Into<String>) -> Self {
        DatabaseError::NotFound {
            kind,
            key: key.into(),
        }
    }
}
