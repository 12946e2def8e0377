//! SQLite storage bootstrap for the parcel store.
//!
//! # Responsibility
//! - Open and configure SQLite connections.
//! - Make sure the `parcel` table exists before callers touch it.
//!
//! # Invariants
//! - Schema version is tracked via `PRAGMA user_version`.
//! - Engine errors are carried unchanged inside `DbError::Sqlite`.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod open;
pub mod schema;

pub use open::{open_db, open_db_in_memory, BUSY_TIMEOUT};

pub type DbResult<T> = Result<T, DbError>;

/// Failure while opening or preparing a parcel database.
#[derive(Debug)]
pub enum DbError {
    /// Engine error, passed through as reported by SQLite.
    Sqlite(rusqlite::Error),
    /// The file was stamped by a newer build than this one.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => Display::fmt(err, f),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "parcel database has schema version {db_version}; this build understands up to {latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        if let Self::Sqlite(err) = self {
            Some(err)
        } else {
            None
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Sqlite(err)
    }
}
