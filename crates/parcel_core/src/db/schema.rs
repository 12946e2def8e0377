//! Parcel table bootstrap.
//!
//! # Responsibility
//! - Create the `parcel` table on fresh databases.
//! - Refuse databases stamped by a newer build.
//!
//! # Invariants
//! - Applying the schema is idempotent.
//! - The applied version is mirrored to `PRAGMA user_version`.

use crate::db::{DbError, DbResult};
use rusqlite::Connection;

const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Schema version written by this build.
pub const SCHEMA_VERSION: u32 = 1;

/// Ensures the parcel table exists on the provided connection.
///
/// Databases created elsewhere with `user_version = 0` are accepted as long
/// as the table shape matches; they get stamped with `SCHEMA_VERSION`.
pub fn apply_schema(conn: &Connection) -> DbResult<()> {
    let current_version = current_user_version(conn)?;
    if current_version > SCHEMA_VERSION {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current_version,
            latest_supported: SCHEMA_VERSION,
        });
    }

    conn.execute_batch(SCHEMA_SQL)?;
    if current_version < SCHEMA_VERSION {
        conn.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION};"))?;
    }

    Ok(())
}

/// Reads `PRAGMA user_version` from the connection.
pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}
