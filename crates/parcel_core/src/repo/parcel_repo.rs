//! Parcel repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Own every read and write against the `parcel` table.
//! - Enforce the `registered` gate inside the mutating statement itself.
//!
//! # Invariants
//! - Each operation is exactly one SQL statement; nothing here reads a row
//!   to decide whether to write it.
//! - `set_address` and `delete` only touch rows whose status is
//!   `registered` at execution time. A row that fails the predicate is left
//!   alone and the call still succeeds.
//! - `get` is the only operation that reports `NotFound`.

use crate::db::DbError;
use crate::model::parcel::{ClientId, Parcel, ParcelNumber, STATUS_REGISTERED};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const PARCEL_TABLE: &str = "parcel";
const PARCEL_COLUMNS: [&str; 5] = ["number", "client", "status", "address", "created_at"];

const PARCEL_SELECT_SQL: &str = "SELECT
    number,
    client,
    status,
    address,
    created_at
FROM parcel";

pub type RepoResult<T> = Result<T, RepoError>;

/// Error for parcel persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Engine failure, carried unchanged.
    Db(DbError),
    /// No row matches the requested number.
    NotFound(ParcelNumber),
    /// Connection has no `parcel` table.
    MissingRequiredTable(&'static str),
    /// `parcel` table lacks an expected column.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(number) => write!(f, "parcel not found: {number}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "parcel store requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "parcel store requires column `{column}` in table `{table}`"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound(_) => None,
            Self::MissingRequiredTable(_) => None,
            Self::MissingRequiredColumn { .. } => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for parcel records.
pub trait ParcelRepository {
    /// Inserts a parcel and returns the number assigned by the engine.
    ///
    /// `parcel.number` is ignored.
    fn add(&self, parcel: &Parcel) -> RepoResult<ParcelNumber>;
    /// Loads one parcel. Fails with `NotFound` when no row matches.
    fn get(&self, number: ParcelNumber) -> RepoResult<Parcel>;
    /// Lists all parcels of one client in unspecified order.
    fn get_by_client(&self, client: ClientId) -> RepoResult<Vec<Parcel>>;
    /// Overwrites status unconditionally. A missing row is a no-op.
    fn set_status(&self, number: ParcelNumber, status: &str) -> RepoResult<()>;
    /// Moves status from `from` to `to` in one statement.
    ///
    /// Returns `false` when the row is missing or its status is no longer
    /// `from`.
    fn advance_status(&self, number: ParcelNumber, from: &str, to: &str) -> RepoResult<bool>;
    /// Overwrites address only while the parcel is `registered`.
    fn set_address(&self, number: ParcelNumber, address: &str) -> RepoResult<()>;
    /// Hard-deletes the parcel only while it is `registered`.
    fn delete(&self, number: ParcelNumber) -> RepoResult<()>;
}

/// SQLite-backed parcel store.
pub struct SqliteParcelStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteParcelStore<'conn> {
    /// Creates a store over a connection that already has the `parcel` table.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_parcel_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ParcelRepository for SqliteParcelStore<'_> {
    fn add(&self, parcel: &Parcel) -> RepoResult<ParcelNumber> {
        self.conn.execute(
            "INSERT INTO parcel (
                client,
                status,
                address,
                created_at
            ) VALUES (?1, ?2, ?3, ?4);",
            params![
                parcel.client,
                parcel.status.as_str(),
                parcel.address.as_str(),
                parcel.created_at.as_str(),
            ],
        )?;

        let number = self.conn.last_insert_rowid();
        debug!(
            "event=parcel_add module=repo status=ok number={} client={}",
            number, parcel.client
        );
        Ok(number)
    }

    fn get(&self, number: ParcelNumber) -> RepoResult<Parcel> {
        self.conn
            .query_row(
                &format!("{PARCEL_SELECT_SQL} WHERE number = ?1;"),
                [number],
                parse_parcel_row,
            )
            .optional()?
            .ok_or(RepoError::NotFound(number))
    }

    fn get_by_client(&self, client: ClientId) -> RepoResult<Vec<Parcel>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PARCEL_SELECT_SQL} WHERE client = ?1;"))?;
        let rows = stmt.query_map([client], parse_parcel_row)?;

        let mut parcels = Vec::new();
        for row in rows {
            parcels.push(row?);
        }
        Ok(parcels)
    }

    fn set_status(&self, number: ParcelNumber, status: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE parcel SET status = ?1 WHERE number = ?2;",
            params![status, number],
        )?;

        debug!(
            "event=parcel_set_status module=repo status=ok number={} rows={}",
            number, changed
        );
        Ok(())
    }

    fn advance_status(&self, number: ParcelNumber, from: &str, to: &str) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE parcel
             SET status = ?1
             WHERE number = ?2
               AND status = ?3;",
            params![to, number, from],
        )?;

        debug!(
            "event=parcel_advance_status module=repo status=ok number={} from={} to={} rows={}",
            number, from, to, changed
        );
        Ok(changed == 1)
    }

    fn set_address(&self, number: ParcelNumber, address: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE parcel
             SET address = ?1
             WHERE number = ?2
               AND status = ?3;",
            params![address, number, STATUS_REGISTERED],
        )?;

        debug!(
            "event=parcel_set_address module=repo status=ok number={} rows={}",
            number, changed
        );
        Ok(())
    }

    fn delete(&self, number: ParcelNumber) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM parcel
             WHERE number = ?1
               AND status = ?2;",
            params![number, STATUS_REGISTERED],
        )?;

        debug!(
            "event=parcel_delete module=repo status=ok number={} rows={}",
            number, changed
        );
        Ok(())
    }
}

fn parse_parcel_row(row: &Row<'_>) -> rusqlite::Result<Parcel> {
    Ok(Parcel {
        number: row.get("number")?,
        client: row.get("client")?,
        status: row.get("status")?,
        address: row.get("address")?,
        created_at: row.get("created_at")?,
    })
}

fn ensure_parcel_connection_ready(conn: &Connection) -> RepoResult<()> {
    if !table_exists(conn, PARCEL_TABLE)? {
        return Err(RepoError::MissingRequiredTable(PARCEL_TABLE));
    }

    for column in PARCEL_COLUMNS {
        if !table_has_column(conn, PARCEL_TABLE, column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: PARCEL_TABLE,
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::{ParcelRepository, RepoError, SqliteParcelStore};
    use crate::db::open_db_in_memory;
    use crate::model::parcel::Parcel;
    use std::error::Error;

    #[test]
    fn not_found_display_names_the_number() {
        let err = RepoError::NotFound(42);
        assert_eq!(err.to_string(), "parcel not found: 42");
        assert!(err.source().is_none());
    }

    #[test]
    fn engine_errors_keep_their_source() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteParcelStore::try_new(&conn).unwrap();
        conn.execute_batch("DROP TABLE parcel;").unwrap();

        let err = store
            .add(&Parcel::registered(1, "a", "2024-01-01T00:00:00Z"))
            .unwrap_err();
        assert!(matches!(err, RepoError::Db(_)));
        assert!(err.source().is_some());
    }
}
