//! SQLite-backed ZIP store.

use rusqlite::{params, Connection};
use std::path::Path;
use tracing::{debug, info};

use super::{create_schema, register_math_functions, Model};
use crate::error::Result;
use crate::models::Zip;
use crate::search::LocationManager;

/// Owns one SQLite connection, initialized for distance queries
pub struct ZipStore {
    conn: Connection,
}

impl ZipStore {
    /// Open (or create) a database file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening ZIP database at {}", path.display());
        Self::from_connection(Connection::open(path)?)
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    /// Wrap an existing connection, running per-connection setup on it
    pub fn from_connection(conn: Connection) -> Result<Self> {
        register_math_functions(&conn)?;
        create_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Get the underlying connection
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Radius search over the stored ZIP codes
    pub fn manager(&self) -> LocationManager<'_, Zip> {
        LocationManager::new(&self.conn)
    }

    /// Validate and insert a record, returning its row id
    pub fn insert(&self, zip: &Zip) -> Result<i64> {
        insert_zip(&self.conn, zip)
    }

    pub fn get_by_code(&self, code: &str) -> Result<Option<Zip>> {
        Zip::find_by_code(&self.conn, code)
    }

    /// Number of stored records
    pub fn count(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", Zip::TABLE), [], |row| {
                row.get(0)
            })?;
        Ok(count as u64)
    }

    /// All records in default (code) order
    pub fn all(&self) -> Result<Vec<Zip>> {
        let sql = format!(
            "SELECT {} FROM {} ORDER BY code, id",
            Zip::COLUMNS.join(", "),
            Zip::TABLE
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let zips = stmt
            .query_map([], |row| Zip::from_row(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(zips)
    }
}

/// Insert one record on any connection
pub(crate) fn insert_zip(conn: &Connection, zip: &Zip) -> Result<i64> {
    zip.validate()?;

    let mut stmt = conn.prepare_cached(
        "INSERT INTO zips (code, city, state, latitude, longitude) VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;
    stmt.execute(params![
        zip.code,
        zip.city,
        zip.state,
        zip.latitude,
        zip.longitude
    ])?;

    let id = conn.last_insert_rowid();
    debug!("Inserted {} as row {}", zip, id);
    Ok(id)
}
