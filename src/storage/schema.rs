//! SQLite schema for ZIP records.

use rusqlite::Connection;
use tracing::debug;

use crate::error::Result;

/// Create the `zips` table and its index if they do not exist yet.
///
/// CHECK constraints mirror [`crate::models::Zip::validate`].
pub fn create_schema(conn: &Connection) -> Result<()> {
    debug!("Ensuring zips schema");

    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS zips (
            id INTEGER PRIMARY KEY,
            code TEXT NOT NULL CHECK (length(code) BETWEEN 1 AND 5),
            city TEXT NOT NULL CHECK (length(city) <= 128),
            state TEXT NOT NULL CHECK (length(state) = 2),
            latitude REAL NOT NULL CHECK (latitude BETWEEN -90.0 AND 90.0),
            longitude REAL NOT NULL CHECK (longitude BETWEEN -180.0 AND 180.0)
        );
        CREATE INDEX IF NOT EXISTS zips_code_idx ON zips (code);",
    )?;

    Ok(())
}
