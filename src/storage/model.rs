//! Table-backed entity traits.

use rusqlite::{Connection, Row};

use crate::error::{Error, Result};
use crate::models::{Location, Zip};
use crate::search::{LocationManager, Nearby};

/// An entity stored in a single SQLite table.
pub trait Model: Sized {
    /// Table name
    const TABLE: &'static str;

    /// Physical column names, in the order `from_row` reads them
    const COLUMNS: &'static [&'static str];

    /// Column used when no explicit ordering is requested
    const DEFAULT_ORDER: Option<&'static str> = None;

    /// Build an entity from a row selected with `COLUMNS`
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;
}

/// An entity with a `latitude` / `longitude` pair.
///
/// Implementors must expose columns named exactly `latitude` and
/// `longitude` in [`Model::COLUMNS`]; distance queries resolve them by name.
pub trait HasCoordinates: Model {
    fn location(&self) -> Location;

    /// Assign both coordinates at once
    fn set_location(&mut self, location: Location);

    /// Copy the location of a stored ZIP code onto this entity
    fn set_location_from_zip(&mut self, conn: &Connection, code: &str) -> Result<()> {
        let zip = Zip::find_by_code(conn, code)?
            .ok_or_else(|| Error::NotFound(format!("zip code '{}'", code)))?;
        self.set_location(zip.location());
        Ok(())
    }

    /// ZIP codes within `radius` miles of this entity
    fn nearby_zips(&self, conn: &Connection, radius: f64) -> Result<Vec<Nearby<Zip>>> {
        LocationManager::<Zip>::new(conn)
            .nearby_locations(self.location(), radius)
            .fetch()
    }
}
