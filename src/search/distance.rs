//! SQL great-circle distance expression.
//!
//! The expression is the spherical law of cosines:
//!
//! ```text
//! R * acos( cos(rad(lat_ref)) * cos(rad(lat_row)) * cos(rad(lon_row) - rad(lon_ref))
//!         + sin(rad(lat_ref)) * sin(rad(lat_row)) )
//! ```
//!
//! It loses precision for points only a few meters apart, where `acos` is
//! evaluated right next to 1. That is accepted for radius search at ZIP
//! granularity. Coincident points short-circuit to exactly 0, and the `acos`
//! argument is clamped to [-1, 1] so rounding never yields NULL.

use rusqlite::ToSql;

use crate::error::{Error, Result};
use crate::models::{Location, Unit};
use crate::storage::Model;

/// Column holding latitude in degrees
pub const LATITUDE_COLUMN: &str = "latitude";

/// Column holding longitude in degrees
pub const LONGITUDE_COLUMN: &str = "longitude";

/// Distance from a fixed reference point, ready to embed in a query
#[derive(Debug, Clone, Copy)]
pub struct DistanceExpr {
    location: Location,
    unit: Unit,
}

impl DistanceExpr {
    pub fn new(location: Location, unit: Unit) -> Self {
        Self { location, unit }
    }

    /// Build from a unit-of-measure selector ("imperial" or anything else)
    pub fn from_uom(location: Location, uom: &str) -> Self {
        Self::new(location, Unit::from_uom(uom))
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    /// Render the expression against `M`'s coordinate columns.
    ///
    /// Columns are qualified with `alias` when given. The reference point and
    /// Earth radius are left as the named parameters listed by
    /// [`DistanceExpr::params`].
    pub fn to_sql<M: Model>(&self, alias: Option<&str>) -> Result<String> {
        let (lat, lon) = resolve_columns::<M>(alias)?;

        Ok(format!(
            "(CASE WHEN {lat} = :ref_lat AND {lon} = :ref_lon THEN 0.0 \
             ELSE :earth_radius * acos(max(-1.0, min(1.0, \
             cos(radians(:ref_lat)) * cos(radians({lat})) * \
             cos(radians({lon}) - radians(:ref_lon)) + \
             sin(radians(:ref_lat)) * sin(radians({lat}))))) END)",
            lat = lat,
            lon = lon,
        ))
    }

    /// Named parameter bindings for the rendered expression
    pub fn params(&self) -> Vec<(&'static str, Box<dyn ToSql>)> {
        let params: [(&'static str, Box<dyn ToSql>); 3] = [
            (":earth_radius", Box::new(self.unit.earth_radius())),
            (":ref_lat", Box::new(self.location.latitude)),
            (":ref_lon", Box::new(self.location.longitude)),
        ];
        params.into()
    }
}

/// Find the latitude and longitude columns of `M`, quoted and qualified
fn resolve_columns<M: Model>(alias: Option<&str>) -> Result<(String, String)> {
    let find = |name: &str| M::COLUMNS.iter().find(|c| **c == name).copied();

    match (find(LATITUDE_COLUMN), find(LONGITUDE_COLUMN)) {
        (Some(lat), Some(lon)) => Ok((qualify(alias, lat), qualify(alias, lon))),
        _ => Err(Error::Configuration(format!(
            "model {} requires fields named {} and {}",
            M::TABLE,
            LONGITUDE_COLUMN,
            LATITUDE_COLUMN
        ))),
    }
}

fn qualify(alias: Option<&str>, column: &str) -> String {
    match alias {
        Some(alias) => format!("{}.{}", quote_ident(alias), quote_ident(column)),
        None => quote_ident(column),
    }
}

/// Quote an SQL identifier
pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
