//! Radius search queries over coordinate-bearing tables.

use rusqlite::{Connection, ToSql};
use serde::Serialize;
use std::marker::PhantomData;
use tracing::debug;

use super::distance::{quote_ident, DistanceExpr};
use crate::error::{Error, Result};
use crate::models::{Location, Unit, Zip};
use crate::storage::HasCoordinates;

/// Default search radius, in the search unit
pub const DEFAULT_RADIUS: f64 = 10.0;

/// Default cap on the number of results
pub const DEFAULT_MAX_RESULTS: usize = 100;

// Kept apart from model column names so the outer filter is unambiguous
const DISTANCE_ALIAS: &str = "__distance";

/// A record annotated with its distance from the reference point
#[derive(Debug, Clone, Serialize)]
pub struct Nearby<M> {
    #[serde(flatten)]
    pub record: M,
    pub distance: f64,
}

/// Entry point for radius searches over `M`'s table
pub struct LocationManager<'c, M> {
    conn: &'c Connection,
    _model: PhantomData<M>,
}

impl<'c, M: HasCoordinates> LocationManager<'c, M> {
    pub fn new(conn: &'c Connection) -> Self {
        Self {
            conn,
            _model: PhantomData,
        }
    }

    /// Records within `radius` of `location`.
    ///
    /// Defaults to imperial units and at most [`DEFAULT_MAX_RESULTS`] rows,
    /// listed in the model's default order. Nothing runs until
    /// [`RadiusQuery::fetch`].
    pub fn nearby_locations(&self, location: Location, radius: f64) -> RadiusQuery<'c, M> {
        RadiusQuery {
            conn: self.conn,
            location,
            radius,
            unit: Unit::default(),
            max_results: Some(DEFAULT_MAX_RESULTS),
            order_by_distance: false,
            _model: PhantomData,
        }
    }
}

impl<'c> LocationManager<'c, Zip> {
    /// ZIP codes within `radius` of the ZIP code `code`, nearest first.
    ///
    /// `max_results` caps the result; `None` returns every match. An unknown
    /// code yields an empty result rather than an error.
    pub fn radius_search_by_zip(
        &self,
        code: &str,
        radius: f64,
        unit: Unit,
        max_results: Option<usize>,
    ) -> Result<Vec<Nearby<Zip>>> {
        let origin = match Zip::find_by_code(self.conn, code)? {
            Some(zip) => zip,
            None => {
                debug!("Zip code {} not found, returning no results", code);
                return Ok(Vec::new());
            }
        };

        let query = self
            .nearby_locations(origin.location(), radius)
            .unit(unit)
            .order_by_distance();
        match max_results {
            Some(limit) => query.max_results(limit).fetch(),
            None => query.unlimited().fetch(),
        }
    }
}

/// A pending radius search
pub struct RadiusQuery<'c, M> {
    conn: &'c Connection,
    location: Location,
    radius: f64,
    unit: Unit,
    max_results: Option<usize>,
    order_by_distance: bool,
    _model: PhantomData<M>,
}

impl<'c, M: HasCoordinates> RadiusQuery<'c, M> {
    /// Unit for both the radius and the reported distances
    pub fn unit(mut self, unit: Unit) -> Self {
        self.unit = unit;
        self
    }

    /// Unit by selector string: "imperial" or anything else for metric
    pub fn uom(self, uom: &str) -> Self {
        self.unit(Unit::from_uom(uom))
    }

    /// Cap the number of returned records
    pub fn max_results(mut self, max_results: usize) -> Self {
        self.max_results = Some(max_results);
        self
    }

    /// Return every match
    pub fn unlimited(mut self) -> Self {
        self.max_results = None;
        self
    }

    /// Sort by ascending distance; also decides which rows survive the cap
    pub fn order_by_distance(mut self) -> Self {
        self.order_by_distance = true;
        self
    }

    /// Render the SQL for this query
    pub fn to_sql(&self) -> Result<String> {
        let distance = DistanceExpr::new(self.location, self.unit).to_sql::<M>(Some("t"))?;

        let columns = M::COLUMNS
            .iter()
            .map(|c| format!("\"t\".{}", quote_ident(c)))
            .collect::<Vec<_>>()
            .join(", ");

        let mut sql = format!(
            "SELECT * FROM (SELECT {columns}, {distance} AS {alias} FROM {table} AS \"t\") \
             WHERE {alias} <= :radius",
            columns = columns,
            distance = distance,
            alias = quote_ident(DISTANCE_ALIAS),
            table = quote_ident(M::TABLE),
        );

        if self.order_by_distance {
            sql.push_str(&format!(" ORDER BY {} ASC", quote_ident(DISTANCE_ALIAS)));
        } else if let Some(column) = M::DEFAULT_ORDER {
            sql.push_str(&format!(" ORDER BY {}", quote_ident(column)));
        }

        if self.max_results.is_some() {
            sql.push_str(" LIMIT :limit");
        }

        Ok(sql)
    }

    /// Run the query
    pub fn fetch(self) -> Result<Vec<Nearby<M>>> {
        // also rejects NaN
        if !(self.radius >= 0.0) {
            return Err(Error::InvalidRadius(self.radius));
        }

        let sql = self.to_sql()?;

        let mut params = DistanceExpr::new(self.location, self.unit).params();
        params.push((":radius", Box::new(self.radius)));
        if let Some(limit) = self.max_results {
            params.push((":limit", Box::new(i64::try_from(limit).unwrap_or(i64::MAX))));
        }
        let bound: Vec<(&str, &dyn ToSql)> =
            params.iter().map(|(k, v)| (*k, v.as_ref())).collect();

        debug!(
            "Radius search on {}: ({}, {}) within {} {}",
            M::TABLE,
            self.location.longitude,
            self.location.latitude,
            self.radius,
            self.unit.suffix()
        );

        let distance_idx = M::COLUMNS.len();
        let mut stmt = self.conn.prepare(&sql)?;
        let results = stmt
            .query_map(bound.as_slice(), |row| {
                Ok(Nearby {
                    record: M::from_row(row)?,
                    distance: row.get(distance_idx)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        debug!("Radius search found {} records", results.len());
        if let Some(limit) = self.max_results {
            if results.len() == limit {
                debug!("Radius search on {} hit the {} result cap", M::TABLE, limit);
            }
        }
        Ok(results)
    }
}
