//! Radius search over coordinate-bearing tables.
//!
//! Distances are computed inside SQLite by a generated expression, so
//! filtering and ordering happen in the engine.

mod distance;
mod manager;

pub use distance::{DistanceExpr, LATITUDE_COLUMN, LONGITUDE_COLUMN};
pub use manager::{
    LocationManager, Nearby, RadiusQuery, DEFAULT_MAX_RESULTS, DEFAULT_RADIUS,
};
