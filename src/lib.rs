//! zipradius - ZIP code radius search on SQLite
//!
//! Stores postal codes with coordinates and finds every code within a
//! radius of a point, computing great-circle distances inside SQLite.
//! Shared by the `ingest` and `query` binaries.

pub mod config;
pub mod error;
pub mod import;
pub mod models;
pub mod search;
pub mod storage;

pub use error::{Error, Result};
pub use models::{Location, Unit, UsState, Zip};
pub use search::{DistanceExpr, LocationManager, Nearby, RadiusQuery};
pub use storage::{register_math_functions, HasCoordinates, Model, ZipStore};
