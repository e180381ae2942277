//! Core data models for ZIP radius search.

pub mod location;
pub mod state;
pub mod zip;

pub use location::{Location, Unit, EARTH_RADIUS_KM, EARTH_RADIUS_MILES};
pub use state::UsState;
pub use zip::Zip;
