//! Coordinate pair and unit-of-measure types.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{Error, Result};

/// Mean Earth radius in statute miles
pub const EARTH_RADIUS_MILES: f64 = 3959.0;

/// Mean Earth radius in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Unit of measure for radii and distances
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    /// Statute miles
    #[default]
    #[serde(alias = "mi", alias = "miles")]
    Imperial,
    /// Kilometers
    #[serde(alias = "km", alias = "kilometers")]
    Metric,
}

impl Unit {
    /// Lenient selector: `"imperial"` picks miles, anything else kilometers.
    pub fn from_uom(uom: &str) -> Self {
        if uom == "imperial" {
            Unit::Imperial
        } else {
            Unit::Metric
        }
    }

    /// Earth radius expressed in this unit
    pub fn earth_radius(&self) -> f64 {
        match self {
            Unit::Imperial => EARTH_RADIUS_MILES,
            Unit::Metric => EARTH_RADIUS_KM,
        }
    }

    /// Short suffix for display ("mi" / "km")
    pub fn suffix(&self) -> &'static str {
        match self {
            Unit::Imperial => "mi",
            Unit::Metric => "km",
        }
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Unit::Imperial => write!(f, "imperial"),
            Unit::Metric => write!(f, "metric"),
        }
    }
}

impl FromStr for Unit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "imperial" | "mi" | "miles" => Ok(Unit::Imperial),
            "metric" | "km" | "kilometers" => Ok(Unit::Metric),
            other => Err(Error::InvalidRecord(format!("unknown unit of measure '{}'", other))),
        }
    }
}

/// A `{longitude, latitude}` pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub longitude: f64,
    pub latitude: f64,
}

impl Location {
    /// Create a location without range checks
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    /// Create a location, rejecting out-of-range or non-finite degrees
    pub fn checked(longitude: f64, latitude: f64) -> Result<Self> {
        let location = Self::new(longitude, latitude);
        location.validate()?;
        Ok(location)
    }

    /// Check latitude is within [-90, 90] and longitude within [-180, 180]
    pub fn validate(&self) -> Result<()> {
        let lat_ok = self.latitude.is_finite() && (-90.0..=90.0).contains(&self.latitude);
        let lon_ok = self.longitude.is_finite() && (-180.0..=180.0).contains(&self.longitude);
        if lat_ok && lon_ok {
            Ok(())
        } else {
            Err(Error::InvalidCoordinate {
                latitude: self.latitude,
                longitude: self.longitude,
            })
        }
    }

    /// Great-circle distance using the spherical law of cosines.
    ///
    /// Same formula the SQL distance expression evaluates, so host-side
    /// results line up with what the database filters on.
    pub fn distance_to(&self, other: &Location, unit: Unit) -> f64 {
        if self == other {
            return 0.0;
        }

        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let dlon = other.longitude.to_radians() - self.longitude.to_radians();

        let cos_angle = lat1.cos() * lat2.cos() * dlon.cos() + lat1.sin() * lat2.sin();
        unit.earth_radius() * cos_angle.clamp(-1.0, 1.0).acos()
    }

    /// Great-circle distance using the haversine formula.
    ///
    /// Better conditioned than [`Location::distance_to`] for very short
    /// distances.
    pub fn haversine_to(&self, other: &Location, unit: Unit) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let dlat = lat2 - lat1;
        let dlon = (other.longitude - self.longitude).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().clamp(0.0, 1.0).asin();
        unit.earth_radius() * c
    }
}

impl From<Location> for geo_types::Point<f64> {
    fn from(location: Location) -> Self {
        geo_types::Point::new(location.longitude, location.latitude)
    }
}

impl From<geo_types::Point<f64>> for Location {
    fn from(point: geo_types::Point<f64>) -> Self {
        Location::new(point.x(), point.y())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn test_one_degree_at_equator() {
        let a = Location::new(0.0, 0.0);
        let b = Location::new(1.0, 0.0);
        let d = a.distance_to(&b, Unit::Imperial);
        assert!(approx(d, 69.09, 0.05), "got {}", d);
    }

    #[test]
    fn test_zero_distance_to_self() {
        let p = Location::new(-73.9857, 40.7484);
        assert_eq!(p.distance_to(&p, Unit::Imperial), 0.0);
        assert_eq!(p.haversine_to(&p, Unit::Metric), 0.0);
    }

    #[test]
    fn test_symmetric() {
        let a = Location::new(-122.4194, 37.7749);
        let b = Location::new(-118.2437, 34.0522);
        let ab = a.distance_to(&b, Unit::Metric);
        let ba = b.distance_to(&a, Unit::Metric);
        assert!(approx(ab, ba, 1e-9));
    }

    #[test]
    fn test_unit_ratio() {
        let a = Location::new(-87.6298, 41.8781);
        let b = Location::new(-95.3698, 29.7604);
        let mi = a.distance_to(&b, Unit::Imperial);
        let km = a.distance_to(&b, Unit::Metric);
        assert!(approx(mi / km, EARTH_RADIUS_MILES / EARTH_RADIUS_KM, 1e-9));
    }

    #[test]
    fn test_law_of_cosines_matches_haversine() {
        let a = Location::new(-74.0060, 40.7128);
        let b = Location::new(-71.0589, 42.3601);
        let cosines = a.distance_to(&b, Unit::Imperial);
        let haversine = a.haversine_to(&b, Unit::Imperial);
        assert!(approx(cosines, haversine, haversine * 1e-6));
    }

    #[test]
    fn test_checked_rejects_out_of_range() {
        assert!(Location::checked(0.0, 90.0).is_ok());
        assert!(Location::checked(-180.0, -90.0).is_ok());
        assert!(matches!(
            Location::checked(0.0, 90.5),
            Err(Error::InvalidCoordinate { .. })
        ));
        assert!(Location::checked(181.0, 0.0).is_err());
        assert!(Location::checked(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_unit_selectors() {
        assert_eq!(Unit::from_uom("imperial"), Unit::Imperial);
        assert_eq!(Unit::from_uom("metric"), Unit::Metric);
        assert_eq!(Unit::from_uom("furlongs"), Unit::Metric);
        assert_eq!("KM".parse::<Unit>().unwrap(), Unit::Metric);
        assert!("furlongs".parse::<Unit>().is_err());
    }

    #[test]
    fn test_geo_point_conversion() {
        let loc = Location::new(8.5, 47.4);
        let point: geo_types::Point<f64> = loc.into();
        assert_eq!(point.x(), 8.5);
        assert_eq!(point.y(), 47.4);
        assert_eq!(Location::from(point), loc);
    }
}
