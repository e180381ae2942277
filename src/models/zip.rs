//! ZIP code record with coordinates.

use rusqlite::{Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use super::{Location, UsState};
use crate::error::{Error, Result};
use crate::storage::{HasCoordinates, Model};

/// Maximum length of a ZIP code
pub const CODE_MAX_LEN: usize = 5;

/// Maximum length of a city name
pub const CITY_MAX_LEN: usize = 128;

/// A postal code with its city, state and center point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zip {
    /// Row id, `None` until stored
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    /// Five-digit ZIP code (kept as text to preserve leading zeros)
    pub code: String,

    pub city: String,

    pub state: UsState,

    /// Degrees, [-90, 90]
    pub latitude: f64,

    /// Degrees, [-180, 180]
    pub longitude: f64,
}

impl Zip {
    /// Create a validated, not yet stored record
    pub fn new(code: &str, city: &str, state: UsState, location: Location) -> Result<Self> {
        let zip = Self {
            id: None,
            code: code.trim().to_string(),
            city: city.trim().to_string(),
            state,
            latitude: location.latitude,
            longitude: location.longitude,
        };
        zip.validate()?;
        Ok(zip)
    }

    /// Check field lengths and coordinate ranges
    pub fn validate(&self) -> Result<()> {
        if self.code.is_empty() || self.code.chars().count() > CODE_MAX_LEN {
            return Err(Error::InvalidRecord(format!(
                "zip code '{}' must be 1 to {} characters",
                self.code, CODE_MAX_LEN
            )));
        }
        if self.city.chars().count() > CITY_MAX_LEN {
            return Err(Error::InvalidRecord(format!(
                "city name for {} exceeds {} characters",
                self.code, CITY_MAX_LEN
            )));
        }
        self.location().validate()
    }

    /// Look up the first record with `code` (ties broken by row id)
    pub fn find_by_code(conn: &Connection, code: &str) -> Result<Option<Zip>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE code = ?1 ORDER BY code, id LIMIT 1",
            Self::COLUMNS.join(", "),
            Self::TABLE
        );
        let zip = conn
            .query_row(&sql, [code], |row| Zip::from_row(row))
            .optional()?;
        Ok(zip)
    }
}

impl std::fmt::Display for Zip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.state, self.code)
    }
}

impl Model for Zip {
    const TABLE: &'static str = "zips";
    const COLUMNS: &'static [&'static str] =
        &["id", "code", "city", "state", "latitude", "longitude"];
    const DEFAULT_ORDER: Option<&'static str> = Some("code");

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            code: row.get(1)?,
            city: row.get(2)?,
            state: row.get(3)?,
            latitude: row.get(4)?,
            longitude: row.get(5)?,
        })
    }
}

impl HasCoordinates for Zip {
    fn location(&self) -> Location {
        Location::new(self.longitude, self.latitude)
    }

    fn set_location(&mut self, location: Location) {
        self.latitude = location.latitude;
        self.longitude = location.longitude;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn beverly_hills() -> Zip {
        Zip::new(
            "90210",
            "Beverly Hills",
            UsState::California,
            Location::new(-118.4065, 34.0901),
        )
        .unwrap()
    }

    #[test]
    fn test_location_roundtrip() {
        let mut zip = beverly_hills();
        assert_eq!(zip.location(), Location::new(-118.4065, 34.0901));

        zip.set_location(Location::new(-73.9967, 40.7506));
        assert_eq!(zip.latitude, 40.7506);
        assert_eq!(zip.longitude, -73.9967);
    }

    #[test]
    fn test_display() {
        assert_eq!(beverly_hills().to_string(), "CA: 90210");
    }

    #[test]
    fn test_rejects_long_code() {
        let err = Zip::new("902101", "X", UsState::California, Location::new(0.0, 0.0));
        assert!(matches!(err, Err(Error::InvalidRecord(_))));
    }

    #[test]
    fn test_rejects_long_city() {
        let city = "a".repeat(CITY_MAX_LEN + 1);
        assert!(Zip::new("12345", &city, UsState::Ohio, Location::new(0.0, 0.0)).is_err());
    }

    #[test]
    fn test_rejects_bad_coordinates() {
        let err = Zip::new("12345", "Nowhere", UsState::Ohio, Location::new(-200.0, 10.0));
        assert!(matches!(err, Err(Error::InvalidCoordinate { .. })));
    }

    #[test]
    fn test_json_shape() {
        let value = serde_json::to_value(beverly_hills()).unwrap();
        assert_eq!(value["code"], "90210");
        assert_eq!(value["state"], "CA");
        assert!(value.get("id").is_none());
    }
}
