//! Error types for ZIP storage and radius search.

use thiserror::Error;

/// Radius search errors.
#[derive(Error, Debug)]
pub enum Error {
    /// The queried entity does not expose the columns a distance query needs.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Latitude or longitude outside the valid range.
    #[error("Invalid coordinate: latitude={latitude}, longitude={longitude}")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    /// A record failed validation at the data-entry boundary.
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// Search radius is negative or not a number.
    #[error("Invalid radius: {0}")]
    InvalidRadius(f64),

    /// Lookup by code found nothing.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Error raised by SQLite.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// IO error while reading import files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV decoding error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type for radius search operations.
pub type Result<T> = std::result::Result<T, Error>;
