//! CSV import of ZIP records.
//!
//! Expected columns (header names, any order): `code`, `city`, `state`,
//! `latitude`, `longitude`. Common aliases (`zip`, `lat`, `lon`, `lng`) are
//! accepted. Files ending in `.gz` are decompressed on the fly.

use csv::{ReaderBuilder, StringRecord};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::models::{Location, UsState, Zip};

/// Counters for one import run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportStats {
    /// Rows that passed validation and were handed to the sink
    pub accepted: usize,
    /// Rows skipped because they failed validation
    pub skipped: usize,
}

/// Column positions resolved from the header row
struct Columns {
    code: usize,
    city: usize,
    state: usize,
    latitude: usize,
    longitude: usize,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |names: &[&str]| {
            headers
                .iter()
                .position(|h| names.iter().any(|n| h.trim().eq_ignore_ascii_case(n)))
                .ok_or_else(|| {
                    Error::InvalidRecord(format!("column '{}' not found in header", names[0]))
                })
        };

        Ok(Self {
            code: find(&["code", "zip", "zipcode", "zip_code"])?,
            city: find(&["city"])?,
            state: find(&["state", "state_code"])?,
            latitude: find(&["latitude", "lat"])?,
            longitude: find(&["longitude", "lon", "lng"])?,
        })
    }

    fn parse(&self, record: &StringRecord) -> Result<Zip> {
        let field = |idx: usize| record.get(idx).unwrap_or("").trim();
        let degrees = |idx: usize| {
            field(idx)
                .parse::<f64>()
                .map_err(|_| Error::InvalidRecord(format!("'{}' is not a number", field(idx))))
        };

        let state: UsState = field(self.state).parse()?;
        let location = Location::checked(degrees(self.longitude)?, degrees(self.latitude)?)?;
        Zip::new(field(self.code), field(self.city), state, location)
    }
}

/// Open an import file, transparently decompressing `.gz`
pub fn open_reader(path: &Path) -> Result<Box<dyn Read>> {
    let file = File::open(path)?;
    let reader: Box<dyn Read> = if path.extension().map_or(false, |e| e == "gz") {
        Box::new(GzDecoder::new(file))
    } else {
        Box::new(file)
    };
    Ok(reader)
}

/// Parse ZIP records from CSV, passing each valid one to `sink`.
///
/// Invalid rows are logged and skipped; errors from `sink` abort the load.
pub fn load_zips<R, F>(reader: R, mut sink: F) -> Result<ImportStats>
where
    R: Read,
    F: FnMut(Zip) -> Result<()>,
{
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let columns = Columns::from_headers(csv_reader.headers()?)?;
    let mut stats = ImportStats::default();

    for (line, result) in csv_reader.records().enumerate() {
        let record = result?;
        match columns.parse(&record) {
            Ok(zip) => {
                sink(zip)?;
                stats.accepted += 1;
            }
            Err(e) => {
                // +2: header row and 1-based numbering
                warn!("Skipping row {}: {}", line + 2, e);
                stats.skipped += 1;
            }
        }
    }

    info!(
        "Parsed {} ZIP records ({} skipped)",
        stats.accepted, stats.skipped
    );
    Ok(stats)
}

/// [`load_zips`] on a file path
pub fn load_zips_from_path<F>(path: &Path, sink: F) -> Result<ImportStats>
where
    F: FnMut(Zip) -> Result<()>,
{
    info!("Loading ZIP records from {}", path.display());
    load_zips(open_reader(path)?, sink)
}
