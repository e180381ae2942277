//! ZIP code CSV ingest.
//!
//! Validates each row, bulk-inserts it into the SQLite database and
//! reports how many rows were accepted.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use zipradius::config::Config;
use zipradius::import::{load_zips_from_path, ImportStats};
use zipradius::storage::{BulkInserter, ZipStore};

#[derive(Parser, Debug)]
#[command(name = "ingest")]
#[command(about = "Import ZIP code CSV data into SQLite")]
struct Args {
    /// CSV file to import (optionally .gz)
    #[arg(short, long)]
    file: PathBuf,

    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// SQLite database path (overrides config)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Batch size for bulk inserts (overrides config)
    #[arg(long)]
    batch_size: Option<usize>,

    /// Delete existing records before import
    #[arg(long)]
    replace: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = Config::load_or_default(args.config.as_deref())?;
    let db_path = args.db.unwrap_or(config.database.path);
    let batch_size = args.batch_size.unwrap_or(config.import.batch_size);

    info!("ZIP Ingest");
    info!("File: {}", args.file.display());

    let store = ZipStore::open(&db_path).context("Failed to open database")?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {pos} rows ({per_sec})")?,
    );

    let summary = import_file(&store, &args.file, batch_size, args.replace, || pb.inc(1))?;

    pb.finish_with_message("Processing complete");

    if summary.removed > 0 {
        info!("Removed {} existing records", summary.removed);
    }
    if summary.parsed.skipped > 0 {
        warn!(
            "{} rows failed validation and were skipped",
            summary.parsed.skipped
        );
    }
    info!(
        "Inserted {} records ({} rejected by database)",
        summary.inserted, summary.rejected
    );
    info!("Total records in database: {}", store.count()?);

    Ok(())
}

/// Outcome of one import run
#[derive(Debug, Default)]
struct ImportSummary {
    removed: usize,
    parsed: ImportStats,
    inserted: usize,
    rejected: usize,
}

/// Load `file` into the store inside one transaction.
///
/// With `replace`, existing records are deleted in the same transaction, so
/// a failed import leaves the table as it was.
fn import_file(
    store: &ZipStore,
    file: &Path,
    batch_size: usize,
    replace: bool,
    mut on_row: impl FnMut(),
) -> Result<ImportSummary> {
    let tx = store.connection().unchecked_transaction()?;
    let mut summary = ImportSummary::default();

    if replace {
        summary.removed = tx
            .execute("DELETE FROM zips", [])
            .context("Failed to clear existing records")?;
    }

    let mut inserter = BulkInserter::new(&tx, batch_size);
    summary.parsed = load_zips_from_path(file, |zip| {
        on_row();
        inserter.add(zip)
    })
    .context("Failed to import CSV")?;

    (summary.inserted, summary.rejected) = inserter.finish()?;
    tx.commit().context("Failed to commit import")?;

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use zipradius::{Location, UsState, Zip};

    fn store_with_one() -> ZipStore {
        let store = ZipStore::open_in_memory().unwrap();
        let zip = Zip::new("10001", "New York", UsState::NewYork, Location::new(-73.9967, 40.7506))
            .unwrap();
        store.insert(&zip).unwrap();
        store
    }

    #[test]
    fn test_replace_swaps_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zips.csv");
        fs::write(
            &path,
            "code,city,state,latitude,longitude\n\
             02108,Boston,MA,42.3576,-71.0657\n\
             02109,Boston,MA,42.3601,-71.0513\n",
        )
        .unwrap();

        let store = store_with_one();
        let mut rows = 0;
        let summary = import_file(&store, &path, 1, true, || rows += 1).unwrap();

        assert_eq!(summary.removed, 1);
        assert_eq!(summary.inserted, 2);
        assert_eq!(rows, 2);
        assert_eq!(store.count().unwrap(), 2);
        assert!(store.get_by_code("10001").unwrap().is_none());
    }

    #[test]
    fn test_failed_replace_keeps_existing_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.csv");
        // no longitude column
        fs::write(&path, "code,city,state,latitude\n02108,Boston,MA,42.3576\n").unwrap();

        let store = store_with_one();
        assert!(import_file(&store, &path, 100, true, || {}).is_err());

        let missing = dir.path().join("missing.csv");
        assert!(import_file(&store, &missing, 100, true, || {}).is_err());

        assert_eq!(store.count().unwrap(), 1);
        assert!(store.get_by_code("10001").unwrap().is_some());
    }

    #[test]
    fn test_failed_append_rolls_back_earlier_batches() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corrupt.csv");
        // the last row is not valid UTF-8, which aborts the read
        let mut contents = b"code,city,state,latitude,longitude\n\
            02108,Boston,MA,42.3576,-71.0657\n\
            02109,Boston,MA,42.3601,-71.0513\n"
            .to_vec();
        contents.extend_from_slice(b"02110,Bost\xff\xfe,MA,42.3576,-71.0657\n");
        fs::write(&path, contents).unwrap();

        let store = store_with_one();
        assert!(import_file(&store, &path, 1, false, || {}).is_err());
        assert_eq!(store.count().unwrap(), 1);
    }
}
