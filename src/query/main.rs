//! Radius search CLI.
//!
//! Finds ZIP codes near a known ZIP code or an explicit point and prints
//! the matches as JSON, nearest first.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use zipradius::config::Config;
use zipradius::{Location, Unit, ZipStore};

mod search;
use search::{execute_point_search, execute_zip_search, SearchParams};

#[derive(Parser, Debug)]
#[command(name = "query")]
#[command(about = "ZIP code radius search")]
struct Args {
    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// SQLite database path (overrides config)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Search radius (defaults to config, then 10)
    #[arg(short, long)]
    radius: Option<f64>,

    /// Unit of measure: imperial or metric
    #[arg(short, long)]
    unit: Option<String>,

    /// Maximum number of results
    #[arg(long)]
    max_results: Option<usize>,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search around a stored ZIP code
    Zip {
        /// Five-digit ZIP code
        code: String,
    },
    /// Search around a latitude/longitude
    Point {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr so stdout stays valid JSON
    let subscriber = FmtSubscriber::builder()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::WARN })
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = Config::load_or_default(args.config.as_deref())?;

    let unit: Unit = match &args.unit {
        Some(u) => u.parse()?,
        None => config.search.unit,
    };
    let params = SearchParams {
        radius: args.radius.unwrap_or(config.search.radius),
        unit,
        max_results: args.max_results.unwrap_or(config.search.max_results),
    };

    let db_path = args.db.unwrap_or(config.database.path);
    let store = ZipStore::open(&db_path).context("Failed to open database")?;
    info!("Database holds {} ZIP codes", store.count()?);

    let response = match args.command {
        Command::Zip { code } => execute_zip_search(&store, &code, &params)?,
        Command::Point { lat, lon } => {
            let origin = Location::checked(lon, lat).context("Invalid search point")?;
            execute_point_search(&store, origin, &params)?
        }
    };

    info!(
        "Found {} results in {} ms",
        response.features.len(),
        response.took_ms
    );

    let output = if args.pretty {
        serde_json::to_string_pretty(&response)?
    } else {
        serde_json::to_string(&response)?
    };
    println!("{}", output);

    Ok(())
}
