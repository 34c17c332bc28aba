//! # IG Reports
//!
//! Harvests the report listings that government inspector-general offices
//! publish on their websites and turns each hand-maintained table row into a
//! normalized JSON record.
//!
//! ## Features
//!
//! - Scrapes DHS OIG component listings and NASA OIG per-year audit tables
//!   plus its investigations page
//! - Normalizes dates to ISO `YYYY-MM-DD`, resolves relative links, derives
//!   missing report ids and file types from document URLs
//! - Marks withheld reports as unreleased instead of linking them
//! - Writes one `report.json` per report, or logs them with `--dry-run`
//!
//! ## Usage
//!
//! ```sh
//! ig_reports -o ./data --since 2014
//! ```
//!
//! ## Architecture
//!
//! The application runs each scraper in turn:
//! 1. **Fetching**: one listing page at a time, no concurrency, no retries
//! 2. **Mapping**: rows to [`models::Report`] through shared normalization rules
//! 3. **Output**: each report is validated and handed to the chosen sink

use chrono::{Datelike, Local};
use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod error;
mod fetch;
mod models;
mod outputs;
mod scrapers;
mod utils;

use cli::Cli;
use fetch::HttpFetcher;
use models::Inspector;
use outputs::json::JsonSink;
use outputs::{DryRunSink, OutputSink};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("ig_reports starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let config = config::load_config(args.config.as_deref()).await?;
    let fetcher = HttpFetcher::new(&config.http)?;
    let mut sink = if args.dry_run {
        OutputSink::DryRun(DryRunSink::default())
    } else {
        OutputSink::Json(JsonSink::new(&args.output_dir))
    };

    let mut total = 0;

    if args.runs(Inspector::Dhs) {
        match scrapers::dhs::run(&fetcher, &mut sink, &config.dhs, &args.dhs_options()).await {
            Ok(count) => {
                info!(inspector = "dhs", count, "Finished inspector");
                total += count;
            }
            Err(e) => {
                error!(inspector = "dhs", error = %e, "Scrape failed");
                return Err(e.into());
            }
        }
    }

    if args.runs(Inspector::Nasa) {
        let years = args.year_range(config.nasa.archive_year, Local::now().year());
        match scrapers::nasa::run(&fetcher, &mut sink, &config.nasa, &years).await {
            Ok(count) => {
                info!(inspector = "nasa", count, "Finished inspector");
                total += count;
            }
            Err(e) => {
                error!(inspector = "nasa", error = %e, "Scrape failed");
                return Err(e.into());
            }
        }
    }

    let persisted = match &sink {
        OutputSink::Json(json) => json.written,
        OutputSink::DryRun(dry_run) => dry_run.seen,
    };

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        reports = total,
        persisted,
        output_dir = %args.output_dir,
        dry_run = args.dry_run,
        "Execution complete"
    );

    Ok(())
}
