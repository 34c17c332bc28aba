//! Inspector-general report scrapers.
//!
//! Each submodule scrapes one oversight office. Both follow the same shape:
//!
//! 1. **Fetching**: build a listing URL per unit of work (component or year)
//!    and fetch it through [`crate::fetch::Fetch`]
//! 2. **Mapping**: select report rows with a [`listing::ListingLayout`] and map
//!    each one to a [`crate::models::Report`]
//! 3. **Saving**: hand every report to a [`crate::outputs::ReportSink`]
//!
//! # Supported Sources
//!
//! | Source | Module | Unit of work | Notes |
//! |--------|--------|--------------|-------|
//! | DHS OIG | [`dhs`] | component | One table per component; `--component`, `--limit` |
//! | NASA OIG | [`nasa`] | fiscal year | Per-year audit tables plus one investigations page |
//!
//! # Common Patterns
//!
//! Each scraper module exports:
//! - `run(fetcher, sink, config, ...)`: scrape everything, return the number saved
//! - pure `*_from` functions mapping fetched HTML to reports, used by `run` and tests
//!
//! Units are processed one after another. A listing that comes back empty
//! raises [`crate::error::ScrapeError::NoReportsFound`]; a row that cannot be
//! read stops its unit rather than producing a partial record.

pub mod dhs;
pub mod listing;
pub mod nasa;
