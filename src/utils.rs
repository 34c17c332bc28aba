//! Field normalization helpers shared by every scraper.
//!
//! This module provides the rules that turn raw listing text into record
//! fields:
//! - Text cleanup (trim, collapse whitespace)
//! - URL resolution against the page a link was scraped from
//! - File type and report id derivation from a resolved URL
//! - Publication date parsing across the formats the sources use
//! - The requested year range for year-paginated sources

use crate::error::{Result, ScrapeError};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::instrument;
use url::Url;

/// `01/15/16`
pub const SHORT_US_DATE: &str = "%m/%d/%y";
/// `January 5, 2016`
pub const LONG_US_DATE: &str = "%B %d, %Y";

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Trim text and collapse internal whitespace runs to one space.
///
/// Hand-maintained tables wrap titles across lines and indent them, so the
/// raw text of a cell often carries newlines in the middle.
pub fn clean_text(s: &str) -> String {
    WHITESPACE.replace_all(s.trim(), " ").into_owned()
}

/// Resolve `href` against the URL of the page it appeared on.
pub fn resolve_url(base: &str, href: &str) -> Result<Url> {
    let base = Url::parse(base)?;
    Ok(base.join(href.trim())?)
}

/// Final path segment of `url`, or `None` if the path is empty.
fn file_name(url: &Url) -> Option<&str> {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|name| !name.is_empty())
}

/// Lower-cased extension of the URL's file name, without the dot.
///
/// # Examples
///
/// ```ignore
/// let url = Url::parse("https://oig.nasa.gov/audits/reports/FY16/IG-16-010.PDF")?;
/// assert_eq!(file_type_from_url(&url), Some("pdf".to_string()));
/// ```
pub fn file_type_from_url(url: &Url) -> Option<String> {
    let name = file_name(url)?;
    match name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => Some(ext.to_lowercase()),
        _ => None,
    }
}

/// Report id derived from the URL's file name with its extension stripped.
///
/// A leading dot does not count as an extension separator, so `.pdf` stays
/// `.pdf`. The remainder is used verbatim.
pub fn report_id_from_url(url: &Url) -> Result<String> {
    let name = file_name(url).ok_or_else(|| ScrapeError::NoReportId(url.to_string()))?;
    let stem = match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => name,
    };
    Ok(stem.to_string())
}

/// Parse a publication date, trying each format in order.
///
/// Fails with [`ScrapeError::UnparseableDate`] if none match.
pub fn parse_date(text: &str, formats: &[&str]) -> Result<NaiveDate> {
    let text = clean_text(text);
    formats
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(&text, format).ok())
        .ok_or(ScrapeError::UnparseableDate { text })
}

/// Years a year-paginated scraper should cover, ascending.
///
/// - `archive` covers everything from `archive_year` on
/// - `since` covers `since..=this_year`, never reaching before `archive_year`
/// - `year` covers that single year
/// - otherwise the current and previous year
///
/// Years past `this_year` are clamped to it.
#[instrument(level = "debug")]
pub fn year_range(
    since: Option<i32>,
    year: Option<i32>,
    archive: bool,
    archive_year: i32,
    this_year: i32,
) -> Vec<i32> {
    let years: Vec<i32> = if archive {
        (archive_year..=this_year).collect()
    } else if let Some(since) = since {
        (since.clamp(archive_year, this_year)..=this_year).collect()
    } else if let Some(year) = year {
        vec![year.min(this_year)]
    } else {
        ((this_year - 1)..=this_year).collect()
    };
    tracing::debug!(?years, "Computed year range");
    years
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut at `max` bytes (backed off to a char boundary) with
/// `"…(+N bytes)"` appended.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}
