//! Data models for harvested inspector-general reports.
//!
//! This module defines the canonical record every scraper emits:
//! - [`Report`]: one normalized report entry
//! - [`Inspector`]: which oversight office (and scraper) produced it
//! - [`ReportType`]: coarse classification of the report
//!
//! Field names serialize exactly as downstream consumers expect them
//! (`type`, `published_on`, ...). Optional fields are omitted when absent and
//! `unreleased` only appears when it is `true`.

use crate::error::{Result, ScrapeError};
use chrono::{Datelike, NaiveDate};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// The oversight office a report was scraped from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Inspector {
    /// Department of Homeland Security OIG (component tables).
    Dhs,
    /// NASA OIG (per-year audit tables plus the investigations page).
    Nasa,
}

impl Inspector {
    pub fn as_str(&self) -> &'static str {
        match self {
            Inspector::Dhs => "dhs",
            Inspector::Nasa => "nasa",
        }
    }
}

impl fmt::Display for Inspector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse report classification. Some sources cannot tell audits apart from
/// other reports, so they use [`ReportType::Report`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    Report,
    Audit,
    Other,
}

/// A single normalized report record.
///
/// Records are built once per source row, validated, handed to a sink, and
/// never touched again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Which scraper produced the record.
    pub inspector: Inspector,
    /// Home page of the oversight office.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inspector_url: Option<String>,
    /// Owning agency tag.
    pub agency: String,
    /// Human-readable agency name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agency_name: Option<String>,
    #[serde(rename = "type")]
    pub report_type: ReportType,
    pub report_id: String,
    pub title: String,
    /// Absolute document URL; absent for unreleased reports.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// The listing page the record was scraped from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landing_url: Option<String>,
    /// Serialized as `YYYY-MM-DD`.
    pub published_on: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    /// Lower-cased extension of the linked document, without the dot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub unreleased: bool,
}

impl Report {
    /// Year used for grouping on disk: the explicit `year` if set, otherwise
    /// the publication year.
    pub fn filing_year(&self) -> i32 {
        self.year.unwrap_or_else(|| self.published_on.year())
    }

    /// Check the record invariants. Sinks call this before persisting.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| ScrapeError::InvalidReport {
            report_id: self.report_id.clone(),
            reason: reason.to_string(),
        };

        if self.report_id.trim().is_empty() {
            return Err(invalid("empty report_id"));
        }
        if self.title.trim().is_empty() {
            return Err(invalid("empty title"));
        }
        match (&self.url, self.unreleased) {
            (Some(_), true) => return Err(invalid("unreleased report carries a url")),
            (None, false) => return Err(invalid("released report has no url")),
            (Some(url), false) => {
                // Url::parse rejects relative references outright.
                Url::parse(url).map_err(|_| invalid("url is not absolute"))?;
            }
            (None, true) => {}
        }
        Ok(())
    }
}
