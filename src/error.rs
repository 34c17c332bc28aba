//! Error types shared by the scrapers, sinks, and configuration loader.
//!
//! [`ScrapeError::NoReportsFound`] is the structural signal: a listing that
//! must contain rows came back empty, which almost always means the upstream
//! page layout changed. Every other variant is either a field-level problem
//! with a single row or an ambient failure (network, disk, config).

use thiserror::Error;

/// Everything that can stop a scrape.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// An expected listing selection was empty.
    #[error("no reports found for {0}; the page layout may have changed")]
    NoReportsFound(String),

    /// A row is shorter than the column table for its source says it must be.
    #[error("row is missing the `{field}` column (index {index})")]
    MissingColumn { field: &'static str, index: usize },

    /// A cell or list item lacks the element a field is read from.
    #[error("missing <{element}> for `{field}`")]
    MissingElement {
        field: &'static str,
        element: &'static str,
    },

    #[error("could not parse publication date {text:?}")]
    UnparseableDate { text: String },

    #[error("cannot derive a report id from {0}")]
    NoReportId(String),

    #[error("unknown component `{0}`")]
    UnknownComponent(String),

    /// A record broke one of the report invariants before being saved.
    #[error("invalid report {report_id:?}: {reason}")]
    InvalidReport { report_id: String, reason: String },

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    #[error("fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("config error: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = ScrapeError> = std::result::Result<T, E>;
