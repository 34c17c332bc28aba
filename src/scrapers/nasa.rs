//! NASA OIG report scraper.
//!
//! Audit reports are published as one table per fiscal year
//! (`/audits/reports/FY16/tableData.html`), one row per report:
//!
//! | Column | Content |
//! |--------|---------|
//! | 0 | report id, or `N/A` |
//! | 1 | title |
//! | 2 | date, `01/15/16` or `January 15, 2016` |
//! | 3 | file name as plain text, relative to the table page |
//!
//! Investigation ("other") reports are a single bulleted list with the date
//! in a `<strong>`.
//!
//! A few rows carry known data-entry mistakes. They are corrected through
//! [`ROW_OVERRIDES`] rather than by loosening the parser.

use crate::config::NasaConfig;
use crate::error::{Result, ScrapeError};
use crate::fetch::Fetch;
use crate::models::{Inspector, Report, ReportType};
use crate::outputs::ReportSink;
use crate::scrapers::listing::{
    Column, ListingLayout, OverrideAction, RowOverride, TableRow, any_row, element_text,
    find_override, first_link, has_text,
};
use crate::utils::{
    LONG_US_DATE, SHORT_US_DATE, file_type_from_url, parse_date, report_id_from_url, resolve_url,
    truncate_for_log,
};
use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, instrument};

const AGENCY: &str = "nasa";
const AGENCY_NAME: &str = "National Aeronautics and Space Administration";

static AUDIT_ROWS: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").unwrap());
static OTHER_ITEMS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("#subContainer ul li").unwrap());
static STRONG: Lazy<Selector> = Lazy::new(|| Selector::parse("strong").unwrap());

const REPORT_ID: Column = Column::new("report_id", 0);
const TITLE: Column = Column::new("title", 1);
const PUBLISHED_ON: Column = Column::new("published_on", 2);
const LINK: Column = Column::new("link", 3);
const COLUMNS: [Column; 4] = [REPORT_ID, TITLE, PUBLISHED_ON, LINK];

/// Identifiers the audit tables use for "no report number".
const PLACEHOLDER_IDS: [&str; 2] = ["N/A", "NA"];

/// Case-insensitive markers of a withheld document in the link column.
const UNRELEASED_MARKERS: [&str; 2] = ["foia", "not available*"];

/// Known upstream defects in the NASA audit tables.
pub const ROW_OVERRIDES: &[RowOverride] = &[
    // FY11: the IG-11-007-R row has its file name shifted into the date
    // column. The following row carries the complete entry.
    RowOverride {
        source: Inspector::Nasa,
        report_id: Some("IG-11-007-R"),
        column: PUBLISHED_ON,
        raw: "IG-11-007-R.pdf",
        action: OverrideAction::SkipRow,
    },
    // FY17: the id cell for this file does not match its file name.
    RowOverride {
        source: Inspector::Nasa,
        report_id: None,
        column: LINK,
        raw: "IG-17-002A.pdf",
        action: OverrideAction::SetReportId("IG-17-002A"),
    },
];

fn audit_layout() -> ListingLayout {
    ListingLayout {
        rows: &AUDIT_ROWS,
        header_rows: 1,
        keep_row: has_text,
    }
}

fn other_layout() -> ListingLayout {
    ListingLayout {
        rows: &OTHER_ITEMS,
        header_rows: 0,
        keep_row: any_row,
    }
}

/// Scrape the audit table for every year in `years`, then the investigations
/// page, handing each in-range report to `sink`.
///
/// Returns the total number of reports saved.
#[instrument(level = "info", skip_all, fields(years = ?years))]
pub async fn run<F: Fetch, S: ReportSink>(
    fetcher: &F,
    sink: &mut S,
    config: &NasaConfig,
    years: &[i32],
) -> Result<usize> {
    let mut total = 0;

    for &year in years {
        let url = config.audits_url(year);
        info!(year, %url, "Fetching NASA audit reports");

        let body = fetcher.fetch(&url).await?;
        let reports = audit_reports_from(&body, &url, year, config, years)?;
        for report in &reports {
            sink.save(report).await?;
        }
        info!(year, count = reports.len(), "Fetched NASA audit reports");
        total += reports.len();
    }

    let url = &config.other_reports_url;
    info!(%url, "Fetching NASA other reports");
    let body = fetcher.fetch(url).await?;
    let reports = other_reports_from(&body, url, config, years)?;
    for report in &reports {
        sink.save(report).await?;
    }
    info!(count = reports.len(), "Fetched NASA other reports");

    Ok(total + reports.len())
}

/// Map one fiscal-year audit table to in-range reports, in page order.
pub fn audit_reports_from(
    html: &str,
    landing_url: &str,
    year: i32,
    config: &NasaConfig,
    years: &[i32],
) -> Result<Vec<Report>> {
    let document = Html::parse_document(html);
    let label = format!("NASA ({year})");
    let rows = audit_layout().select(&document, &label)?;

    let mut reports = Vec::new();
    for row in rows {
        if let Some(report) = audit_report_from(&TableRow::new(row), landing_url, config, years)? {
            reports.push(report);
        }
    }
    Ok(reports)
}

/// Build one audit report from a table row.
///
/// `Ok(None)` means the row was deliberately skipped: too few cells, a known
/// defect, or a publication year outside `years`.
pub fn audit_report_from(
    row: &TableRow<'_>,
    landing_url: &str,
    config: &NasaConfig,
    years: &[i32],
) -> Result<Option<Report>> {
    if !row.covers(&COLUMNS) {
        debug!(cells = row.len(), "Skipping row with too few cells");
        return Ok(None);
    }

    let mut report_id = row.text(REPORT_ID)?;
    match find_override(ROW_OVERRIDES, Inspector::Nasa, &report_id, row) {
        Some(OverrideAction::SkipRow) => {
            debug!(%report_id, "Skipping known malformed row");
            return Ok(None);
        }
        Some(OverrideAction::SetReportId(fixed)) => report_id = fixed.to_string(),
        None => {}
    }

    let title = row.text(TITLE)?;
    let published_on = parse_date(&row.text(PUBLISHED_ON)?, &[SHORT_US_DATE, LONG_US_DATE])?;
    let link_text = row.text(LINK)?;
    if link_text.is_empty() {
        return Err(ScrapeError::MissingElement {
            field: "link",
            element: "td",
        });
    }
    let resolved = resolve_url(landing_url, &link_text)?;
    let unreleased = is_unreleased(resolved.as_str()) || is_unreleased(&link_text);

    if report_id.is_empty() || PLACEHOLDER_IDS.contains(&report_id.as_str()) {
        report_id = report_id_from_url(&resolved)?;
    }

    if !in_range(published_on, years) {
        debug!(url = %resolved, "Skipping, not in requested range");
        return Ok(None);
    }

    let (url, file_type) = if unreleased {
        (None, None)
    } else {
        (Some(resolved.to_string()), file_type_from_url(&resolved))
    };

    let report = Report {
        inspector: Inspector::Nasa,
        inspector_url: Some(config.inspector_url.clone()),
        agency: AGENCY.to_string(),
        agency_name: Some(AGENCY_NAME.to_string()),
        report_type: ReportType::Audit,
        report_id,
        title,
        url,
        landing_url: Some(landing_url.to_string()),
        published_on,
        year: Some(published_on.year()),
        file_type,
        unreleased,
    };
    report.validate()?;
    debug!(report_id = %report.report_id, unreleased, "Parsed NASA audit report");
    Ok(Some(report))
}

/// Map the investigations page to in-range reports, in page order.
pub fn other_reports_from(
    html: &str,
    page_url: &str,
    config: &NasaConfig,
    years: &[i32],
) -> Result<Vec<Report>> {
    let document = Html::parse_document(html);
    let items = other_layout().select(&document, "NASA (other)")?;

    let mut reports = Vec::new();
    for item in items {
        if let Some(report) = other_report_from(&item, page_url, config, years)? {
            reports.push(report);
        }
    }
    Ok(reports)
}

/// Build one report from an investigations list item.
pub fn other_report_from(
    item: &ElementRef<'_>,
    page_url: &str,
    config: &NasaConfig,
    years: &[i32],
) -> Result<Option<Report>> {
    let link = first_link(item, "title")?;
    let date = item
        .select(&STRONG)
        .next()
        .ok_or(ScrapeError::MissingElement {
            field: "published_on",
            element: "strong",
        })?;
    let published_on = parse_date(&element_text(&date), &[LONG_US_DATE])?;

    let url = resolve_url(page_url, &link.href)?;
    let report_id = report_id_from_url(&url)?;

    if !in_range(published_on, years) {
        debug!(
            %url,
            item = %truncate_for_log(&element_text(item), 80),
            "Skipping, not in requested range"
        );
        return Ok(None);
    }

    let report = Report {
        inspector: Inspector::Nasa,
        inspector_url: Some(config.inspector_url.clone()),
        agency: AGENCY.to_string(),
        agency_name: Some(AGENCY_NAME.to_string()),
        report_type: ReportType::Other,
        report_id,
        title: link.text,
        file_type: file_type_from_url(&url),
        url: Some(url.to_string()),
        landing_url: Some(page_url.to_string()),
        published_on,
        year: Some(published_on.year()),
        unreleased: false,
    };
    report.validate()?;
    Ok(Some(report))
}

fn is_unreleased(text: &str) -> bool {
    let lower = text.to_lowercase();
    UNRELEASED_MARKERS.iter().any(|marker| lower.contains(marker))
}

fn in_range(published_on: NaiveDate, years: &[i32]) -> bool {
    years.contains(&published_on.year())
}
