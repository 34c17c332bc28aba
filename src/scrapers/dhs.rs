//! DHS OIG report scraper.
//!
//! DHS publishes one listing page per organizational component, each holding
//! every report for that component in a hand-maintained table:
//!
//! ```text
//! table.contentpaneopen
//! └── table[border=1]
//!     ├── <tr align=...>   header / decoration
//!     └── <tr>             date | report id | <a href=...>title</a>
//! ```
//!
//! The markup does not separate header rows from body rows with `thead` or
//! `tbody`; the only reliable tell is that decorative rows carry an `align`
//! attribute. That rule lives in [`is_report_row`].

use crate::config::{ComponentConfig, DhsConfig};
use crate::error::Result;
use crate::fetch::Fetch;
use crate::models::{Inspector, Report, ReportType};
use crate::outputs::ReportSink;
use crate::scrapers::listing::{Column, ListingLayout, TableRow};
use crate::utils::{
    SHORT_US_DATE, file_type_from_url, parse_date, report_id_from_url, resolve_url,
};
use chrono::Datelike;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, instrument};

const UMBRELLA_TAG: &str = "dhs";

static ROWS: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"table.contentpaneopen table[border="1"] tr"#).unwrap());

const PUBLISHED_ON: Column = Column::new("published_on", 0);
const REPORT_ID: Column = Column::new("report_id", 1);
const LINK: Column = Column::new("link", 2);
const COLUMNS: [Column; 3] = [PUBLISHED_ON, REPORT_ID, LINK];

/// Body rows have no `align` attribute; header and spacer rows do.
pub fn is_report_row(row: &ElementRef<'_>) -> bool {
    row.value().attr("align").is_none()
}

fn layout() -> ListingLayout {
    ListingLayout {
        rows: &ROWS,
        header_rows: 0,
        keep_row: is_report_row,
    }
}

/// Run options for the DHS scraper.
#[derive(Debug, Clone, Default)]
pub struct DhsOptions {
    /// Only scrape this component.
    pub component: Option<String>,
    /// Maximum reports per component; 0 means no limit.
    pub limit: usize,
}

/// Scrape every selected component and hand each report to `sink`.
///
/// Components are processed in configuration order. Returns the total number
/// of reports saved.
#[instrument(
    level = "info",
    skip_all,
    fields(component = ?options.component, limit = options.limit)
)]
pub async fn run<F: Fetch, S: ReportSink>(
    fetcher: &F,
    sink: &mut S,
    config: &DhsConfig,
    options: &DhsOptions,
) -> Result<usize> {
    let components: Vec<&ComponentConfig> = match &options.component {
        Some(name) => vec![config.component(name)?],
        None => config.components.iter().collect(),
    };

    let mut total = 0;
    for component in components {
        let url = config.listing_url(component);
        info!(component = %component.name, %url, "Fetching reports for component");

        let body = fetcher.fetch(&url).await?;
        let reports = reports_from_listing(&body, component, config, &url, options.limit)?;
        for report in &reports {
            sink.save(report).await?;
        }

        info!(component = %component.name, count = reports.len(), "Fetched reports for component");
        total += reports.len();
    }
    Ok(total)
}

/// Map a component listing page to reports, stopping after `limit` rows
/// (0 = all). Any malformed row fails the whole page.
pub fn reports_from_listing(
    html: &str,
    component: &ComponentConfig,
    config: &DhsConfig,
    landing_url: &str,
    limit: usize,
) -> Result<Vec<Report>> {
    let document = Html::parse_document(html);
    let label = format!("DHS ({})", component.name);
    let rows = layout().select(&document, &label)?;
    let take = if limit == 0 { rows.len() } else { limit };

    rows.into_iter()
        .take(take)
        .map(|row| report_from(&TableRow::new(row), component, config, landing_url))
        .collect()
}

/// Build one report from a component table row.
pub fn report_from(
    row: &TableRow<'_>,
    component: &ComponentConfig,
    config: &DhsConfig,
    landing_url: &str,
) -> Result<Report> {
    row.require(&COLUMNS)?;

    let published_on = parse_date(&row.text(PUBLISHED_ON)?, &[SHORT_US_DATE])?;
    let link = row.link(LINK)?;
    let url = resolve_url(landing_url, &link.href)?;

    let report_id = match row.text(REPORT_ID)? {
        id if id.is_empty() => report_id_from_url(&url)?,
        id => id,
    };

    // Top-level DHS components file under the umbrella tag; every other
    // component is its own agency.
    let agency = if component.name.starts_with(&config.umbrella_prefix) {
        UMBRELLA_TAG.to_string()
    } else {
        component.name.clone()
    };

    let report = Report {
        inspector: Inspector::Dhs,
        inspector_url: Some(config.inspector_url.clone()),
        agency,
        agency_name: component.agency_name.clone(),
        report_type: ReportType::Report,
        report_id,
        title: link.text,
        file_type: file_type_from_url(&url),
        url: Some(url.to_string()),
        landing_url: Some(landing_url.to_string()),
        published_on,
        year: Some(published_on.year()),
        unreleased: false,
    };
    report.validate()?;
    debug!(
        report_id = %report.report_id,
        published_on = %report.published_on,
        "Parsed DHS report"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScrapeError;
    use crate::fetch::testing::StaticFetcher;
    use crate::outputs::testing::MemorySink;

    fn listing(rows: &[String]) -> String {
        format!(
            r#"<html><body>
            <table class="contentpaneopen"><tr><td>
              <table border="1">
                <tr align="center"><td>Date</td><td>Report Number</td><td>Title</td></tr>
                {}
              </table>
            </td></tr></table>
            </body></html>"#,
            rows.join("\n")
        )
    }

    fn row(date: &str, id: &str, href: &str, title: &str) -> String {
        format!(r#"<tr><td>{date}</td><td>{id}</td><td><a href="{href}">{title}</a></td></tr>"#)
    }

    fn five_rows() -> String {
        let rows: Vec<String> = (1..=5)
            .map(|n| {
                row(
                    &format!("05/0{n}/13"),
                    &format!("OIG-13-9{n}"),
                    &format!("/assets/Mgmt/2013/OIG_13-9{n}.pdf"),
                    &format!("Report {n}"),
                )
            })
            .collect();
        listing(&rows)
    }

    fn component(name: &str) -> ComponentConfig {
        DhsConfig::default().component(name).unwrap().clone()
    }

    const TSA_URL: &str =
        "http://www.oig.dhs.gov/index.php?option=com_content&view=article&id=22&Itemid=46";

    #[test]
    fn test_is_report_row() {
        let html = Html::parse_document(
            r#"<table><tr align="left"><td>h</td></tr><tr><td>b</td></tr></table>"#,
        );
        let selector = Selector::parse("tr").unwrap();
        let kept: Vec<bool> = html.select(&selector).map(|r| is_report_row(&r)).collect();
        assert_eq!(kept, vec![false, true]);
    }

    #[test]
    fn test_report_from_component_row() {
        let html = listing(&[row(
            " 05/06/13 ",
            " OIG-13-91 ",
            "/assets/Mgmt/2013/OIG_13-91_May13.PDF",
            "TSA Management of Aviation Security Activities",
        )]);
        let config = DhsConfig::default();
        let reports = reports_from_listing(&html, &component("tsa"), &config, TSA_URL, 0).unwrap();

        assert_eq!(reports.len(), 1);
        let report = &reports[0];
        assert_eq!(report.inspector, Inspector::Dhs);
        assert_eq!(report.agency, "tsa");
        assert_eq!(
            report.agency_name.as_deref(),
            Some("Transportation Security Administration")
        );
        assert_eq!(report.report_type, ReportType::Report);
        assert_eq!(report.report_id, "OIG-13-91");
        assert_eq!(report.title, "TSA Management of Aviation Security Activities");
        assert_eq!(
            report.url.as_deref(),
            Some("http://www.oig.dhs.gov/assets/Mgmt/2013/OIG_13-91_May13.PDF")
        );
        assert_eq!(report.file_type.as_deref(), Some("pdf"));
        assert_eq!(report.published_on.to_string(), "2013-05-06");
        assert_eq!(report.year, Some(2013));
        assert_eq!(report.landing_url.as_deref(), Some(TSA_URL));
        assert!(report.validate().is_ok());
    }

    #[test]
    fn test_umbrella_component_files_under_dhs() {
        let html = listing(&[row("01/02/14", "OIG-14-01", "a.pdf", "Mgmt report")]);
        let config = DhsConfig::default();
        let reports =
            reports_from_listing(&html, &component("dhs_mgmt"), &config, TSA_URL, 0).unwrap();
        assert_eq!(reports[0].agency, "dhs");
    }

    #[test]
    fn test_empty_report_id_falls_back_to_url() {
        let html = listing(&[row("01/02/14", "  ", "/assets/OIG_14-02.pdf", "No id")]);
        let config = DhsConfig::default();
        let reports = reports_from_listing(&html, &component("ice"), &config, TSA_URL, 0).unwrap();
        assert_eq!(reports[0].report_id, "OIG_14-02");
    }

    #[test]
    fn test_row_without_link_is_fatal() {
        let html = listing(&[
            row("01/02/14", "OIG-14-01", "a.pdf", "fine"),
            "<tr><td>01/03/14</td><td>OIG-14-02</td><td>Title only</td></tr>".to_string(),
        ]);
        let config = DhsConfig::default();
        let err = reports_from_listing(&html, &component("cbp"), &config, TSA_URL, 0).unwrap_err();
        assert!(matches!(err, ScrapeError::MissingElement { field: "link", .. }));
    }

    #[tokio::test]
    async fn test_invalid_row_saves_nothing_from_its_component() {
        let html = listing(&[
            row("01/02/14", "OIG-14-01", "a.pdf", "Good"),
            row("01/03/14", "OIG-14-02", "b.pdf", r#"<img src="x.png">"#),
        ]);
        let fetcher = StaticFetcher::default().with_page(TSA_URL, &html);
        let mut sink = MemorySink::default();
        let options = DhsOptions {
            component: Some("tsa".to_string()),
            limit: 0,
        };

        let err = run(&fetcher, &mut sink, &DhsConfig::default(), &options)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ScrapeError::InvalidReport { ref report_id, ref reason }
                if report_id == "OIG-14-02" && reason == "empty title"
        ));
        assert!(sink.reports.is_empty());
    }

    #[test]
    fn test_short_row_is_fatal() {
        let html = listing(&["<tr><td>01/03/14</td><td>OIG-14-02</td></tr>".to_string()]);
        let config = DhsConfig::default();
        let err = reports_from_listing(&html, &component("cbp"), &config, TSA_URL, 0).unwrap_err();
        assert!(matches!(err, ScrapeError::MissingColumn { field: "link", index: 2 }));
    }

    #[test]
    fn test_bad_date_is_fatal() {
        let html = listing(&[row("May 2013", "OIG-13-91", "a.pdf", "t")]);
        let config = DhsConfig::default();
        let err = reports_from_listing(&html, &component("cbp"), &config, TSA_URL, 0).unwrap_err();
        assert!(matches!(err, ScrapeError::UnparseableDate { .. }));
    }

    #[test]
    fn test_missing_table_is_no_reports_found() {
        let config = DhsConfig::default();
        let err =
            reports_from_listing("<p>Site maintenance</p>", &component("tsa"), &config, TSA_URL, 0)
                .unwrap_err();
        assert!(matches!(err, ScrapeError::NoReportsFound(label) if label == "DHS (tsa)"));
    }

    #[tokio::test]
    async fn test_run_respects_limit() {
        let fetcher = StaticFetcher::default().with_page(TSA_URL, &five_rows());
        let mut sink = MemorySink::default();
        let options = DhsOptions {
            component: Some("tsa".to_string()),
            limit: 2,
        };

        let count = run(&fetcher, &mut sink, &DhsConfig::default(), &options)
            .await
            .unwrap();

        assert_eq!(count, 2);
        let ids: Vec<&str> = sink.reports.iter().map(|r| r.report_id.as_str()).collect();
        assert_eq!(ids, vec!["OIG-13-91", "OIG-13-92"]);
        assert_eq!(*fetcher.requested.borrow(), vec![TSA_URL.to_string()]);
    }

    #[tokio::test]
    async fn test_run_without_limit_saves_every_row() {
        let fetcher = StaticFetcher::default().with_page(TSA_URL, &five_rows());
        let mut sink = MemorySink::default();
        let options = DhsOptions {
            component: Some("tsa".to_string()),
            limit: 0,
        };

        let count = run(&fetcher, &mut sink, &DhsConfig::default(), &options)
            .await
            .unwrap();
        assert_eq!(count, 5);
        assert_eq!(sink.reports.len(), 5);
    }

    #[tokio::test]
    async fn test_run_all_components_in_config_order() {
        let config = crate::config::parse_config(
            r#"
dhs:
  components:
    - { name: fema, id: 25, item_id: 38 }
    - { name: dhs_other, id: 59, item_id: 50 }
"#,
        )
        .unwrap()
        .dhs;
        let fema_url = config.listing_url(&config.components[0]);
        let other_url = config.listing_url(&config.components[1]);
        let fetcher = StaticFetcher::default()
            .with_page(&fema_url, &listing(&[row("02/01/15", "OIG-15-01", "f.pdf", "FEMA")]))
            .with_page(&other_url, &listing(&[row("02/02/15", "OIG-15-02", "o.pdf", "Other")]));
        let mut sink = MemorySink::default();

        let count = run(&fetcher, &mut sink, &config, &DhsOptions::default())
            .await
            .unwrap();

        assert_eq!(count, 2);
        assert_eq!(*fetcher.requested.borrow(), vec![fema_url, other_url]);
        assert_eq!(sink.reports[0].agency, "fema");
        assert_eq!(sink.reports[1].agency, "dhs");
        assert_eq!(sink.reports[1].agency_name, None);
    }

    #[tokio::test]
    async fn test_run_unknown_component() {
        let fetcher = StaticFetcher::default();
        let mut sink = MemorySink::default();
        let options = DhsOptions {
            component: Some("nsa".to_string()),
            limit: 0,
        };
        let err = run(&fetcher, &mut sink, &DhsConfig::default(), &options)
            .await
            .unwrap_err();
        assert!(matches!(err, ScrapeError::UnknownComponent(_)));
        assert!(fetcher.requested.borrow().is_empty());
    }
}
