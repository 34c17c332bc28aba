//! Record sinks.
//!
//! Scrapers hand each finished [`Report`] to a [`ReportSink`], one at a time.
//! Every sink validates the record first, so nothing that breaks the report
//! invariants is ever persisted.
//!
//! # Submodules
//!
//! - [`json`]: Writes one `report.json` per report
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── dhs/
//! │   └── 2013/
//! │       └── OIG-13-91/
//! │           └── report.json
//! └── nasa/
//!     └── 2016/
//!         └── IG-16-010/
//!             └── report.json
//! ```

pub mod json;

use crate::error::Result;
use crate::models::Report;
use tracing::info;

/// Accepts normalized reports one at a time.
pub trait ReportSink {
    async fn save(&mut self, report: &Report) -> Result<()>;
}

/// Validates and logs reports without writing anything.
#[derive(Debug, Default)]
pub struct DryRunSink {
    pub seen: usize,
}

impl ReportSink for DryRunSink {
    async fn save(&mut self, report: &Report) -> Result<()> {
        report.validate()?;
        let json = serde_json::to_string(report)?;
        self.seen += 1;
        info!(
            inspector = %report.inspector,
            report_id = %report.report_id,
            report = %json,
            "Dry run: would save report"
        );
        Ok(())
    }
}

/// The sink chosen on the command line.
pub enum OutputSink {
    Json(json::JsonSink),
    DryRun(DryRunSink),
}

impl ReportSink for OutputSink {
    async fn save(&mut self, report: &Report) -> Result<()> {
        match self {
            OutputSink::Json(sink) => sink.save(report).await,
            OutputSink::DryRun(sink) => sink.save(report).await,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Inspector, ReportType};
    use chrono::NaiveDate;

    fn unreleased() -> Report {
        Report {
            inspector: Inspector::Nasa,
            inspector_url: None,
            agency: "nasa".to_string(),
            agency_name: None,
            report_type: ReportType::Audit,
            report_id: "IG-12-001".to_string(),
            title: "Withheld".to_string(),
            url: None,
            landing_url: None,
            published_on: NaiveDate::from_ymd_opt(2012, 3, 1).unwrap(),
            year: None,
            file_type: None,
            unreleased: true,
        }
    }

    #[tokio::test]
    async fn test_dry_run_counts_valid_reports() {
        let mut sink = OutputSink::DryRun(DryRunSink::default());
        sink.save(&unreleased()).await.unwrap();

        let OutputSink::DryRun(inner) = sink else {
            panic!("expected dry-run sink");
        };
        assert_eq!(inner.seen, 1);
    }

    #[tokio::test]
    async fn test_dry_run_rejects_invalid_reports() {
        let mut report = unreleased();
        report.unreleased = false;
        let mut sink = DryRunSink::default();
        assert!(sink.save(&report).await.is_err());
        assert_eq!(sink.seen, 0);
    }
}
