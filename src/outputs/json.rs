//! JSON output for harvested reports.
//!
//! Each report is written to its own file so reruns overwrite in place:
//! ```text
//! {output_dir}/{inspector}/{year}/{report_id}/report.json
//! ```

use super::ReportSink;
use crate::error::Result;
use crate::models::Report;
use std::path::PathBuf;
use tokio::fs;
use tracing::{debug, error, instrument};

/// Writes each report as pretty-printed JSON under `output_dir`.
pub struct JsonSink {
    output_dir: PathBuf,
    pub written: usize,
}

impl JsonSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            written: 0,
        }
    }

    /// Where `report` lands on disk.
    pub fn path_for(&self, report: &Report) -> PathBuf {
        self.output_dir
            .join(report.inspector.as_str())
            .join(report.filing_year().to_string())
            .join(path_safe(&report.report_id))
            .join("report.json")
    }
}

/// Report ids become directory names; keep them to a single path component.
fn path_safe(report_id: &str) -> String {
    // `.` and `..` would address the year or inspector directory itself.
    if report_id.chars().all(|c| c == '.') {
        return "_".to_string();
    }
    report_id
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' => '_',
            c => c,
        })
        .collect()
}

impl ReportSink for JsonSink {
    #[instrument(level = "debug", skip_all, fields(report_id = %report.report_id))]
    async fn save(&mut self, report: &Report) -> Result<()> {
        report.validate()?;
        let json = serde_json::to_string_pretty(report)?;
        let path = self.path_for(report);

        if let Some(dir) = path.parent() {
            if let Err(e) = fs::create_dir_all(dir).await {
                error!(dir = %dir.display(), error = %e, "Failed to create report dir");
                return Err(e.into());
            }
        }
        fs::write(&path, json).await?;
        self.written += 1;
        debug!(path = %path.display(), "Wrote report");
        Ok(())
    }
}
