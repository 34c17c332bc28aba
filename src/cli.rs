//! Command-line interface definitions for the report harvester.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Output and config locations can also come from environment variables.

use crate::models::Inspector;
use crate::scrapers::dhs::DhsOptions;
use crate::utils::year_range;
use clap::Parser;

/// Command-line arguments for the report harvester.
///
/// # Examples
///
/// ```sh
/// # Everything, last two years for year-paginated sources
/// ig_reports -o ./data
///
/// # Only the first 5 TSA reports, printed instead of written
/// ig_reports --inspector dhs --component tsa --limit 5 --dry-run
///
/// # NASA since 2010
/// ig_reports --inspector nasa --since 2010
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Only run these inspectors (repeatable; default: all)
    #[arg(short, long, value_enum)]
    pub inspector: Vec<Inspector>,

    /// DHS: only scrape this component (e.g. `tsa`, `dhs_mgmt`)
    #[arg(long)]
    pub component: Option<String>,

    /// DHS: maximum reports per component (0 = no limit)
    #[arg(long, default_value_t = 0)]
    pub limit: usize,

    /// Year-paginated sources: scrape from this year through the current one
    #[arg(long)]
    pub since: Option<i32>,

    /// Year-paginated sources: scrape only this year
    #[arg(long, conflicts_with = "since")]
    pub year: Option<i32>,

    /// Year-paginated sources: scrape the whole archive
    #[arg(long, conflicts_with_all = ["since", "year"])]
    pub archive: bool,

    /// Output directory for report JSON files
    #[arg(short, long, env = "IG_OUTPUT_DIR", default_value = "data")]
    pub output_dir: String,

    /// Optional path to a config.yaml file
    #[arg(short, long, env = "IG_CONFIG")]
    pub config: Option<String>,

    /// Log reports instead of writing them
    #[arg(long)]
    pub dry_run: bool,
}

impl Cli {
    /// Whether `inspector` was selected (no selection means all).
    pub fn runs(&self, inspector: Inspector) -> bool {
        self.inspector.is_empty() || self.inspector.contains(&inspector)
    }

    pub fn dhs_options(&self) -> DhsOptions {
        DhsOptions {
            component: self.component.clone(),
            limit: self.limit,
        }
    }

    /// Years to scrape for a source whose archive starts at `archive_year`.
    pub fn year_range(&self, archive_year: i32, this_year: i32) -> Vec<i32> {
        year_range(self.since, self.year, self.archive, archive_year, this_year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["ig_reports"]);

        assert!(cli.runs(Inspector::Dhs));
        assert!(cli.runs(Inspector::Nasa));
        assert_eq!(cli.limit, 0);
        assert!(!cli.dry_run);
        assert_eq!(cli.year_range(1998, 2016), vec![2015, 2016]);
    }

    #[test]
    fn test_cli_dhs_options() {
        let cli = Cli::parse_from([
            "ig_reports",
            "-i",
            "dhs",
            "--component",
            "tsa",
            "--limit",
            "2",
            "--output-dir",
            "/tmp/reports",
        ]);

        assert!(cli.runs(Inspector::Dhs));
        assert!(!cli.runs(Inspector::Nasa));
        assert_eq!(cli.output_dir, "/tmp/reports");

        let options = cli.dhs_options();
        assert_eq!(options.component.as_deref(), Some("tsa"));
        assert_eq!(options.limit, 2);
    }

    #[test]
    fn test_cli_year_options() {
        let cli = Cli::parse_from(["ig_reports", "--inspector", "nasa", "--since", "2013"]);
        assert_eq!(cli.year_range(1998, 2016), vec![2013, 2014, 2015, 2016]);

        let cli = Cli::parse_from(["ig_reports", "--archive"]);
        assert_eq!(cli.year_range(1998, 2016).first(), Some(&1998));
    }

    #[test]
    fn test_cli_rejects_conflicting_year_options() {
        assert!(Cli::try_parse_from(["ig_reports", "--since", "2013", "--year", "2014"]).is_err());
    }
}
