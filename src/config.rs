//! Scraper configuration.
//!
//! Every value has a built-in default matching the live sites, so a config
//! file is optional. When one is given (`--config path.yaml`) any subset of
//! keys may be set; missing keys keep their defaults.
//!
//! ```yaml
//! http:
//!   timeout_secs: 60
//! dhs:
//!   components:
//!     - { name: tsa, id: 22, item_id: 46 }
//! nasa:
//!   archive_year: 2010
//! ```
//!
//! The configuration is plain immutable data: it is loaded once in `main` and
//! passed by reference into each scraper.

use crate::error::{Result, ScrapeError};
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, instrument};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub http: HttpConfig,
    pub dhs: DhsConfig,
    pub nasa: NasaConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("ig_reports/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: 30,
        }
    }
}

/// A DHS organizational component and the two query-string ids of its
/// listing page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ComponentConfig {
    pub name: String,
    pub id: u32,
    pub item_id: u32,
    #[serde(default)]
    pub agency_name: Option<String>,
}

impl ComponentConfig {
    fn new(name: &str, id: u32, item_id: u32, agency_name: &str) -> Self {
        Self {
            name: name.to_string(),
            id,
            item_id,
            agency_name: Some(agency_name.to_string()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DhsConfig {
    /// Listing URL with `{id}` and `{item_id}` placeholders.
    pub listing_url_template: String,
    pub inspector_url: String,
    /// Components whose name starts with this prefix are filed under the
    /// umbrella tag `dhs` instead of their own name.
    pub umbrella_prefix: String,
    /// Processed in this order.
    pub components: Vec<ComponentConfig>,
}

impl DhsConfig {
    pub fn listing_url(&self, component: &ComponentConfig) -> String {
        self.listing_url_template
            .replace("{id}", &component.id.to_string())
            .replace("{item_id}", &component.item_id.to_string())
    }

    pub fn component(&self, name: &str) -> Result<&ComponentConfig> {
        self.components
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| ScrapeError::UnknownComponent(name.to_string()))
    }
}

impl Default for DhsConfig {
    fn default() -> Self {
        Self {
            listing_url_template:
                "http://www.oig.dhs.gov/index.php?option=com_content&view=article&id={id}&Itemid={item_id}"
                    .to_string(),
            inspector_url: "https://www.oig.dhs.gov".to_string(),
            umbrella_prefix: "dhs_".to_string(),
            components: vec![
                ComponentConfig::new("secret_service", 58, 49, "United States Secret Service"),
                ComponentConfig::new("coast_guard", 19, 48, "United States Coast Guard"),
                ComponentConfig::new("uscis", 20, 47, "U.S. Citizenship and Immigration Services"),
                ComponentConfig::new("tsa", 22, 46, "Transportation Security Administration"),
                ComponentConfig::new("ice", 24, 44, "U.S. Immigration and Customs Enforcement"),
                ComponentConfig::new("fema", 25, 38, "Federal Emergency Management Agency"),
                ComponentConfig::new("cbp", 26, 37, "U.S. Customs and Border Protection"),
                ComponentConfig::new("dhs_other", 59, 50, "Department of Homeland Security"),
                ComponentConfig::new("dhs_mgmt", 23, 45, "Department of Homeland Security"),
                // Council of the Inspectors General on Integrity and Efficiency
                ComponentConfig::new("dhs_cigie", 168, 150, "Department of Homeland Security"),
            ],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NasaConfig {
    /// Per-year audit table URL with a `{yy}` placeholder (two-digit year).
    pub audits_url_template: String,
    pub other_reports_url: String,
    pub inspector_url: String,
    /// Earliest year with published reports (none exist for 1996-1997).
    pub archive_year: i32,
}

impl NasaConfig {
    pub fn audits_url(&self, year: i32) -> String {
        self.audits_url_template
            .replace("{yy}", &format!("{:02}", year.rem_euclid(100)))
    }
}

impl Default for NasaConfig {
    fn default() -> Self {
        Self {
            audits_url_template: "https://oig.nasa.gov/audits/reports/FY{yy}/tableData.html"
                .to_string(),
            other_reports_url: "https://oig.nasa.gov/investigations/reports.html".to_string(),
            inspector_url: "https://oig.nasa.gov".to_string(),
            archive_year: 1998,
        }
    }
}

/// Parse a YAML config document.
pub fn parse_config(yaml: &str) -> Result<Config> {
    Ok(serde_yaml::from_str(yaml)?)
}

/// Load the config file at `path`, or the built-in defaults when `None`.
#[instrument(level = "info")]
pub async fn load_config(path: Option<&str>) -> Result<Config> {
    match path {
        Some(path) => {
            let yaml = tokio::fs::read_to_string(path).await?;
            let config = parse_config(&yaml)?;
            info!(path, components = config.dhs.components.len(), "Loaded configuration");
            Ok(config)
        }
        None => {
            info!("Using built-in configuration");
            Ok(Config::default())
        }
    }
}
