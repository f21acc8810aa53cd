//! Run configuration, built once at startup and handed to each component.

use std::time::Duration;

/// The API rejects catalog writes unless these are set exactly like this.
pub const INTEGRATION_TYPE: &str = "$custom";
pub const CATALOG_TYPE: &str = "$default";

pub const DEFAULT_BASE_URL: &str = "https://a.klaviyo.com/api";
pub const DEFAULT_REVISION: &str = "2024-10-15";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Integration/catalog type pair that scopes every catalog identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogKeys {
    pub integration_type: String,
    pub catalog_type: String,
}

impl Default for CatalogKeys {
    fn default() -> Self {
        Self {
            integration_type: INTEGRATION_TYPE.to_string(),
            catalog_type: CATALOG_TYPE.to_string(),
        }
    }
}

impl CatalogKeys {
    /// Builds the `integration:::catalog:::natural_id` key used in
    /// relationships and update URLs.
    pub fn composite_id(&self, natural_id: &str) -> String {
        format!(
            "{}:::{}:::{}",
            self.integration_type, self.catalog_type, natural_id
        )
    }
}

/// What to do with empty names produced by splitting the category column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EmptyCategoryPolicy {
    /// Use them as-is (an empty `categories` cell yields one "" category)
    #[default]
    Keep,
    /// Drop them
    Skip,
}

/// How rows are grouped into parent items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum GroupingMode {
    /// One group per distinct external_id anywhere in the file
    #[default]
    ByKey,
    /// One group per consecutive run of equal external_ids
    Adjacent,
}

/// Settings that shape payloads and the import order.
#[derive(Debug, Clone, Default)]
pub struct ImportSettings {
    pub keys: CatalogKeys,
    pub empty_categories: EmptyCategoryPolicy,
    pub grouping: GroupingMode,
}

/// Settings for the HTTP catalog client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_key: String,
    pub base_url: String,
    pub revision: String,
    /// Extra attempts after the first one for retryable failures
    pub max_retries: u32,
    /// Upper bound for a single backoff wait
    pub max_delay: Duration,
    /// Per-request timeout, covering connect through reading the response
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            revision: DEFAULT_REVISION.to_string(),
            max_retries: 3,
            max_delay: Duration::from_secs(60),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Everything a run needs.
#[derive(Debug, Clone)]
pub struct ImporterConfig {
    pub input_file: std::path::PathBuf,
    pub settings: ImportSettings,
    /// `None` for dry runs
    pub client: Option<ClientConfig>,
}
