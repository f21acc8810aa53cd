//! Catalog Importer - product CSV to Klaviyo catalog sync
//!
//! Configuration comes from flags or the environment (`INPUT_FILE`,
//! `KLAVIYO_PRIVATE_KEY`).

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use catalog_importer::config::{DEFAULT_BASE_URL, DEFAULT_REVISION, DEFAULT_TIMEOUT_SECS};
use catalog_importer::{
    CatalogImporter, ClientConfig, DryRunCatalog, EmptyCategoryPolicy, GroupingMode, ImportError,
    ImportSettings, ImportSummary, ImporterConfig, KlaviyoCatalog,
};
use clap::Parser;

/// Sync a product CSV export into the Klaviyo catalog
#[derive(Parser, Debug)]
#[command(name = "catalog_importer")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the product CSV export
    #[arg(short, long, env = "INPUT_FILE")]
    input_file: PathBuf,

    /// Klaviyo private API key
    #[arg(long, env = "KLAVIYO_PRIVATE_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Catalog API base URL
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// API revision header value
    #[arg(long, default_value = DEFAULT_REVISION)]
    revision: String,

    /// Retries for rate-limited or failed requests
    #[arg(long, default_value_t = 3)]
    max_retries: u32,

    /// Upper bound for a single retry wait, in seconds
    #[arg(long, default_value_t = 60)]
    max_delay_secs: u64,

    /// Per-request timeout, in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// How rows are grouped into parent items
    #[arg(long, value_enum, default_value_t = GroupingMode::ByKey)]
    grouping: GroupingMode,

    /// Ignore empty names in the categories column
    #[arg(long, default_value_t = false)]
    skip_empty_categories: bool,

    /// Log the requests instead of sending them; reported outcomes are simulated
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

impl Args {
    fn into_config(self) -> Result<ImporterConfig, ImportError> {
        let settings = ImportSettings {
            empty_categories: if self.skip_empty_categories {
                EmptyCategoryPolicy::Skip
            } else {
                EmptyCategoryPolicy::Keep
            },
            grouping: self.grouping,
            ..ImportSettings::default()
        };

        let client = if self.dry_run {
            None
        } else {
            let api_key = self
                .api_key
                .filter(|key| !key.is_empty())
                .ok_or(ImportError::MissingApiKey)?;
            Some(ClientConfig {
                api_key,
                base_url: self.base_url,
                revision: self.revision,
                max_retries: self.max_retries,
                max_delay: Duration::from_secs(self.max_delay_secs),
                timeout: Duration::from_secs(self.timeout_secs),
            })
        };

        Ok(ImporterConfig {
            input_file: self.input_file,
            settings,
            client,
        })
    }
}

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if let Err(e) = run(args).await {
        log::error!("Import failed: {e:#}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config = args.into_config()?;
    log::info!("Starting catalog import from {}", config.input_file.display());

    let summary = match config.client {
        Some(client) => {
            let catalog = KlaviyoCatalog::new(client)?;
            let importer = CatalogImporter::new(catalog, config.settings);
            import(&importer, &config.input_file).await?
        }
        None => {
            println!("Dry run: nothing is sent, outcomes below are simulated");
            let importer = CatalogImporter::new(DryRunCatalog::new(), config.settings);
            let summary = import(&importer, &config.input_file).await?;
            log::info!(
                "Dry run finished, {} requests not sent",
                importer.catalog().request_count()
            );
            summary
        }
    };

    log::info!(
        "Import completed: {} categories, {} items, {} variants",
        summary.categories.total(),
        summary.items.total(),
        summary.variants.total()
    );
    Ok(())
}

async fn import<C: catalog_importer::Catalog>(
    importer: &CatalogImporter<C>,
    input_file: &std::path::Path,
) -> anyhow::Result<ImportSummary> {
    importer
        .run_file(input_file)
        .await
        .with_context(|| format!("Failed to import {}", input_file.display()))
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
