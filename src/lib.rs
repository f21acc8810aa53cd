//! Catalog Importer - product CSV to Klaviyo catalog sync
//!
//! Reads a product CSV export and upserts its categories, items and item
//! variants into the Klaviyo catalog.

pub mod catalog;
pub mod categories;
pub mod config;
pub mod error;
pub mod importer;
pub mod payload;
pub mod rows;
pub mod upsert;

#[cfg(test)]
pub(crate) mod test_support;

pub use catalog::{Catalog, CatalogResource, DryRunCatalog, KlaviyoCatalog};
pub use config::{
    CatalogKeys, ClientConfig, EmptyCategoryPolicy, GroupingMode, ImportSettings, ImporterConfig,
};
pub use error::{CatalogError, ImportError, Result};
pub use importer::{CatalogImporter, EntityCounts, ImportSummary};
pub use rows::{load_rows, Row};
