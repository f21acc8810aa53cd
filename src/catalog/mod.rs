//! Catalog backends the importer writes to.
//!
//! [`KlaviyoCatalog`] talks to the Klaviyo Catalogs API over HTTP,
//! [`DryRunCatalog`] only logs what would have been sent.

mod dry_run;
mod http;

use std::fmt;

use async_trait::async_trait;

use crate::error::CatalogError;
use crate::payload::RequestBody;

pub use dry_run::DryRunCatalog;
pub use http::KlaviyoCatalog;

/// The catalog collections the importer writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogResource {
    Category,
    Item,
    Variant,
}

impl CatalogResource {
    /// Collection path below the API base URL.
    pub fn path(self) -> &'static str {
        match self {
            CatalogResource::Category => "catalog-categories",
            CatalogResource::Item => "catalog-items",
            CatalogResource::Variant => "catalog-variants",
        }
    }
}

impl fmt::Display for CatalogResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CatalogResource::Category => "category",
            CatalogResource::Item => "item",
            CatalogResource::Variant => "variant",
        };
        f.write_str(name)
    }
}

/// Remote catalog operations.
///
/// A create for an identity that already exists must fail with
/// [`CatalogError::Conflict`] so callers can fall back to an update.
#[async_trait]
pub trait Catalog {
    async fn create(
        &self,
        resource: CatalogResource,
        body: &RequestBody,
    ) -> Result<(), CatalogError>;

    async fn update(
        &self,
        resource: CatalogResource,
        id: &str,
        body: &RequestBody,
    ) -> Result<(), CatalogError>;
}

#[cfg(test)]
#[path = "tests/mod.rs"]
mod tests;
