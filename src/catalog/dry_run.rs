//! Dry-run catalog that validates and logs requests without sending them.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use log::{debug, info};

use crate::error::CatalogError;
use crate::payload::RequestBody;

use super::{Catalog, CatalogResource};

/// Accepts every create, so each entity is reported as created.
#[derive(Debug, Default)]
pub struct DryRunCatalog {
    requests: AtomicUsize,
}

impl DryRunCatalog {
    pub fn new() -> Self {
        info!("Dry run: no requests will be sent to the catalog");
        Self::default()
    }

    /// Number of requests that would have been sent so far.
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::Relaxed)
    }

    fn record(
        &self,
        action: &str,
        resource: CatalogResource,
        body: &RequestBody,
    ) -> Result<(), CatalogError> {
        // Serializing here surfaces payload problems a live run would hit.
        let payload = serde_json::to_string_pretty(body)?;
        self.requests.fetch_add(1, Ordering::Relaxed);
        debug!("Would {action} {resource}: {payload}");
        Ok(())
    }
}

#[async_trait]
impl Catalog for DryRunCatalog {
    async fn create(
        &self,
        resource: CatalogResource,
        body: &RequestBody,
    ) -> Result<(), CatalogError> {
        self.record("create", resource, body)
    }

    async fn update(
        &self,
        resource: CatalogResource,
        id: &str,
        body: &RequestBody,
    ) -> Result<(), CatalogError> {
        self.record(&format!("update {id} as"), resource, body)
    }
}
