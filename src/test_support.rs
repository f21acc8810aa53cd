//! In-memory catalog used by the unit tests.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::catalog::{Catalog, CatalogResource};
use crate::error::CatalogError;
use crate::payload::RequestBody;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Create(CatalogResource, RequestBody),
    Update(CatalogResource, String, RequestBody),
}

/// Remembers created identities and answers repeats with a conflict,
/// like the real API does.
#[derive(Debug, Default)]
pub struct FakeCatalog {
    existing: Mutex<HashSet<(CatalogResource, String)>>,
    failing: Mutex<HashSet<String>>,
    calls: Mutex<Vec<Call>>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks an external id as already present in the catalog.
    pub fn with_existing(self, resource: CatalogResource, external_id: &str) -> Self {
        self.existing
            .lock()
            .unwrap()
            .insert((resource, external_id.to_string()));
        self
    }

    /// Makes creates for this external id fail with HTTP 500.
    pub fn with_failure(self, external_id: &str) -> Self {
        self.failing.lock().unwrap().insert(external_id.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn creates(&self, resource: CatalogResource) -> Vec<RequestBody> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Create(r, body) if r == resource => Some(body),
                _ => None,
            })
            .collect()
    }

    pub fn updates(&self, resource: CatalogResource) -> Vec<(String, RequestBody)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Update(r, id, body) if r == resource => Some((id, body)),
                _ => None,
            })
            .collect()
    }
}

fn external_id(body: &RequestBody) -> String {
    body.data
        .attributes
        .get("external_id")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string()
}

#[async_trait]
impl Catalog for FakeCatalog {
    async fn create(
        &self,
        resource: CatalogResource,
        body: &RequestBody,
    ) -> Result<(), CatalogError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Create(resource, body.clone()));

        let id = external_id(body);
        if self.failing.lock().unwrap().contains(&id) {
            return Err(CatalogError::Status {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                body: "boom".to_string(),
            });
        }
        if !self.existing.lock().unwrap().insert((resource, id)) {
            return Err(CatalogError::Conflict {
                body: "already exists".to_string(),
            });
        }
        Ok(())
    }

    async fn update(
        &self,
        resource: CatalogResource,
        id: &str,
        body: &RequestBody,
    ) -> Result<(), CatalogError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Update(resource, id.to_string(), body.clone()));
        Ok(())
    }
}
