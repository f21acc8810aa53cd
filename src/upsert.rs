//! Create-or-update against the catalog, driven by conflict responses.

use log::{debug, warn};

use crate::catalog::{Catalog, CatalogResource};
use crate::error::CatalogError;
use crate::payload::RequestBody;

/// Attributes the update endpoints reject because they are fixed at creation.
const CREATE_ONLY_ATTRIBUTES: [&str; 4] =
    ["external_id", "catalog_type", "integration_type", "sku"];

/// What an upsert ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    /// Conflict with no update path
    AlreadyExists,
    Updated,
}

/// Reshapes a create body into an update body for the resource `id`.
///
/// Sets `data.id`, drops the create-only attributes and the whole
/// relationships block. Every other attribute is kept as-is.
pub fn to_update_body(body: &RequestBody, id: &str) -> RequestBody {
    let mut update = body.clone();
    update.data.id = Some(id.to_string());
    for attribute in CREATE_ONLY_ATTRIBUTES {
        update.data.attributes.remove(attribute);
    }
    update.data.relationships = None;
    update
}

/// Creates `body`; on conflict, updates `update_id` instead when one is given.
///
/// Prints one line per outcome. Errors other than a conflict are returned
/// unchanged.
pub async fn upsert<C>(
    catalog: &C,
    resource: CatalogResource,
    body: &RequestBody,
    label: &str,
    update_id: Option<&str>,
) -> Result<UpsertOutcome, CatalogError>
where
    C: Catalog + ?Sized,
{
    match catalog.create(resource, body).await {
        Ok(()) => {
            println!("{label} created");
            Ok(UpsertOutcome::Created)
        }
        Err(err) if err.is_conflict() => {
            println!("{label} already exists");
            let Some(id) = update_id else {
                debug!("No update path for {resource} '{label}'");
                return Ok(UpsertOutcome::AlreadyExists);
            };
            catalog
                .update(resource, id, &to_update_body(body, id))
                .await?;
            println!("{label} updated");
            Ok(UpsertOutcome::Updated)
        }
        Err(err) => {
            warn!("Creating {resource} '{label}' failed: {err}");
            Err(err)
        }
    }
}

#[cfg(test)]
#[path = "upsert_tests.rs"]
mod tests;
