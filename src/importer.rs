//! Import orchestration: categories first, then parent items, then variants.
//!
//! The run is strictly sequential and stops at the first error that is not
//! a conflict. Nothing is rolled back; rerunning the same file is safe
//! because every write is an upsert.

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::path::Path;

use log::{debug, info};

use crate::catalog::{Catalog, CatalogResource};
use crate::categories::extract_categories;
use crate::config::{GroupingMode, ImportSettings};
use crate::error::{ImportError, Result};
use crate::payload::{
    build_category_payload, build_item_payload, build_variant_payload, item_label, variant_label,
    RequestBody,
};
use crate::rows::{load_rows, Row};
use crate::upsert::{upsert, UpsertOutcome};

/// Outcome counts for one entity kind.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EntityCounts {
    pub created: usize,
    pub already_existing: usize,
    pub updated: usize,
}

impl EntityCounts {
    pub fn record(&mut self, outcome: UpsertOutcome) {
        match outcome {
            UpsertOutcome::Created => self.created += 1,
            UpsertOutcome::AlreadyExists => self.already_existing += 1,
            UpsertOutcome::Updated => self.updated += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.created + self.already_existing + self.updated
    }
}

impl fmt::Display for EntityCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} created, {} already existing, {} updated",
            self.created, self.already_existing, self.updated
        )
    }
}

/// Per-entity results of a completed run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub categories: EntityCounts,
    pub items: EntityCounts,
    pub variants: EntityCounts,
}

/// Syncs CSV rows into a [`Catalog`].
pub struct CatalogImporter<C> {
    catalog: C,
    settings: ImportSettings,
}

impl<C: Catalog> CatalogImporter<C> {
    pub fn new(catalog: C, settings: ImportSettings) -> Self {
        debug!("Creating catalog importer with {settings:?}");
        Self { catalog, settings }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Loads `path` and imports it. File errors abort before any request.
    pub async fn run_file<P: AsRef<Path>>(&self, path: P) -> Result<ImportSummary> {
        let rows = load_rows(path)?;
        self.run(&rows).await
    }

    /// Imports all categories, one item per identity key, and every row as
    /// a variant.
    pub async fn run(&self, rows: &[Row]) -> Result<ImportSummary> {
        info!("Importing {} rows", rows.len());
        let mut summary = ImportSummary::default();

        let categories = extract_categories(rows, self.settings.empty_categories)?;
        self.import_categories(&categories, &mut summary).await?;

        let items = group_items(rows, self.settings.grouping)?;
        info!("Importing {} items", items.len());
        for row in items {
            summary.items.record(self.import_item(row).await?);
        }

        info!("Importing {} variants", rows.len());
        for row in rows {
            summary.variants.record(self.import_variant(row).await?);
        }

        info!("Categories: {}", summary.categories);
        info!("Items: {}", summary.items);
        info!("Variants: {}", summary.variants);
        Ok(summary)
    }

    async fn import_categories(
        &self,
        categories: &BTreeSet<String>,
        summary: &mut ImportSummary,
    ) -> Result<()> {
        info!("Importing {} categories", categories.len());
        for name in categories {
            summary.categories.record(self.import_category(name).await?);
        }
        Ok(())
    }

    /// Creates one category. Categories have no update path.
    pub async fn import_category(&self, name: &str) -> Result<UpsertOutcome> {
        let body = build_category_payload(name, &self.settings.keys)?;
        self.upsert(CatalogResource::Category, &body, name, None)
            .await
    }

    /// Creates or updates the parent item described by `row`.
    pub async fn import_item(&self, row: &Row) -> Result<UpsertOutcome> {
        let keys = &self.settings.keys;
        let body = build_item_payload(row, keys, self.settings.empty_categories)?;
        let label = item_label(row)?;
        let id = keys.composite_id(row.require("external_id")?);
        self.upsert(CatalogResource::Item, &body, &label, Some(&id))
            .await
    }

    /// Creates or updates the variant described by `row`.
    pub async fn import_variant(&self, row: &Row) -> Result<UpsertOutcome> {
        let keys = &self.settings.keys;
        let body = build_variant_payload(row, keys)?;
        let label = variant_label(row)?;
        let id = keys.composite_id(row.require("variant.sku")?);
        self.upsert(CatalogResource::Variant, &body, &label, Some(&id))
            .await
    }

    async fn upsert(
        &self,
        resource: CatalogResource,
        body: &RequestBody,
        label: &str,
        update_id: Option<&str>,
    ) -> Result<UpsertOutcome> {
        upsert(&self.catalog, resource, body, label, update_id)
            .await
            .map_err(|source| ImportError::Catalog {
                label: label.to_string(),
                source,
            })
    }
}

/// Picks the row that represents each parent item: the first row of every
/// group of equal `external_id`s, in first-seen order.
pub fn group_items(rows: &[Row], mode: GroupingMode) -> Result<Vec<&Row>> {
    let mut representatives = Vec::new();
    match mode {
        GroupingMode::ByKey => {
            let mut seen = HashSet::new();
            for row in rows {
                if seen.insert(row.require("external_id")?) {
                    representatives.push(row);
                }
            }
        }
        GroupingMode::Adjacent => {
            let mut previous = None;
            for row in rows {
                let key = row.require("external_id")?;
                if previous != Some(key) {
                    representatives.push(row);
                }
                previous = Some(key);
            }
        }
    }
    debug!(
        "Grouped {} rows into {} items ({mode:?})",
        rows.len(),
        representatives.len()
    );
    Ok(representatives)
}

#[cfg(test)]
#[path = "importer_tests.rs"]
mod tests;
