//! Category extraction from the `categories` column.

use std::collections::BTreeSet;

use log::debug;

use crate::config::EmptyCategoryPolicy;
use crate::error::Result;
use crate::rows::Row;

pub const CATEGORIES_COLUMN: &str = "categories";
pub const CATEGORY_DELIMITER: &str = "//";

/// Splits a raw category cell on `//`. Names are not trimmed.
pub fn split_categories(raw: &str, policy: EmptyCategoryPolicy) -> Vec<&str> {
    raw.split(CATEGORY_DELIMITER)
        .filter(|name| policy == EmptyCategoryPolicy::Keep || !name.is_empty())
        .collect()
}

/// Collects every distinct category name referenced by `rows`.
pub fn extract_categories(rows: &[Row], policy: EmptyCategoryPolicy) -> Result<BTreeSet<String>> {
    let mut categories = BTreeSet::new();
    for row in rows {
        let raw = row.require(CATEGORIES_COLUMN)?;
        categories.extend(split_categories(raw, policy).into_iter().map(str::to_string));
    }
    debug!("Extracted {} distinct categories", categories.len());
    Ok(categories)
}
