//! Request bodies for the catalog API.
//!
//! Bodies follow the JSON:API envelope the catalog endpoints expect:
//! `{"data": {"type": ..., "attributes": {...}, "relationships": {...}}}`.
//! Builders are pure: the same row always yields the same body.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::categories::{split_categories, CATEGORIES_COLUMN};
use crate::config::{CatalogKeys, EmptyCategoryPolicy};
use crate::error::{ImportError, Result};
use crate::rows::Row;

pub const CATEGORY_TYPE: &str = "catalog-category";
pub const ITEM_TYPE: &str = "catalog-item";
pub const VARIANT_TYPE: &str = "catalog-variant";

const ITEM_METADATA_PREFIX: &str = "metadata.";
const VARIANT_METADATA_PREFIX: &str = "variant.metadata.";
const VARIANT_NAMESPACE: &str = "variant.";

/// Top-level request envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    pub data: Resource,
}

/// The `data` member of a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub attributes: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationships: Option<Map<String, Value>>,
}

/// Reference to another catalog resource inside `relationships`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRef {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
}

#[derive(Debug, Serialize)]
struct CategoryAttributes<'a> {
    external_id: &'a str,
    name: &'a str,
    integration_type: &'a str,
    catalog_type: &'a str,
}

#[derive(Debug, Serialize)]
struct ItemAttributes<'a> {
    external_id: &'a str,
    integration_type: &'a str,
    title: &'a str,
    catalog_type: &'a str,
    description: &'a str,
    price: f64,
    url: &'a str,
    image_full_url: &'a str,
    image_thumbnail_url: &'a str,
    images: Vec<String>,
    published: bool,
    custom_metadata: BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
struct VariantAttributes<'a> {
    external_id: &'a str,
    catalog_type: &'a str,
    integration_type: &'a str,
    title: &'a str,
    description: &'a str,
    sku: &'a str,
    inventory_policy: i64,
    inventory_quantity: i64,
    price: f64,
    url: &'a str,
    image_full_url: &'a str,
    image_thumbnail_url: &'a str,
    images: Vec<String>,
    published: bool,
    custom_metadata: BTreeMap<String, String>,
}

/// Body for creating a category named `name`.
pub fn build_category_payload(name: &str, keys: &CatalogKeys) -> Result<RequestBody> {
    let attributes = CategoryAttributes {
        external_id: name,
        name,
        integration_type: &keys.integration_type,
        catalog_type: &keys.catalog_type,
    };

    Ok(RequestBody {
        data: Resource {
            kind: CATEGORY_TYPE.to_string(),
            id: None,
            attributes: to_object(&attributes)?,
            relationships: Some(Map::new()),
        },
    })
}

/// Body for creating the parent item described by `row`.
pub fn build_item_payload(
    row: &Row,
    keys: &CatalogKeys,
    policy: EmptyCategoryPolicy,
) -> Result<RequestBody> {
    let external_id = row.require("external_id")?;
    let image_full_url = row.require("image_full_url")?;

    let attributes = ItemAttributes {
        external_id,
        integration_type: &keys.integration_type,
        title: row.require("title")?,
        catalog_type: &keys.catalog_type,
        description: row.require("description")?,
        price: parse_price(row, "price", row.require("price")?)?,
        url: row.require("product_url")?,
        image_full_url,
        image_thumbnail_url: image_full_url,
        images: Vec::new(),
        published: true,
        custom_metadata: item_metadata(row),
    };

    let categories: Vec<ResourceRef> =
        split_categories(row.require(CATEGORIES_COLUMN)?, policy)
            .into_iter()
            .map(|name| ResourceRef {
                kind: CATEGORY_TYPE.to_string(),
                id: keys.composite_id(name),
            })
            .collect();

    let mut relationships = Map::new();
    relationships.insert(
        "categories".to_string(),
        serde_json::json!({ "data": categories }),
    );

    Ok(RequestBody {
        data: Resource {
            kind: ITEM_TYPE.to_string(),
            id: None,
            attributes: to_object(&attributes)?,
            relationships: Some(relationships),
        },
    })
}

/// Body for creating the variant described by `row`, linked to its item.
///
/// Description, price, url and image fall back to the item columns when the
/// `variant.` column is absent or empty.
pub fn build_variant_payload(row: &Row, keys: &CatalogKeys) -> Result<RequestBody> {
    let item_id = row.require("external_id")?;
    let sku = row.require("variant.sku")?;
    let image_full_url = variant_or_item(row, "variant.image_full_url", "image_full_url")?;

    let (price_column, price_value) = match row.non_empty("variant.price") {
        Some(value) => ("variant.price", value),
        None => ("price", row.require("price")?),
    };

    let attributes = VariantAttributes {
        external_id: sku,
        catalog_type: &keys.catalog_type,
        integration_type: &keys.integration_type,
        title: row.require("variant.title")?,
        description: variant_or_item(row, "variant.description", "description")?,
        sku,
        inventory_policy: parse_count(row, "variant.inventory_policy", 1)?,
        inventory_quantity: parse_count(row, "variant.inventory_quantity", 0)?,
        price: parse_price(row, price_column, price_value)?,
        url: variant_or_item(row, "variant.product_url", "product_url")?,
        image_full_url,
        image_thumbnail_url: image_full_url,
        images: Vec::new(),
        published: true,
        custom_metadata: variant_metadata(row),
    };

    let item_ref = ResourceRef {
        kind: ITEM_TYPE.to_string(),
        id: keys.composite_id(item_id),
    };
    let mut relationships = Map::new();
    relationships.insert("item".to_string(), serde_json::json!({ "data": item_ref }));

    Ok(RequestBody {
        data: Resource {
            kind: VARIANT_TYPE.to_string(),
            id: None,
            attributes: to_object(&attributes)?,
            relationships: Some(relationships),
        },
    })
}

/// Console label for an item row.
pub fn item_label(row: &Row) -> Result<String> {
    Ok(format!("Product: {}", row.require("title")?))
}

/// Console label for a variant row.
pub fn variant_label(row: &Row) -> Result<String> {
    Ok(format!(
        "Product: {}, Variant: {}",
        row.require("title")?,
        row.require("variant.title")?
    ))
}

/// Item custom metadata: `metadata.*` columns outside the variant namespace.
pub fn item_metadata(row: &Row) -> BTreeMap<String, String> {
    row.columns()
        .filter(|(name, _)| {
            name.contains(ITEM_METADATA_PREFIX) && !name.contains(VARIANT_NAMESPACE)
        })
        .map(|(name, value)| (name.replace(ITEM_METADATA_PREFIX, ""), value.to_string()))
        .collect()
}

/// Variant custom metadata: `variant.metadata.*` columns only.
pub fn variant_metadata(row: &Row) -> BTreeMap<String, String> {
    row.columns()
        .filter(|(name, _)| name.contains(VARIANT_METADATA_PREFIX))
        .map(|(name, value)| (name.replace(VARIANT_METADATA_PREFIX, ""), value.to_string()))
        .collect()
}

fn variant_or_item<'a>(row: &'a Row, variant_column: &str, item_column: &str) -> Result<&'a str> {
    match row.non_empty(variant_column) {
        Some(value) => Ok(value),
        None => row.require(item_column),
    }
}

/// Finite decimal only; "inf" and "NaN" would serialize as null.
fn parse_price(row: &Row, column: &str, value: &str) -> Result<f64> {
    match value.trim().parse::<f64>() {
        Ok(price) if price.is_finite() => Ok(price),
        _ => Err(invalid_number(row, column, value)),
    }
}

/// Integer column where absent, empty and zero all mean `default`.
fn parse_count(row: &Row, column: &str, default: i64) -> Result<i64> {
    let Some(value) = row.non_empty(column) else {
        return Ok(default);
    };
    match value.trim().parse::<i64>() {
        Ok(0) => Ok(default),
        Ok(count) => Ok(count),
        Err(_) => Err(invalid_number(row, column, value)),
    }
}

fn invalid_number(row: &Row, column: &str, value: &str) -> ImportError {
    ImportError::InvalidNumber {
        column: column.to_string(),
        value: value.to_string(),
        line: row.line(),
    }
}

fn to_object<T: Serialize>(attributes: &T) -> Result<Map<String, Value>> {
    match serde_json::to_value(attributes)? {
        Value::Object(map) => Ok(map),
        other => Err(ImportError::Payload(<serde_json::Error as serde::ser::Error>::custom(
            format!("attributes serialized to {other}, expected an object"),
        ))),
    }
}

#[cfg(test)]
#[path = "payload_tests.rs"]
mod tests;
