//! Types for the catalog store (mirrored categories, products, collections).

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A mirrored category. The canonical URL is the identity key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub title: String,
    /// Canonical URL; unique across all categories.
    pub url: String,
    /// Parent category id; `None` for roots.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
    /// Count of items already fetched for this category. Never decreases.
    pub last_page: u32,
    /// Child categories; only populated on tree queries.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Category>,
}

/// A mirrored product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub title: String,
    pub author: String,
    /// Free-text currency string as displayed by the source site.
    pub price: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Promotional tag, e.g. a discount pill on a bestseller card.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    /// When this product first entered the mirror.
    pub first_seen_at: DateTime<Utc>,
}

/// A product awaiting insertion; the store derives the dedup key from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub title: String,
    pub author: String,
    pub price: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

/// A named product grouping independent of the category tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection {
    pub id: i64,
    /// Unique display title, e.g. "Fiction Bestsellers".
    pub title: String,
}

/// A "customers also like" tile scraped from a product page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub title: String,
    pub price: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Fully enriched product record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductDetails {
    #[serde(flatten)]
    pub product: Product,
    /// Key/value specification mapping; the required keys are always present.
    pub specifications: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recommendations: Vec<Recommendation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reviews: Vec<String>,
}

/// Enrichment payload applied to a product in one write.
#[derive(Debug, Clone, Default)]
pub struct DetailUpdate {
    pub summary: String,
    pub condition: String,
    pub specifications: BTreeMap<String, String>,
    pub recommendations: Vec<Recommendation>,
    pub reviews: Vec<String>,
}

/// Soft dedup key for a product within one category:
/// (lowercased trimmed title, whitespace-stripped price).
pub fn dedup_key(title: &str, price: &str) -> (String, String) {
    (
        title.trim().to_lowercase(),
        price.chars().filter(|c| !c.is_whitespace()).collect(),
    )
}

/// Errors for store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Not found: {0}")]
    NotFound(String),
}
