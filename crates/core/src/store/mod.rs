//! Catalog store - the local mirror of the scraped shop.
//!
//! Every read path consults the store first; crawl components write back
//! through it. Categories are keyed by canonical URL, collections by title,
//! and products carry a soft per-category dedup key.

mod sqlite;
mod types;

pub use sqlite::SqliteStore;
pub use types::*;

use crate::slug::CategoryMatch;

/// Trait for catalog persistence.
pub trait CatalogStore: Send + Sync {
    /// Insert or update a category by canonical URL.
    ///
    /// An existing row keeps its id and pagination offset; title and parent
    /// are refreshed. A `None` parent never clears an existing parent link.
    fn upsert_category(
        &self,
        title: &str,
        url: &str,
        parent_id: Option<i64>,
    ) -> Result<Category, StoreError>;

    /// Find the first category whose URL satisfies the lookup clause.
    fn find_category(&self, clause: &CategoryMatch) -> Result<Option<Category>, StoreError>;

    /// All root categories (no parent) with their children attached.
    fn root_tree(&self) -> Result<Vec<Category>, StoreError>;

    /// Number of products stored for a category.
    fn count_products(&self, category_id: i64) -> Result<u32, StoreError>;

    /// All products stored for a category, in insertion order.
    fn products_by_category(&self, category_id: i64) -> Result<Vec<Product>, StoreError>;

    /// Append one crawled page atomically: insert the products (skipping
    /// dedup-key conflicts) and raise the category's pagination offset to
    /// `new_last_page`, all in a single transaction. The offset never
    /// decreases. Returns the number of products actually inserted.
    fn append_page(
        &self,
        category_id: i64,
        products: &[NewProduct],
        new_last_page: u32,
    ) -> Result<u32, StoreError>;

    /// Insert or fetch a collection by title and attach the given products.
    fn insert_collection(
        &self,
        title: &str,
        products: &[NewProduct],
    ) -> Result<Collection, StoreError>;

    /// All collections with their products.
    fn collections_with_products(&self) -> Result<Vec<(Collection, Vec<Product>)>, StoreError>;

    /// Whether any collection has at least one product.
    fn has_collection_products(&self) -> Result<bool, StoreError>;

    /// First product whose title contains `query` (case-insensitive).
    fn find_product_by_title(&self, query: &str) -> Result<Option<Product>, StoreError>;

    /// Create a standalone product (no category or collection).
    fn create_product(&self, product: &NewProduct) -> Result<Product, StoreError>;

    /// Apply an enrichment payload to a product in one transaction.
    fn save_details(&self, product_id: i64, update: &DetailUpdate) -> Result<(), StoreError>;

    /// Load a product together with its specifications, recommendations and
    /// reviews.
    fn product_details(&self, product_id: i64) -> Result<ProductDetails, StoreError>;

    /// Products for the given ids, input order preserved, unknown ids
    /// silently skipped.
    fn products_by_ids(&self, ids: &[i64]) -> Result<Vec<Product>, StoreError>;
}
