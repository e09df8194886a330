//! SQLite-backed catalog store implementation.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::{
    Category, CatalogStore, Collection, DetailUpdate, NewProduct, Product, ProductDetails,
    Recommendation, StoreError,
};
use crate::slug::CategoryMatch;
use crate::store::types::dedup_key;

/// SQLite-backed catalog store.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Create a new SQLite store, creating the database file and tables if needed.
    pub fn new(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|e| StoreError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite store (useful for testing).
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn =
            Connection::open_in_memory().map_err(|e| StoreError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            r#"
            -- Category tree; url is the identity key
            CREATE TABLE IF NOT EXISTS categories (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                url TEXT NOT NULL UNIQUE,
                parent_id INTEGER REFERENCES categories(id),
                last_page INTEGER NOT NULL DEFAULT 0
            );

            CREATE INDEX IF NOT EXISTS idx_categories_parent ON categories(parent_id);

            -- Bestseller shelves and other curated groupings
            CREATE TABLE IF NOT EXISTS collections (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL UNIQUE
            );

            -- Products; dedup_title/dedup_price hold the normalized soft key
            CREATE TABLE IF NOT EXISTS products (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                author TEXT NOT NULL DEFAULT 'Unknown',
                price TEXT NOT NULL DEFAULT '',
                image_url TEXT,
                tag TEXT,
                category_id INTEGER REFERENCES categories(id),
                collection_id INTEGER REFERENCES collections(id),
                summary TEXT,
                condition_label TEXT,
                first_seen_at TEXT NOT NULL,
                dedup_title TEXT NOT NULL,
                dedup_price TEXT NOT NULL
            );

            CREATE UNIQUE INDEX IF NOT EXISTS idx_products_dedup
                ON products(category_id, dedup_title, dedup_price);
            CREATE INDEX IF NOT EXISTS idx_products_category ON products(category_id);
            CREATE INDEX IF NOT EXISTS idx_products_collection ON products(collection_id);
            CREATE INDEX IF NOT EXISTS idx_products_title ON products(title);

            CREATE TABLE IF NOT EXISTS product_specs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                product_id INTEGER NOT NULL REFERENCES products(id) ON DELETE CASCADE,
                key TEXT NOT NULL,
                value TEXT NOT NULL,
                UNIQUE(product_id, key)
            );

            CREATE TABLE IF NOT EXISTS product_recommendations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                product_id INTEGER NOT NULL REFERENCES products(id) ON DELETE CASCADE,
                title TEXT NOT NULL,
                price TEXT NOT NULL,
                image_url TEXT
            );

            CREATE TABLE IF NOT EXISTS product_reviews (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                product_id INTEGER NOT NULL REFERENCES products(id) ON DELETE CASCADE,
                body TEXT NOT NULL
            );
            "#,
        )
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    fn row_to_category(row: &rusqlite::Row) -> rusqlite::Result<Category> {
        Ok(Category {
            id: row.get(0)?,
            title: row.get(1)?,
            url: row.get(2)?,
            parent_id: row.get(3)?,
            last_page: row.get(4)?,
            children: Vec::new(),
        })
    }

    fn row_to_product(row: &rusqlite::Row) -> rusqlite::Result<Product> {
        let first_seen_str: String = row.get(10)?;
        let first_seen_at = DateTime::parse_from_rfc3339(&first_seen_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());

        Ok(Product {
            id: row.get(0)?,
            title: row.get(1)?,
            author: row.get(2)?,
            price: row.get(3)?,
            image_url: row.get(4)?,
            tag: row.get(5)?,
            category_id: row.get(6)?,
            collection_id: row.get(7)?,
            summary: row.get(8)?,
            condition: row.get(9)?,
            first_seen_at,
        })
    }

    fn insert_product_row(
        conn: &Connection,
        product: &NewProduct,
        category_id: Option<i64>,
        collection_id: Option<i64>,
    ) -> Result<usize, StoreError> {
        let (dedup_title, dedup_price) = dedup_key(&product.title, &product.price);
        conn.execute(
            "INSERT INTO products
                (title, author, price, image_url, tag, category_id, collection_id,
                 first_seen_at, dedup_title, dedup_price)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(category_id, dedup_title, dedup_price) DO NOTHING",
            params![
                &product.title,
                &product.author,
                &product.price,
                &product.image_url,
                &product.tag,
                category_id,
                collection_id,
                &Utc::now().to_rfc3339(),
                &dedup_title,
                &dedup_price,
            ],
        )
        .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn products_where(
        conn: &Connection,
        filter: &str,
        id: i64,
    ) -> Result<Vec<Product>, StoreError> {
        let mut stmt = conn
            .prepare(&format!(
                "SELECT id, title, author, price, image_url, tag, category_id, collection_id,
                        summary, condition_label, first_seen_at
                 FROM products WHERE {filter} = ? ORDER BY id"
            ))
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params![id], Self::row_to_product)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let mut products = Vec::new();
        for row in rows {
            products.push(row.map_err(|e| StoreError::Database(e.to_string()))?);
        }
        Ok(products)
    }
}

impl CatalogStore for SqliteStore {
    fn upsert_category(
        &self,
        title: &str,
        url: &str,
        parent_id: Option<i64>,
    ) -> Result<Category, StoreError> {
        let conn = self.conn.lock().unwrap();

        // Upsert keeps id and last_page; a None parent never clears one.
        conn.execute(
            "INSERT INTO categories (title, url, parent_id) VALUES (?, ?, ?)
             ON CONFLICT(url) DO UPDATE SET
                title = excluded.title,
                parent_id = COALESCE(excluded.parent_id, parent_id)",
            params![title, url, parent_id],
        )
        .map_err(|e| StoreError::Database(e.to_string()))?;

        conn.query_row(
            "SELECT id, title, url, parent_id, last_page FROM categories WHERE url = ?",
            params![url],
            Self::row_to_category,
        )
        .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn find_category(&self, clause: &CategoryMatch) -> Result<Option<Category>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let fragment = format!("%{}%", clause.fragment);
        let exclude = clause.exclude.as_ref().map(|e| format!("%{e}%"));

        conn.query_row(
            "SELECT id, title, url, parent_id, last_page FROM categories
             WHERE url LIKE ?1 AND (?2 IS NULL OR url NOT LIKE ?2)
             ORDER BY id LIMIT 1",
            params![&fragment, &exclude],
            Self::row_to_category,
        )
        .optional()
        .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn root_tree(&self) -> Result<Vec<Category>, StoreError> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn
            .prepare(
                "SELECT id, title, url, parent_id, last_page FROM categories
                 WHERE parent_id IS NULL ORDER BY id",
            )
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let rows = stmt
            .query_map([], Self::row_to_category)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let mut roots = Vec::new();
        for row in rows {
            roots.push(row.map_err(|e| StoreError::Database(e.to_string()))?);
        }

        let mut child_stmt = conn
            .prepare(
                "SELECT id, title, url, parent_id, last_page FROM categories
                 WHERE parent_id = ? ORDER BY id",
            )
            .map_err(|e| StoreError::Database(e.to_string()))?;

        for root in &mut roots {
            let rows = child_stmt
                .query_map(params![root.id], Self::row_to_category)
                .map_err(|e| StoreError::Database(e.to_string()))?;
            for row in rows {
                root.children
                    .push(row.map_err(|e| StoreError::Database(e.to_string()))?);
            }
        }

        Ok(roots)
    }

    fn count_products(&self, category_id: i64) -> Result<u32, StoreError> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT COUNT(*) FROM products WHERE category_id = ?",
            params![category_id],
            |row| row.get(0),
        )
        .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn products_by_category(&self, category_id: i64) -> Result<Vec<Product>, StoreError> {
        let conn = self.conn.lock().unwrap();
        Self::products_where(&conn, "category_id", category_id)
    }

    fn append_page(
        &self,
        category_id: i64,
        products: &[NewProduct],
        new_last_page: u32,
    ) -> Result<u32, StoreError> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn
            .transaction()
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let mut inserted = 0u32;
        for product in products {
            inserted += Self::insert_product_row(&tx, product, Some(category_id), None)? as u32;
        }

        // MAX keeps the offset monotonically non-decreasing.
        let updated = tx
            .execute(
                "UPDATE categories SET last_page = MAX(last_page, ?1) WHERE id = ?2",
                params![new_last_page, category_id],
            )
            .map_err(|e| StoreError::Database(e.to_string()))?;
        if updated == 0 {
            return Err(StoreError::NotFound(format!("category {category_id}")));
        }

        tx.commit().map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(inserted)
    }

    fn insert_collection(
        &self,
        title: &str,
        products: &[NewProduct],
    ) -> Result<Collection, StoreError> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn
            .transaction()
            .map_err(|e| StoreError::Database(e.to_string()))?;

        tx.execute(
            "INSERT INTO collections (title) VALUES (?) ON CONFLICT(title) DO NOTHING",
            params![title],
        )
        .map_err(|e| StoreError::Database(e.to_string()))?;

        let id: i64 = tx
            .query_row(
                "SELECT id FROM collections WHERE title = ?",
                params![title],
                |row| row.get(0),
            )
            .map_err(|e| StoreError::Database(e.to_string()))?;

        for product in products {
            Self::insert_product_row(&tx, product, None, Some(id))?;
        }

        tx.commit().map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(Collection {
            id,
            title: title.to_string(),
        })
    }

    fn collections_with_products(&self) -> Result<Vec<(Collection, Vec<Product>)>, StoreError> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn
            .prepare("SELECT id, title FROM collections ORDER BY id")
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| {
                Ok(Collection {
                    id: row.get(0)?,
                    title: row.get(1)?,
                })
            })
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let mut collections = Vec::new();
        for row in rows {
            let collection = row.map_err(|e| StoreError::Database(e.to_string()))?;
            let products = Self::products_where(&conn, "collection_id", collection.id)?;
            collections.push((collection, products));
        }
        Ok(collections)
    }

    fn has_collection_products(&self) -> Result<bool, StoreError> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM products WHERE collection_id IS NOT NULL",
                [],
                |row| row.get(0),
            )
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(count > 0)
    }

    fn find_product_by_title(&self, query: &str) -> Result<Option<Product>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let pattern = format!("%{}%", query.to_lowercase());

        conn.query_row(
            "SELECT id, title, author, price, image_url, tag, category_id, collection_id,
                    summary, condition_label, first_seen_at
             FROM products WHERE LOWER(title) LIKE ? ORDER BY id LIMIT 1",
            params![&pattern],
            Self::row_to_product,
        )
        .optional()
        .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn create_product(&self, product: &NewProduct) -> Result<Product, StoreError> {
        let conn = self.conn.lock().unwrap();
        Self::insert_product_row(&conn, product, None, None)?;
        let id = conn.last_insert_rowid();
        conn.query_row(
            "SELECT id, title, author, price, image_url, tag, category_id, collection_id,
                    summary, condition_label, first_seen_at
             FROM products WHERE id = ?",
            params![id],
            Self::row_to_product,
        )
        .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn save_details(&self, product_id: i64, update: &DetailUpdate) -> Result<(), StoreError> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn
            .transaction()
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let updated = tx
            .execute(
                "UPDATE products SET summary = ?, condition_label = ? WHERE id = ?",
                params![&update.summary, &update.condition, product_id],
            )
            .map_err(|e| StoreError::Database(e.to_string()))?;
        if updated == 0 {
            return Err(StoreError::NotFound(format!("product {product_id}")));
        }

        for (key, value) in &update.specifications {
            tx.execute(
                "INSERT INTO product_specs (product_id, key, value) VALUES (?, ?, ?)
                 ON CONFLICT(product_id, key) DO UPDATE SET value = excluded.value",
                params![product_id, key, value],
            )
            .map_err(|e| StoreError::Database(e.to_string()))?;
        }

        // Recommendations and reviews are replaced wholesale on re-enrichment.
        tx.execute(
            "DELETE FROM product_recommendations WHERE product_id = ?",
            params![product_id],
        )
        .map_err(|e| StoreError::Database(e.to_string()))?;
        for rec in &update.recommendations {
            tx.execute(
                "INSERT INTO product_recommendations (product_id, title, price, image_url)
                 VALUES (?, ?, ?, ?)",
                params![product_id, &rec.title, &rec.price, &rec.image_url],
            )
            .map_err(|e| StoreError::Database(e.to_string()))?;
        }

        tx.execute(
            "DELETE FROM product_reviews WHERE product_id = ?",
            params![product_id],
        )
        .map_err(|e| StoreError::Database(e.to_string()))?;
        for review in &update.reviews {
            tx.execute(
                "INSERT INTO product_reviews (product_id, body) VALUES (?, ?)",
                params![product_id, review],
            )
            .map_err(|e| StoreError::Database(e.to_string()))?;
        }

        tx.commit().map_err(|e| StoreError::Database(e.to_string()))
    }

    fn product_details(&self, product_id: i64) -> Result<ProductDetails, StoreError> {
        let conn = self.conn.lock().unwrap();

        let product = conn
            .query_row(
                "SELECT id, title, author, price, image_url, tag, category_id, collection_id,
                        summary, condition_label, first_seen_at
                 FROM products WHERE id = ?",
                params![product_id],
                Self::row_to_product,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => {
                    StoreError::NotFound(format!("product {product_id}"))
                }
                _ => StoreError::Database(e.to_string()),
            })?;

        let mut specifications = std::collections::BTreeMap::new();
        let mut stmt = conn
            .prepare("SELECT key, value FROM product_specs WHERE product_id = ?")
            .map_err(|e| StoreError::Database(e.to_string()))?;
        let rows = stmt
            .query_map(params![product_id], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .map_err(|e| StoreError::Database(e.to_string()))?;
        for row in rows {
            let (key, value) = row.map_err(|e| StoreError::Database(e.to_string()))?;
            specifications.insert(key, value);
        }

        let mut recommendations = Vec::new();
        let mut stmt = conn
            .prepare(
                "SELECT title, price, image_url FROM product_recommendations
                 WHERE product_id = ? ORDER BY id",
            )
            .map_err(|e| StoreError::Database(e.to_string()))?;
        let rows = stmt
            .query_map(params![product_id], |row| {
                Ok(Recommendation {
                    title: row.get(0)?,
                    price: row.get(1)?,
                    image_url: row.get(2)?,
                })
            })
            .map_err(|e| StoreError::Database(e.to_string()))?;
        for row in rows {
            recommendations.push(row.map_err(|e| StoreError::Database(e.to_string()))?);
        }

        let mut reviews = Vec::new();
        let mut stmt = conn
            .prepare("SELECT body FROM product_reviews WHERE product_id = ? ORDER BY id")
            .map_err(|e| StoreError::Database(e.to_string()))?;
        let rows = stmt
            .query_map(params![product_id], |row| row.get::<_, String>(0))
            .map_err(|e| StoreError::Database(e.to_string()))?;
        for row in rows {
            reviews.push(row.map_err(|e| StoreError::Database(e.to_string()))?);
        }

        Ok(ProductDetails {
            product,
            specifications,
            recommendations,
            reviews,
        })
    }

    fn products_by_ids(&self, ids: &[i64]) -> Result<Vec<Product>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT id, title, author, price, image_url, tag, category_id, collection_id,
                        summary, condition_label, first_seen_at
                 FROM products WHERE id = ?",
            )
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let mut products = Vec::new();
        for id in ids {
            let product = stmt
                .query_row(params![id], Self::row_to_product)
                .optional()
                .map_err(|e| StoreError::Database(e.to_string()))?;
            if let Some(product) = product {
                products.push(product);
            }
        }
        Ok(products)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn create_test_store() -> SqliteStore {
        SqliteStore::in_memory().unwrap()
    }

    fn book(title: &str, price: &str) -> NewProduct {
        NewProduct {
            title: title.to_string(),
            author: "Unknown".to_string(),
            price: price.to_string(),
            image_url: None,
            tag: None,
        }
    }

    #[test]
    fn test_upsert_category_creates_and_updates() {
        let store = create_test_store();
        let url = "https://example.com/collections/fiction-books";

        let created = store.upsert_category("Fiction", url, None).unwrap();
        assert_eq!(created.title, "Fiction");
        assert_eq!(created.last_page, 0);

        let updated = store.upsert_category("Fiction Books", url, None).unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.title, "Fiction Books");
    }

    #[test]
    fn test_upsert_category_none_parent_keeps_existing() {
        let store = create_test_store();
        let parent = store
            .upsert_category("Fiction", "https://example.com/collections/fiction-books", None)
            .unwrap();
        let child_url = "https://example.com/collections/crime-mystery-books";

        store
            .upsert_category("Crime", child_url, Some(parent.id))
            .unwrap();
        let refreshed = store.upsert_category("Crime & Mystery", child_url, None).unwrap();

        assert_eq!(refreshed.parent_id, Some(parent.id));
        assert_eq!(refreshed.title, "Crime & Mystery");
    }

    #[test]
    fn test_find_category_respects_exclusion() {
        let store = create_test_store();
        store
            .upsert_category(
                "Non-Fiction",
                "https://example.com/collections/non-fiction-books",
                None,
            )
            .unwrap();
        store
            .upsert_category(
                "Fiction",
                "https://example.com/collections/fiction-books",
                None,
            )
            .unwrap();

        let clause = CategoryMatch::for_slug("fiction-books");
        let found = store.find_category(&clause).unwrap().unwrap();
        assert_eq!(found.title, "Fiction");

        let clause = CategoryMatch::for_slug("non-fiction-books");
        let found = store.find_category(&clause).unwrap().unwrap();
        assert_eq!(found.title, "Non-Fiction");
    }

    #[test]
    fn test_find_category_missing_is_none() {
        let store = create_test_store();
        let clause = CategoryMatch::for_slug("rare-books");
        assert!(store.find_category(&clause).unwrap().is_none());
    }

    #[test]
    fn test_root_tree_attaches_children() {
        let store = create_test_store();
        let root = store
            .upsert_category("Fiction", "https://example.com/collections/fiction-books", None)
            .unwrap();
        store
            .upsert_category(
                "Crime",
                "https://example.com/collections/crime-mystery-books",
                Some(root.id),
            )
            .unwrap();
        store
            .upsert_category(
                "Romance",
                "https://example.com/collections/romance-books",
                Some(root.id),
            )
            .unwrap();

        let tree = store.root_tree().unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].children.len(), 2);
        assert_eq!(tree[0].children[0].title, "Crime");
    }

    #[test]
    fn test_append_page_atomic_and_idempotent() {
        let store = create_test_store();
        let category = store
            .upsert_category("Fiction", "https://example.com/collections/fiction-books", None)
            .unwrap();

        let products = vec![book("The Hobbit", "£4.99"), book("Dune", "£5.50")];
        let inserted = store.append_page(category.id, &products, 2).unwrap();
        assert_eq!(inserted, 2);
        assert_eq!(store.count_products(category.id).unwrap(), 2);

        // Same page again: duplicate keys are skipped, offset does not move.
        let inserted = store.append_page(category.id, &products, 2).unwrap();
        assert_eq!(inserted, 0);
        assert_eq!(store.count_products(category.id).unwrap(), 2);
    }

    #[test]
    fn test_append_page_dedup_key_normalized() {
        let store = create_test_store();
        let category = store
            .upsert_category("Fiction", "https://example.com/collections/fiction-books", None)
            .unwrap();

        store
            .append_page(category.id, &[book("The Hobbit", "£4.99")], 1)
            .unwrap();
        let inserted = store
            .append_page(category.id, &[book("  THE HOBBIT ", "£4.99 ")], 2)
            .unwrap();
        assert_eq!(inserted, 0);
        assert_eq!(store.count_products(category.id).unwrap(), 1);
    }

    #[test]
    fn test_append_page_last_page_never_decreases() {
        let store = create_test_store();
        let category = store
            .upsert_category("Fiction", "https://example.com/collections/fiction-books", None)
            .unwrap();

        store.append_page(category.id, &[book("A", "£1")], 40).unwrap();
        store.append_page(category.id, &[book("B", "£2")], 10).unwrap();

        let clause = CategoryMatch::for_slug("fiction-books");
        let refreshed = store.find_category(&clause).unwrap().unwrap();
        assert_eq!(refreshed.last_page, 40);
    }

    #[test]
    fn test_append_page_unknown_category_fails() {
        let store = create_test_store();
        let result = store.append_page(42, &[book("A", "£1")], 1);
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_same_title_different_category_both_insert() {
        let store = create_test_store();
        let fiction = store
            .upsert_category("Fiction", "https://example.com/collections/fiction-books", None)
            .unwrap();
        let rare = store
            .upsert_category("Rare", "https://example.com/collections/rare-books", None)
            .unwrap();

        store
            .append_page(fiction.id, &[book("Dune", "£5.00")], 1)
            .unwrap();
        let inserted = store.append_page(rare.id, &[book("Dune", "£5.00")], 1).unwrap();
        assert_eq!(inserted, 1);
    }

    #[test]
    fn test_insert_collection_upserts_by_title() {
        let store = create_test_store();
        let first = store
            .insert_collection("Fiction Bestsellers", &[book("Dune", "£5.00")])
            .unwrap();
        let second = store
            .insert_collection("Fiction Bestsellers", &[book("The Hobbit", "£4.99")])
            .unwrap();
        assert_eq!(first.id, second.id);

        let collections = store.collections_with_products().unwrap();
        assert_eq!(collections.len(), 1);
        assert_eq!(collections[0].1.len(), 2);
    }

    #[test]
    fn test_has_collection_products() {
        let store = create_test_store();
        assert!(!store.has_collection_products().unwrap());

        store
            .insert_collection("Bestsellers", &[book("Dune", "£5.00")])
            .unwrap();
        assert!(store.has_collection_products().unwrap());
    }

    #[test]
    fn test_find_product_by_title_case_insensitive() {
        let store = create_test_store();
        store.create_product(&book("The Left Hand of Darkness", "£6.00")).unwrap();

        let found = store.find_product_by_title("left hand").unwrap();
        assert!(found.is_some());
        assert_eq!(found.unwrap().title, "The Left Hand of Darkness");

        assert!(store.find_product_by_title("right hand").unwrap().is_none());
    }

    #[test]
    fn test_save_and_load_details() {
        let store = create_test_store();
        let product = store.create_product(&book("Dune", "£5.00")).unwrap();

        let mut specifications = BTreeMap::new();
        specifications.insert("ISBN 13".to_string(), "9780450011849".to_string());
        specifications.insert("Binding Type".to_string(), "Paperback".to_string());

        let update = DetailUpdate {
            summary: "A desert planet saga.".to_string(),
            condition: "Pre-owned".to_string(),
            specifications,
            recommendations: vec![Recommendation {
                title: "Dune Messiah".to_string(),
                price: "£4.50".to_string(),
                image_url: None,
            }],
            reviews: vec!["A stone-cold classic, worn spine and all.".to_string()],
        };
        store.save_details(product.id, &update).unwrap();

        let details = store.product_details(product.id).unwrap();
        assert_eq!(details.product.summary.as_deref(), Some("A desert planet saga."));
        assert_eq!(details.product.condition.as_deref(), Some("Pre-owned"));
        assert_eq!(details.specifications["ISBN 13"], "9780450011849");
        assert_eq!(details.recommendations.len(), 1);
        assert_eq!(details.reviews.len(), 1);
    }

    #[test]
    fn test_save_details_unknown_product_fails() {
        let store = create_test_store();
        let result = store.save_details(99, &DetailUpdate::default());
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_save_details_twice_replaces_recommendations() {
        let store = create_test_store();
        let product = store.create_product(&book("Dune", "£5.00")).unwrap();

        let mut update = DetailUpdate {
            summary: "First pass.".to_string(),
            condition: "Pre-owned".to_string(),
            recommendations: vec![Recommendation {
                title: "Old".to_string(),
                price: "£1".to_string(),
                image_url: None,
            }],
            ..Default::default()
        };
        store.save_details(product.id, &update).unwrap();

        update.recommendations = vec![Recommendation {
            title: "New".to_string(),
            price: "£2".to_string(),
            image_url: None,
        }];
        store.save_details(product.id, &update).unwrap();

        let details = store.product_details(product.id).unwrap();
        assert_eq!(details.recommendations.len(), 1);
        assert_eq!(details.recommendations[0].title, "New");
    }

    #[test]
    fn test_products_by_ids_preserves_order_and_skips_missing() {
        let store = create_test_store();
        let a = store.create_product(&book("A", "£1")).unwrap();
        let b = store.create_product(&book("B", "£2")).unwrap();

        let products = store.products_by_ids(&[b.id, 99, a.id]).unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].title, "B");
        assert_eq!(products[1].title, "A");
    }
}
