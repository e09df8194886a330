//! Incremental category crawler.
//!
//! Serves a category's stored products when available, otherwise fetches
//! exactly one listing page, appends the new cards atomically and advances
//! the pagination offset. Each call costs at most one page fetch; progress
//! resumes across calls through the persisted offset.

use std::collections::HashMap;
use std::sync::Arc;

use scraper::Html;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::browser::{BrowserEngine, BrowserSession, WaitUntil};
use crate::config::CrawlerConfig;
use crate::extract::{dismiss_cookie_banner, extract_cards, ProductCard};
use crate::metrics;
use crate::navigation::NavigationSync;
use crate::slug::CategoryMatch;
use crate::store::{CatalogStore, Category, NewProduct, Product, StoreError};

/// Listing crawls seed one URL; the ceiling leaves room for redirects.
const LISTING_SEED_URLS: u32 = 1;

/// Incremental, cache-first category crawler.
pub struct CategoryCrawler {
    store: Arc<dyn CatalogStore>,
    engine: Arc<dyn BrowserEngine>,
    navigation: Arc<NavigationSync>,
    config: CrawlerConfig,
    /// Per-category guards; concurrent load-more calls for one category
    /// serialize so they cannot append the same page twice.
    locks: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
}

impl CategoryCrawler {
    pub fn new(
        store: Arc<dyn CatalogStore>,
        engine: Arc<dyn BrowserEngine>,
        navigation: Arc<NavigationSync>,
        config: CrawlerConfig,
    ) -> Self {
        Self {
            store,
            engine,
            navigation,
            config,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Fetch a category's products.
    ///
    /// Cache hit: `load_more` false and products stored. Otherwise one page
    /// is fetched and appended. A category that stays unknown even after a
    /// navigation resync yields an empty result, never an error.
    pub async fn fetch_category(
        &self,
        slug: &str,
        load_more: bool,
    ) -> Result<Vec<Product>, StoreError> {
        let clause = CategoryMatch::for_slug(slug);

        let Some(category) = self.lookup_or_sync(&clause).await? else {
            debug!(slug, "Category unknown even after resync");
            return Ok(Vec::new());
        };

        let lock = self.category_lock(category.id).await;
        let _guard = lock.lock().await;

        // Re-read under the lock; a concurrent call may have appended.
        let category = self.store.find_category(&clause)?.unwrap_or(category);
        let count = self.store.count_products(category.id)?;

        if !load_more && count > 0 {
            metrics::CACHE_HITS.with_label_values(&["category"]).inc();
            return self.store.products_by_category(category.id);
        }
        metrics::CACHE_MISSES.with_label_values(&["category"]).inc();

        let target_url = next_page_url(&category, count, self.config.page_size);
        debug!(slug, url = %target_url, stored = count, "Fetching listing page");

        match self.scrape_listing(&target_url).await {
            Some(cards) if !cards.is_empty() => {
                let new_products: Vec<NewProduct> =
                    cards.into_iter().map(ProductCard::into_new_product).collect();
                let new_last_page = count + new_products.len() as u32;
                let inserted =
                    self.store
                        .append_page(category.id, &new_products, new_last_page)?;
                metrics::PRODUCTS_STORED.inc_by(inserted as u64);
                debug!(inserted, new_last_page, "Listing page appended");
            }
            Some(_) | None => {
                debug!(url = %target_url, "No cards from listing page");
            }
        }

        self.store.products_by_category(category.id)
    }

    async fn lookup_or_sync(
        &self,
        clause: &CategoryMatch,
    ) -> Result<Option<Category>, StoreError> {
        if let Some(category) = self.store.find_category(clause)? {
            return Ok(Some(category));
        }
        debug!(fragment = %clause.fragment, "Category lookup missed; resyncing tree");
        self.navigation.sync().await?;
        self.store.find_category(clause)
    }

    /// Fetch one listing page and extract its cards. Every failure is
    /// downgraded to `None` so the caller can fall back to stored data.
    async fn scrape_listing(&self, url: &str) -> Option<Vec<ProductCard>> {
        let mut session = BrowserSession::new(LISTING_SEED_URLS + 2);

        if let Err(e) = self
            .engine
            .navigate(&mut session, url, WaitUntil::DomContentLoaded)
            .await
        {
            warn!(url, error = %e, "Listing fetch failed");
            return None;
        }
        metrics::PAGES_FETCHED.with_label_values(&["category"]).inc();

        dismiss_cookie_banner(
            self.engine.as_ref(),
            &mut session,
            self.config.consent_wait_ms,
        )
        .await;

        let snapshot = session.current()?;
        let document = Html::parse_document(&snapshot.html);
        let outcome = extract_cards(&document);
        if outcome.dropped() > 0 {
            metrics::EXTRACTION_FAILURES.with_label_values(&["cards"]).inc();
            debug!(dropped = outcome.dropped(), url, "Dropped malformed cards");
        }
        outcome.into_data()
    }

    async fn category_lock(&self, category_id: i64) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        Arc::clone(
            locks
                .entry(category_id)
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        )
    }
}

/// The one page to fetch next: the canonical URL while the category is
/// empty, otherwise the page after the last full page stored.
fn next_page_url(category: &Category, stored_count: u32, page_size: u32) -> String {
    if stored_count == 0 {
        return category.url.clone();
    }
    let page = stored_count / page_size + 1;
    if category.url.contains('?') {
        format!("{}&page={page}", category.url)
    } else {
        format!("{}?page={page}", category.url)
    }
}
