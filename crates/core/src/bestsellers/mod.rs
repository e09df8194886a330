//! Bestseller shelf aggregation.
//!
//! One-shot extraction of the homepage's curated product shelves into named
//! collections. Once any collection holds products, calls are served from
//! the store without navigating.

use std::collections::HashSet;
use std::sync::Arc;

use scraper::Html;
use tracing::{debug, warn};

use crate::browser::{BrowserEngine, BrowserSession, WaitUntil};
use crate::config::{CrawlerConfig, SiteConfig};
use crate::extract::{dismiss_cookie_banner, extract_cards_in, rules, ProductCard};
use crate::metrics;
use crate::store::{CatalogStore, NewProduct, Product, StoreError};

/// A bestseller shelf with its display slug.
#[derive(Debug, Clone, serde::Serialize)]
pub struct BestsellerSection {
    pub slug: String,
    pub title: String,
    pub products: Vec<Product>,
}

/// Homepage shelf scraper.
pub struct BestsellerScraper {
    store: Arc<dyn CatalogStore>,
    engine: Arc<dyn BrowserEngine>,
    site: SiteConfig,
    crawler: CrawlerConfig,
}

impl BestsellerScraper {
    pub fn new(
        store: Arc<dyn CatalogStore>,
        engine: Arc<dyn BrowserEngine>,
        site: SiteConfig,
        crawler: CrawlerConfig,
    ) -> Self {
        Self {
            store,
            engine,
            site,
            crawler,
        }
    }

    /// Return the bestseller sections, scraping the homepage only when no
    /// collection has products yet.
    pub async fn get_bestsellers(&self) -> Result<Vec<BestsellerSection>, StoreError> {
        if self.store.has_collection_products()? {
            metrics::CACHE_HITS.with_label_values(&["bestsellers"]).inc();
            return self.sections_from_store();
        }
        metrics::CACHE_MISSES.with_label_values(&["bestsellers"]).inc();

        let home_url = format!("{}/", self.site.base_url.trim_end_matches('/'));
        let mut session = BrowserSession::new(3);

        if let Err(e) = self
            .engine
            .navigate(&mut session, &home_url, WaitUntil::DomContentLoaded)
            .await
        {
            warn!(error = %e, "Homepage fetch failed; no bestsellers this pass");
            return self.sections_from_store();
        }
        metrics::PAGES_FETCHED.with_label_values(&["bestsellers"]).inc();

        dismiss_cookie_banner(
            self.engine.as_ref(),
            &mut session,
            self.crawler.consent_wait_ms,
        )
        .await;

        if let Some(snapshot) = session.current() {
            let document = Html::parse_document(&snapshot.html);
            self.persist_shelves(&document)?;
        }

        self.sections_from_store()
    }

    fn persist_shelves(&self, document: &Html) -> Result<(), StoreError> {
        let mut seen = HashSet::new();
        for selector in rules::SHELF_CONTAINERS.iter() {
            for container in document.select(selector) {
                if !seen.insert(container.id()) {
                    continue;
                }

                let title = rules::SHELF_HEADING
                    .iter()
                    .flat_map(|s| container.select(s))
                    .map(crate::extract::clean_text)
                    .find(|t| !t.is_empty())
                    .unwrap_or_else(|| "Bestsellers".to_string());

                let Some(cards) = extract_cards_in(container).into_data() else {
                    debug!(shelf = %title, "Shelf without extractable cards skipped");
                    continue;
                };

                let products: Vec<NewProduct> =
                    cards.into_iter().map(ProductCard::into_new_product).collect();
                self.store.insert_collection(&title, &products)?;
                metrics::PRODUCTS_STORED.inc_by(products.len() as u64);
            }
        }
        Ok(())
    }

    fn sections_from_store(&self) -> Result<Vec<BestsellerSection>, StoreError> {
        Ok(self
            .store
            .collections_with_products()?
            .into_iter()
            .filter(|(_, products)| !products.is_empty())
            .map(|(collection, products)| BestsellerSection {
                slug: display_slug(&collection.title),
                title: collection.title,
                products,
            })
            .collect())
    }
}

/// Derive a display slug from a collection title: keyword classification
/// first, slugified title otherwise.
pub fn display_slug(title: &str) -> String {
    let lower = title.to_lowercase();
    if lower.contains("non-fiction") {
        "non-fiction".to_string()
    } else if lower.contains("fiction") {
        "fiction".to_string()
    } else if lower.contains("children") {
        "children".to_string()
    } else if lower.contains("rare") {
        "rare".to_string()
    } else {
        slugify(title)
    }
}

fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_dash = true;
    for c in title.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    slug.trim_end_matches('-').to_string()
}
