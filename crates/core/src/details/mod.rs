//! Product detail enrichment.
//!
//! Query-driven search, best-match product resolution and deep heuristic
//! extraction of summary, specifications, reviews and recommendations.

use std::collections::HashSet;
use std::sync::Arc;

use scraper::Html;
use tracing::{debug, warn};
use url::Url;

use crate::browser::{BrowserEngine, BrowserSession, SelectorState, WaitUntil};
use crate::config::{CrawlerConfig, SiteConfig};
use crate::extract::{
    clean_text, dismiss_cookie_banner, extract_accordion_sections, extract_cards_in,
    extract_condition, extract_specifications, rules,
};
use crate::metrics;
use crate::store::{
    CatalogStore, DetailUpdate, NewProduct, ProductDetails, Recommendation, StoreError,
};

/// Review lines shorter than this are noise (ratings, dates, "ok").
const MIN_REVIEW_LINE_LEN: usize = 20;

/// A panel kept whole must at least say something.
const MIN_REVIEW_PANEL_LEN: usize = 30;

/// Search-and-enrich component.
pub struct ProductEnricher {
    store: Arc<dyn CatalogStore>,
    engine: Arc<dyn BrowserEngine>,
    site: SiteConfig,
    crawler: CrawlerConfig,
}

impl ProductEnricher {
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

    /// Resolve `query` to an enriched product.
    ///
    /// Cache hit: a stored product whose title contains the query and which
    /// already has a non-empty summary is returned without any navigation.
    /// Otherwise the site's search is crawled; no acceptable match ends the
    /// operation with `None`, never an error.
    pub async fn search_and_scrape(
        &self,
        query: &str,
    ) -> Result<Option<ProductDetails>, StoreError> {
        let existing = self.store.find_product_by_title(query)?;
        if let Some(product) = &existing {
            if product.summary.as_deref().is_some_and(|s| !s.is_empty()) {
                metrics::CACHE_HITS.with_label_values(&["detail"]).inc();
                return Ok(Some(self.store.product_details(product.id)?));
            }
        }
        metrics::CACHE_MISSES.with_label_values(&["detail"]).inc();

        let mut session = BrowserSession::new(self.crawler.detail_request_budget);

        let search_url = self.site.search_url(query);
        if let Err(e) = self
            .engine
            .navigate(&mut session, &search_url, WaitUntil::DomContentLoaded)
            .await
        {
            warn!(query, error = %e, "Search fetch failed");
            return Ok(None);
        }
        metrics::PAGES_FETCHED.with_label_values(&["detail"]).inc();

        dismiss_cookie_banner(
            self.engine.as_ref(),
            &mut session,
            self.crawler.consent_wait_ms,
        )
        .await;

        // Result cards can render late; give them a moment, best effort.
        let _ = self
            .engine
            .wait_for(&mut session, rules::SEARCH_RESULTS, SelectorState::Visible, 5_000)
            .await;

        let Some(product_url) = session.current().and_then(|snapshot| {
            let document = Html::parse_document(&snapshot.html);
            best_match_anchor(&document, query, &self.site.base_url)
        }) else {
            debug!(query, "No matching search result");
            return Ok(None);
        };

        if let Err(e) = self
            .engine
            .navigate(&mut session, &product_url, WaitUntil::DomContentLoaded)
            .await
        {
            warn!(url = %product_url, error = %e, "Product page fetch failed");
            return Ok(None);
        }
        metrics::PAGES_FETCHED.with_label_values(&["detail"]).inc();

        dismiss_cookie_banner(
            self.engine.as_ref(),
            &mut session,
            self.crawler.consent_wait_ms,
        )
        .await;

        let Some(snapshot) = session.current() else {
            return Ok(None);
        };
        let document = Html::parse_document(&snapshot.html);
        let update = deep_extract(&document);

        let product_id = match existing {
            Some(product) => product.id,
            None => {
                let title = update
                    .specifications
                    .get("Title")
                    .filter(|t| !t.is_empty())
                    .cloned()
                    .unwrap_or_else(|| query.to_string());
                let author = update
                    .specifications
                    .get("Author")
                    .filter(|a| !a.is_empty())
                    .cloned()
                    .unwrap_or_else(|| "Unknown".to_string());
                self.store
                    .create_product(&NewProduct {
                        title,
                        author,
                        price: String::new(),
                        image_url: None,
                        tag: None,
                    })?
                    .id
            }
        };

        self.store.save_details(product_id, &update)?;
        Ok(Some(self.store.product_details(product_id)?))
    }
}

/// First document-order anchor whose visible text equals, contains, or is
/// contained by the query (case-insensitive). No scoring; the tie-break is
/// document order.
fn best_match_anchor(document: &Html, query: &str, base_url: &str) -> Option<String> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    let base = Url::parse(&format!("{}/", base_url.trim_end_matches('/'))).ok();

    for anchor in document.select(&rules::SEARCH_RESULT_ANCHORS) {
        let text = clean_text(anchor).to_lowercase();
        if text.is_empty() {
            continue;
        }
        if text == needle || text.contains(&needle) || needle.contains(&text) {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            let href = href.trim();
            if href.is_empty() {
                continue;
            }
            return match &base {
                Some(b) => b.join(href).ok().map(|u| u.to_string()),
                None => Some(href.to_string()),
            };
        }
    }
    None
}

/// Deep extraction over a product detail page.
pub fn deep_extract(document: &Html) -> DetailUpdate {
    let sections = extract_accordion_sections(document);

    // Summary: among qualifying sections the longest wins.
    let mut summary = sections
        .iter()
        .filter(|s| s.heading.to_lowercase().contains("summary"))
        .map(|s| s.body.trim().to_string())
        .max_by_key(String::len)
        .unwrap_or_default();
    if summary.is_empty() {
        summary = rules::DESCRIPTION_FALLBACKS
            .iter()
            .flat_map(|s| document.select(s))
            .map(clean_text)
            .find(|t| !t.is_empty())
            .unwrap_or_default();
    }

    let mut reviews = Vec::new();
    for section in sections
        .iter()
        .filter(|s| s.heading.to_lowercase().contains("review"))
    {
        let lines: Vec<String> = section
            .body
            .lines()
            .map(str::trim)
            .filter(|line| line.len() > MIN_REVIEW_LINE_LEN)
            .map(String::from)
            .collect();
        if !lines.is_empty() {
            reviews.extend(lines);
        } else {
            let whole = section.body.trim();
            if whole.len() > MIN_REVIEW_PANEL_LEN {
                reviews.push(whole.to_string());
            }
        }
    }

    let mut specifications = extract_specifications(document);

    let labeled_condition = extract_condition(document);
    let condition = labeled_condition
        .clone()
        .or_else(|| {
            specifications
                .get("Condition")
                .filter(|v| !v.is_empty())
                .cloned()
        })
        .unwrap_or_else(|| "Pre-owned".to_string());
    if let Some(label) = labeled_condition {
        let entry = specifications.entry("Condition".to_string()).or_default();
        if entry.is_empty() {
            *entry = label;
        }
    }

    let mut recommendations = Vec::new();
    let mut seen = HashSet::new();
    for selector in rules::RELATED_CONTAINERS.iter() {
        for container in document.select(selector) {
            if !seen.insert(container.id()) {
                continue;
            }
            let Some(cards) = extract_cards_in(container).into_data() else {
                continue;
            };
            for card in cards {
                // A tile without both title and price is not a usable
                // recommendation.
                if card.title.is_empty() || card.price.is_empty() {
                    continue;
                }
                recommendations.push(Recommendation {
                    title: card.title,
                    price: card.price,
                    image_url: card.image_url,
                });
            }
        }
    }

    DetailUpdate {
        summary,
        condition,
        specifications,
        recommendations,
        reviews,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteStore;
    use crate::testing::{fixtures, MockEngine};

    const BASE: &str = "https://shop.test";

    fn enricher(engine: Arc<MockEngine>, store: Arc<SqliteStore>) -> ProductEnricher {
        let site = SiteConfig {
            base_url: BASE.to_string(),
            ..SiteConfig::default()
        };
        ProductEnricher::new(store, engine, site, CrawlerConfig::default())
    }

    fn search_url(query: &str) -> String {
        format!("{BASE}/search?q={}", urlencoding::encode(query))
    }

    #[tokio::test]
    async fn test_cache_hit_performs_no_navigation() {
        let engine = Arc::new(MockEngine::new());
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        let product = store
            .create_product(&NewProduct {
                title: "Dune".to_string(),
                author: "Frank Herbert".to_string(),
                price: "£5.50".to_string(),
                image_url: None,
                tag: None,
            })
            .unwrap();
        store
            .save_details(
                product.id,
                &DetailUpdate {
                    summary: "A desert planet saga.".to_string(),
                    condition: "Pre-owned".to_string(),
                    ..Default::default()
                },
            )
            .unwrap();

        let enricher = enricher(Arc::clone(&engine), store);
        let details = enricher.search_and_scrape("Dune").await.unwrap().unwrap();

        assert_eq!(details.product.summary.as_deref(), Some("A desert planet saga."));
        assert_eq!(engine.navigation_count().await, 0);
    }

    #[tokio::test]
    async fn test_full_search_and_scrape() {
        let engine = Arc::new(MockEngine::new());
        engine
            .add_page(
                search_url("Dune"),
                fixtures::search_results_page(&[
                    ("Something Else Entirely", "/products/other"),
                    ("Dune (1965 Paperback)", "/products/dune-1965"),
                ]),
            )
            .await;
        engine
            .add_page(
                format!("{BASE}/products/dune-1965"),
                fixtures::product_detail_page(&fixtures::DetailPageOptions {
                    summary: Some("Arrakis, the desert planet.".to_string()),
                    reviews: vec![
                        "Loved every page of this battered old copy.".to_string(),
                        "ok".to_string(),
                    ],
                    spec_rows: vec![
                        ("Title".to_string(), "Dune".to_string()),
                        ("Author".to_string(), "Frank Herbert".to_string()),
                        ("Publisher".to_string(), "New English Library".to_string()),
                    ],
                    text_lines: vec!["ISBN-13: 978-0-450-01184-9".to_string()],
                    related: vec![("Dune Messiah".to_string(), "£4.50".to_string())],
                    ..Default::default()
                }),
            )
            .await;
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        let enricher = enricher(Arc::clone(&engine), Arc::clone(&store));

        let details = enricher.search_and_scrape("Dune").await.unwrap().unwrap();

        assert_eq!(details.product.title, "Dune");
        assert_eq!(details.product.author, "Frank Herbert");
        assert_eq!(
            details.product.summary.as_deref(),
            Some("Arrakis, the desert planet.")
        );
        // No condition on the page: defaults to Pre-owned.
        assert_eq!(details.product.condition.as_deref(), Some("Pre-owned"));
        // All twelve required keys present.
        for key in rules::REQUIRED_SPEC_KEYS {
            assert!(details.specifications.contains_key(*key), "missing {key}");
        }
        assert_eq!(details.specifications["ISBN 13"], "9780450011849");
        assert_eq!(details.recommendations.len(), 1);
        // Only the substantial review line survives.
        assert_eq!(details.reviews.len(), 1);
    }

    #[tokio::test]
    async fn test_first_document_order_match_wins() {
        let engine = Arc::new(MockEngine::new());
        engine
            .add_page(
                search_url("Dune"),
                fixtures::search_results_page(&[
                    ("Dune Messiah", "/products/dune-messiah"),
                    ("Dune", "/products/dune"),
                ]),
            )
            .await;
        // Only the first match's page is scripted; reaching it proves the
        // tie-break.
        engine
            .add_page(
                format!("{BASE}/products/dune-messiah"),
                fixtures::product_detail_page(&fixtures::DetailPageOptions {
                    summary: Some("The sequel.".to_string()),
                    ..Default::default()
                }),
            )
            .await;
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        let enricher = enricher(Arc::clone(&engine), Arc::clone(&store));

        let details = enricher.search_and_scrape("Dune").await.unwrap().unwrap();
        assert_eq!(details.product.summary.as_deref(), Some("The sequel."));
    }

    #[tokio::test]
    async fn test_no_match_returns_none() {
        let engine = Arc::new(MockEngine::new());
        engine
            .add_page(
                search_url("Dune"),
                fixtures::search_results_page(&[("Completely Unrelated", "/products/other")]),
            )
            .await;
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        let enricher = enricher(engine, store);

        let details = enricher.search_and_scrape("Dune").await.unwrap();
        assert!(details.is_none());
    }

    #[tokio::test]
    async fn test_search_failure_returns_none() {
        let engine = Arc::new(MockEngine::new());
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        let enricher = enricher(engine, store);

        let details = enricher.search_and_scrape("Dune").await.unwrap();
        assert!(details.is_none());
    }

    #[tokio::test]
    async fn test_existing_product_enriched_in_place() {
        let engine = Arc::new(MockEngine::new());
        engine
            .add_page(
                search_url("Dune"),
                fixtures::search_results_page(&[("Dune", "/products/dune")]),
            )
            .await;
        engine
            .add_page(
                format!("{BASE}/products/dune"),
                fixtures::product_detail_page(&fixtures::DetailPageOptions {
                    summary: Some("Now enriched.".to_string()),
                    ..Default::default()
                }),
            )
            .await;
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        // Known from a listing crawl, but never enriched.
        let product = store
            .create_product(&NewProduct {
                title: "Dune".to_string(),
                author: "Frank Herbert".to_string(),
                price: "£5.50".to_string(),
                image_url: None,
                tag: None,
            })
            .unwrap();

        let enricher = enricher(Arc::clone(&engine), Arc::clone(&store));
        let details = enricher.search_and_scrape("Dune").await.unwrap().unwrap();

        assert_eq!(details.product.id, product.id);
        assert_eq!(details.product.price, "£5.50");
        assert_eq!(details.product.summary.as_deref(), Some("Now enriched."));
    }

    #[test]
    fn test_deep_extract_condition_from_label() {
        let html = fixtures::product_detail_page(&fixtures::DetailPageOptions {
            condition: Some("Like New".to_string()),
            ..Default::default()
        });
        let document = Html::parse_document(&html);
        let update = deep_extract(&document);
        assert_eq!(update.condition, "Like New");
        assert_eq!(update.specifications["Condition"], "Like New");
    }

    #[test]
    fn test_deep_extract_short_panel_kept_whole() {
        let html = fixtures::simple_page(
            r#"<div class="accordion__item">
                <h3 class="accordion__title">Reviews</h3>
                <div class="accordion__content"><p>short</p><p>also short here</p></div>
            </div>"#,
        );
        let document = Html::parse_document(&html);
        let update = deep_extract(&document);
        // No line is long enough; the whole panel is too short either way.
        assert!(update.reviews.is_empty());
    }

    #[test]
    fn test_deep_extract_longest_summary_wins() {
        let html = fixtures::simple_page(
            r#"<div class="accordion__item">
                <h3 class="accordion__title">Summary</h3>
                <div class="accordion__content"><p>Short.</p></div>
            </div>
            <div class="accordion__item">
                <h3 class="accordion__title">Publisher Summary</h3>
                <div class="accordion__content"><p>The much longer and more complete one.</p></div>
            </div>"#,
        );
        let document = Html::parse_document(&html);
        let update = deep_extract(&document);
        assert_eq!(update.summary, "The much longer and more complete one.");
    }
}
