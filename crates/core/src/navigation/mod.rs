//! Category tree synchronization.
//!
//! Crawls the site root's navigation surface, rebuilds the parent/child
//! category graph and merges it into the store. Runs when the navigation
//! cache is empty and reactively when a category lookup misses.

use std::collections::BTreeMap;
use std::sync::Arc;

use scraper::Html;
use tracing::{debug, warn};
use url::Url;

use crate::browser::{BrowserEngine, BrowserSession, WaitUntil};
use crate::config::{CrawlerConfig, SiteConfig};
use crate::extract::{dismiss_cookie_banner, rules};
use crate::store::{CatalogStore, Category, StoreError};

/// Canonical root URL paths for the known top-level parents. The live anchor
/// for these sometimes points at a campaign page; the root link must always
/// be the collection URL.
const CANONICAL_PARENTS: &[(&str, &str)] = &[
    ("Fiction", "/collections/fiction-books"),
    ("Non-Fiction", "/collections/non-fiction-books"),
    ("Children's", "/collections/childrens-books"),
    ("Rare", "/collections/rare-books"),
];

/// Core categories seeded into the tree even when their anchors are missing
/// from the live page.
const CORE_SEEDS: &[(&str, &str)] = &[
    ("Fiction", "/collections/fiction-books"),
    ("Non-Fiction", "/collections/non-fiction-books"),
    ("Children's", "/collections/childrens-books"),
    ("Rare", "/collections/rare-books"),
];

/// Navigation-surface synchronizer.
pub struct NavigationSync {
    store: Arc<dyn CatalogStore>,
    engine: Arc<dyn BrowserEngine>,
    site: SiteConfig,
    crawler: CrawlerConfig,
}

#[derive(Debug, Default)]
struct ParentEntry {
    url: String,
    /// (title, url) pairs, deduplicated by url.
    children: Vec<(String, String)>,
}

#[derive(Debug)]
struct NavAnchor {
    parent: String,
    child: Option<String>,
    url: String,
}

impl NavigationSync {
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

    /// Crawl the navigation surface and merge it into the store, returning
    /// the refreshed root tree.
    ///
    /// A failed fetch degrades to seeding the known core categories so the
    /// tree stays usable.
    pub async fn sync(&self) -> Result<Vec<Category>, StoreError> {
        let base = self.site.base_url.trim_end_matches('/').to_string();
        let root_url = format!("{base}/");

        let mut session = BrowserSession::new(3);
        let html = match self
            .engine
            .navigate(&mut session, &root_url, WaitUntil::DomContentLoaded)
            .await
        {
            Ok(_) => {
                dismiss_cookie_banner(
                    self.engine.as_ref(),
                    &mut session,
                    self.crawler.consent_wait_ms,
                )
                .await;
                session.current().map(|s| s.html.clone())
            }
            Err(e) => {
                warn!(error = %e, "Navigation fetch failed; seeding core categories only");
                None
            }
        };

        let mut parents: BTreeMap<String, ParentEntry> = BTreeMap::new();

        if let Some(html) = html {
            let document = Html::parse_document(&html);
            let anchors = collect_anchors(&document, &base);
            debug!(anchors = anchors.len(), "Navigation anchors extracted");

            // Phase 1: register parents. A parent-level anchor (no child
            // name) is authoritative over any earlier child-derived guess.
            for anchor in &anchors {
                let entry = parents.entry(anchor.parent.clone()).or_default();
                if anchor.child.is_none() {
                    entry.url = anchor.url.clone();
                } else if entry.url.is_empty() {
                    entry.url = anchor.url.clone();
                }
            }

            for (name, path) in CANONICAL_PARENTS {
                if let Some(entry) = parents.get_mut(*name) {
                    entry.url = format!("{base}{path}");
                }
            }

            // Phase 2: attach children, deduplicating by URL per parent.
            for anchor in anchors {
                if let Some(child) = anchor.child {
                    let entry = parents.entry(anchor.parent).or_default();
                    if !entry.children.iter().any(|(_, url)| *url == anchor.url) {
                        entry.children.push((child, anchor.url));
                    }
                }
            }
        }

        for (name, path) in CORE_SEEDS {
            parents
                .entry((*name).to_string())
                .or_insert_with(|| ParentEntry {
                    url: format!("{base}{path}"),
                    children: Vec::new(),
                });
        }

        for (name, entry) in &parents {
            if entry.url.is_empty() {
                continue;
            }
            let parent = self.store.upsert_category(name, &entry.url, None)?;
            for (child_title, child_url) in &entry.children {
                // A child sharing the parent's URL would re-parent the root
                // onto itself.
                if child_url == &parent.url {
                    continue;
                }
                self.store
                    .upsert_category(child_title, child_url, Some(parent.id))?;
            }
        }

        self.store.root_tree()
    }
}

/// Extract navigation anchors, resolving hrefs against the base URL and
/// discarding placeholders and the bare root.
fn collect_anchors(document: &Html, base: &str) -> Vec<NavAnchor> {
    let base_url = Url::parse(&format!("{base}/")).ok();
    let mut anchors = Vec::new();

    for element in document.select(&rules::NAV_ANCHORS) {
        let Some(parent) = element.value().attr(rules::NAV_PARENT_ATTR) else {
            continue;
        };
        let parent = parent.trim();
        if parent.is_empty() {
            continue;
        }

        let child = element
            .value()
            .attr(rules::NAV_CHILD_ATTR)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let href = href.trim();
        if href.is_empty() || href == "#" || href.starts_with("javascript:") {
            continue;
        }

        let resolved = match &base_url {
            Some(b) => match b.join(href) {
                Ok(u) => u.to_string(),
                Err(_) => continue,
            },
            None => href.to_string(),
        };
        if resolved.trim_end_matches('/') == base {
            continue;
        }

        anchors.push(NavAnchor {
            parent: parent.to_string(),
            child,
            url: resolved,
        });
    }

    anchors
}
