//! Prometheus metrics for crawl components.

use once_cell::sync::Lazy;
use prometheus::{IntCounter, IntCounterVec, Opts};

/// Pages fetched from the live site, by operation.
pub static PAGES_FETCHED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("bookmirror_pages_fetched_total", "Live pages fetched"),
        &["operation"], // "navigation", "category", "bestsellers", "detail"
    )
    .unwrap()
});

/// Requests served from the store without touching the live site.
pub static CACHE_HITS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("bookmirror_cache_hits_total", "Requests served from cache"),
        &["operation"],
    )
    .unwrap()
});

/// Requests that had to fall back to live extraction.
pub static CACHE_MISSES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("bookmirror_cache_misses_total", "Requests that went live"),
        &["operation"],
    )
    .unwrap()
});

/// Products written to the store.
pub static PRODUCTS_STORED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("bookmirror_products_stored_total", "Products stored").unwrap()
});

/// Extraction passes that yielded nothing or dropped candidates.
pub static EXTRACTION_FAILURES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "bookmirror_extraction_failures_total",
            "Extraction passes with dropped or missing data",
        ),
        &["stage"], // "cards", "sections", "specs"
    )
    .unwrap()
});

/// Register all metrics with the default registry. Safe to call once at
/// startup; duplicate registration errors are ignored so tests can share
/// the process-global registry.
pub fn register_metrics() {
    let registry = prometheus::default_registry();
    let _ = registry.register(Box::new(PAGES_FETCHED.clone()));
    let _ = registry.register(Box::new(CACHE_HITS.clone()));
    let _ = registry.register(Box::new(CACHE_MISSES.clone()));
    let _ = registry.register(Box::new(PRODUCTS_STORED.clone()));
    let _ = registry.register(Box::new(EXTRACTION_FAILURES.clone()));
}
