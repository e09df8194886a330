//! Selector and pattern tables for heuristic extraction.
//!
//! The source site's markup is uncontrolled and inconsistently marked, so
//! every field is located through a fallback chain. All rules live here as
//! data; update this file when the site changes its HTML structure, and add
//! a fixture for the new shape.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use scraper::Selector;

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("invalid selector in rule table")
}

// ============================================================================
// Cookie consent (selector strings handed to the engine)
// ============================================================================

/// Consent banner container.
pub const CONSENT_BANNER: &str =
    "#onetrust-banner-sdk, .cookie-banner, [data-consent-banner], #cookie-consent";

/// Preferred dismissal: reject all.
pub const CONSENT_REJECT: &str =
    "#onetrust-reject-all-handler, .cookie-banner__reject, [data-consent-reject]";

/// Fallback dismissal: accept all.
pub const CONSENT_ACCEPT: &str =
    "#onetrust-accept-btn-handler, .cookie-banner__accept, [data-consent-accept]";

// ============================================================================
// Product cards
// ============================================================================

/// Candidate card containers, in fallback order.
pub static CARD_CONTAINERS: Lazy<Vec<Selector>> = Lazy::new(|| {
    vec![
        selector("article.product-card"),
        selector("li.product-item"),
        selector("div.product-card"),
        selector("[data-product-card]"),
        selector(".product-grid .grid__item"),
    ]
});

/// Title-like elements within a card.
pub static CARD_TITLE: Lazy<Vec<Selector>> = Lazy::new(|| {
    vec![
        selector(".product-card__title"),
        selector(".product-item__title"),
        selector("h3 a"),
        selector("h3"),
        selector("[data-product-title]"),
    ]
});

/// Price-like elements within a card.
pub static CARD_PRICE: Lazy<Vec<Selector>> = Lazy::new(|| {
    vec![
        selector(".product-card__price"),
        selector(".price__current"),
        selector(".price"),
        selector("[data-product-price]"),
    ]
});

/// Author-like elements within a card.
pub static CARD_AUTHOR: Lazy<Vec<Selector>> = Lazy::new(|| {
    vec![
        selector(".product-card__author"),
        selector(".product-item__author"),
        selector("[data-product-author]"),
        selector(".author"),
    ]
});

/// Image elements within a card.
pub static CARD_IMAGE: Lazy<Selector> = Lazy::new(|| selector("img"));

/// Elements carrying an inline background-image, the image fallback.
pub static CARD_BG: Lazy<Selector> = Lazy::new(|| selector("[style*='background-image']"));

/// Promotional pill elements within a bestseller card.
pub static CARD_TAG: Lazy<Vec<Selector>> = Lazy::new(|| {
    vec![
        selector(".pill"),
        selector(".badge"),
        selector(".product-card__tag"),
    ]
});

/// Currency fallback when no price element matches: £ or $ with a number.
pub static PRICE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[£$]\s*\d+(?:\.\d{1,2})?").unwrap());

/// CSS background-image URL, the image fallback for lazily-loaded cards.
pub static BACKGROUND_IMAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"background-image\s*:\s*url\(['"]?([^'")]+)['"]?\)"#).unwrap());

// ============================================================================
// Navigation tree
// ============================================================================

/// Anchors carrying parent/child category attributes.
pub static NAV_ANCHORS: Lazy<Selector> = Lazy::new(|| selector("a[data-parent-category]"));

/// Attribute holding the parent category name.
pub const NAV_PARENT_ATTR: &str = "data-parent-category";

/// Attribute holding the child category name; absent on parent-level anchors.
pub const NAV_CHILD_ATTR: &str = "data-child-category";

// ============================================================================
// Bestseller shelves
// ============================================================================

/// Homepage bestseller/recommendation containers.
pub static SHELF_CONTAINERS: Lazy<Vec<Selector>> = Lazy::new(|| {
    vec![
        selector("[data-bestsellers]"),
        selector(".bestsellers-section"),
        selector(".featured-collection"),
        selector(".recommendation-shelf"),
    ]
});

/// Heading elements within a shelf.
pub static SHELF_HEADING: Lazy<Vec<Selector>> = Lazy::new(|| {
    vec![
        selector(".section-header__title"),
        selector("h2"),
        selector("h3"),
    ]
});

// ============================================================================
// Search results
// ============================================================================

/// Result-card wait target, handed to the engine.
pub const SEARCH_RESULTS: &str =
    ".search-results, [data-search-results], .product-grid";

/// Candidate result-card anchors, one comma-joined selector so matches come
/// back in document order.
pub static SEARCH_RESULT_ANCHORS: Lazy<Selector> = Lazy::new(|| {
    selector(
        ".search-results .product-card a, \
         [data-search-results] a, \
         li.search-result a, \
         .product-grid .product-card a",
    )
});

// ============================================================================
// Product detail page
// ============================================================================

/// Collapsible content sections.
pub static ACCORDION_SECTIONS: Lazy<Vec<Selector>> = Lazy::new(|| {
    vec![
        selector(".accordion__item"),
        selector("details.product-accordion"),
        selector("[data-accordion-item]"),
    ]
});

/// Heading within a collapsible section.
pub static ACCORDION_HEADING: Lazy<Vec<Selector>> = Lazy::new(|| {
    vec![
        selector(".accordion__title"),
        selector("summary"),
        selector("h2"),
        selector("h3"),
    ]
});

/// Panel body within a collapsible section.
pub static ACCORDION_PANEL: Lazy<Vec<Selector>> = Lazy::new(|| {
    vec![
        selector(".accordion__content"),
        selector(".accordion__panel"),
        selector("[data-accordion-panel]"),
    ]
});

/// Description fallbacks when no summary section exists.
pub static DESCRIPTION_FALLBACKS: Lazy<Vec<Selector>> = Lazy::new(|| {
    vec![
        selector(".product-description"),
        selector("#description"),
        selector("[itemprop='description']"),
        selector(".product__description"),
    ]
});

/// Dedicated condition label.
pub static CONDITION_LABEL: Lazy<Vec<Selector>> = Lazy::new(|| {
    vec![
        selector(".product-condition"),
        selector("[data-condition]"),
        selector(".condition-label"),
    ]
});

/// Labeled table rows on a detail page.
pub static SPEC_ROWS: Lazy<Vec<Selector>> = Lazy::new(|| {
    vec![
        selector(".product-specs tr"),
        selector(".product-details-table tr"),
        selector("table tr"),
    ]
});

/// Label cell within a spec row.
pub static SPEC_LABEL_CELL: Lazy<Selector> = Lazy::new(|| selector("th, td"));

/// Definition lists on a detail page.
pub static SPEC_DT: Lazy<Selector> = Lazy::new(|| selector("dt"));
pub static SPEC_DD: Lazy<Selector> = Lazy::new(|| selector("dd"));

/// Related-product containers ("customers also like").
pub static RELATED_CONTAINERS: Lazy<Vec<Selector>> = Lazy::new(|| {
    vec![
        selector(".related-products"),
        selector("[data-recommendations]"),
        selector(".also-like"),
    ]
});

// ============================================================================
// Specification text heuristics
// ============================================================================

/// Keys every extracted specification map must carry, even when empty.
pub const REQUIRED_SPEC_KEYS: &[&str] = &[
    "SKU",
    "ISBN 13",
    "ISBN 10",
    "Title",
    "Author",
    "Condition",
    "Binding Type",
    "Publisher",
    "Year published",
    "Number of pages",
    "Cover note",
    "Note",
];

/// Recognized binding types, longest first so compound names win.
pub const BINDING_TYPES: &[&str] = &[
    "Mass Market Paperback",
    "Trade Paperback",
    "Paperback",
    "Hardback",
    "Hardcover",
    "Leather",
];

/// Text labels mapped to canonical specification keys. Lines shaped
/// `Label: value` anywhere in the page text feed the map.
pub const TEXT_LABELS: &[(&str, &str)] = &[
    ("sku", "SKU"),
    ("isbn 13", "ISBN 13"),
    ("isbn-13", "ISBN 13"),
    ("isbn13", "ISBN 13"),
    ("isbn 10", "ISBN 10"),
    ("isbn-10", "ISBN 10"),
    ("isbn10", "ISBN 10"),
    ("title", "Title"),
    ("author", "Author"),
    ("condition", "Condition"),
    ("binding type", "Binding Type"),
    ("binding", "Binding Type"),
    ("format", "Binding Type"),
    ("publisher", "Publisher"),
    ("year published", "Year published"),
    ("publication year", "Year published"),
    ("number of pages", "Number of pages"),
    ("pages", "Number of pages"),
    ("cover note", "Cover note"),
    ("note", "Note"),
];

/// ISBN-13 candidate anywhere in the page text; the caller keeps matches
/// that normalize to exactly 13 digits.
pub static ISBN13_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)isbn[\s:-]*(?:13)?[\s:]*([0-9][0-9\- ]{11,20}[0-9])").unwrap());

/// ISBN-10 candidate anywhere in the page text; the caller keeps matches
/// that normalize to exactly 10 digits.
pub static ISBN10_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)isbn[\s:-]*(?:10)?[\s:]*([0-9][0-9\- ]{7,14}[0-9Xx])").unwrap());

/// A publication year in running text, e.g. "published in 1965".
pub static YEAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)published[^0-9]{0,20}((?:19|20)\d{2})").unwrap());

/// A page count in running text, e.g. "412 pages".
pub static PAGES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{2,4})\s+pages").unwrap());
