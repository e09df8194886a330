//! HTML fixture builders in the shapes the extraction rules understand.

/// The consent banner block. `MockEngine` strips exactly this substring when
/// a consent control is clicked.
pub fn consent_banner_html() -> &'static str {
    r#"<div id="cookie-consent" class="cookie-banner">
    <p>We use cookies to improve your browsing experience.</p>
    <button class="cookie-banner__reject">Reject all</button>
    <button class="cookie-banner__accept">Accept all</button>
</div>"#
}

/// A bare page with the given body content.
pub fn simple_page(body: &str) -> String {
    format!("<!DOCTYPE html><html><head><title>fixture</title></head><body>{body}</body></html>")
}

/// A page with a consent banner ahead of the body content.
pub fn page_with_consent_banner(body: &str) -> String {
    simple_page(&format!("{}{body}", consent_banner_html()))
}

/// One product card tile.
pub fn product_card(title: &str, author: &str, price: &str) -> String {
    format!(
        r#"<article class="product-card">
    <img src="https://cdn.shop.test/covers/{slug}.jpg">
    <h3 class="product-card__title">{title}</h3>
    <p class="product-card__author">{author}</p>
    <span class="product-card__price">{price}</span>
</article>"#,
        slug = title.to_lowercase().replace(' ', "-"),
    )
}

/// One product card tile with a promotional pill.
pub fn product_card_with_tag(title: &str, author: &str, price: &str, tag: &str) -> String {
    format!(
        r#"<article class="product-card">
    <h3 class="product-card__title">{title}</h3>
    <p class="product-card__author">{author}</p>
    <span class="product-card__price">{price}</span>
    <span class="pill">{tag}</span>
</article>"#
    )
}

/// A category listing page: a grid of product cards behind a consent banner.
pub fn listing_page(cards: &[(&str, &str, &str)]) -> String {
    let grid: String = cards
        .iter()
        .map(|(title, author, price)| product_card(title, author, price))
        .collect();
    page_with_consent_banner(&format!(r#"<div class="product-grid">{grid}</div>"#))
}

/// A site-root page with navigation anchors.
///
/// Each entry is (parent name, optional child name, href).
pub fn nav_page(anchors: &[(&str, Option<&str>, &str)]) -> String {
    let links: String = anchors
        .iter()
        .map(|(parent, child, href)| match child {
            Some(child) => format!(
                r#"<a data-parent-category="{parent}" data-child-category="{child}" href="{href}">{child}</a>"#
            ),
            None => format!(
                r#"<a data-parent-category="{parent}" href="{href}">{parent}</a>"#
            ),
        })
        .collect();
    page_with_consent_banner(&format!("<nav>{links}</nav>"))
}

/// A homepage with bestseller shelves.
///
/// Each shelf is (section title, tiles as (title, author, price, tag)).
pub fn homepage_with_shelves(shelves: &[(&str, &[(&str, &str, &str, &str)])]) -> String {
    let sections: String = shelves
        .iter()
        .map(|(title, tiles)| {
            let cards: String = tiles
                .iter()
                .map(|(t, a, p, tag)| product_card_with_tag(t, a, p, tag))
                .collect();
            format!(
                r#"<section class="bestsellers-section">
    <h2 class="section-header__title">{title}</h2>
    {cards}
</section>"#
            )
        })
        .collect();
    page_with_consent_banner(&sections)
}

/// A search results page; each entry is (anchor text, href).
pub fn search_results_page(entries: &[(&str, &str)]) -> String {
    let results: String = entries
        .iter()
        .map(|(text, href)| {
            format!(
                r#"<article class="product-card"><a href="{href}">{text}</a></article>"#
            )
        })
        .collect();
    page_with_consent_banner(&format!(r#"<div class="search-results">{results}</div>"#))
}

/// Options for building a product detail page.
#[derive(Debug, Clone, Default)]
pub struct DetailPageOptions {
    /// Summary accordion body.
    pub summary: Option<String>,
    /// Review accordion lines.
    pub reviews: Vec<String>,
    /// Labeled specification table rows.
    pub spec_rows: Vec<(String, String)>,
    /// Free-text lines, e.g. "ISBN-13: 978-...".
    pub text_lines: Vec<String>,
    /// Dedicated condition label.
    pub condition: Option<String>,
    /// Related-product tiles as (title, price).
    pub related: Vec<(String, String)>,
}

/// A product detail page with accordions, spec table and related tiles.
pub fn product_detail_page(opts: &DetailPageOptions) -> String {
    let mut body = String::new();

    if let Some(summary) = &opts.summary {
        body.push_str(&format!(
            r#"<div class="accordion__item">
    <h3 class="accordion__title">Summary</h3>
    <div class="accordion__content"><p>{summary}</p></div>
</div>"#
        ));
    }

    if !opts.reviews.is_empty() {
        let lines: String = opts
            .reviews
            .iter()
            .map(|r| format!("<p>{r}</p>"))
            .collect();
        body.push_str(&format!(
            r#"<div class="accordion__item">
    <h3 class="accordion__title">Customer Reviews</h3>
    <div class="accordion__content">{lines}</div>
</div>"#
        ));
    }

    if !opts.spec_rows.is_empty() {
        let rows: String = opts
            .spec_rows
            .iter()
            .map(|(label, value)| format!("<tr><th>{label}</th><td>{value}</td></tr>"))
            .collect();
        body.push_str(&format!(r#"<table class="product-specs">{rows}</table>"#));
    }

    for line in &opts.text_lines {
        body.push_str(&format!("<p>{line}</p>"));
    }

    if let Some(condition) = &opts.condition {
        body.push_str(&format!(
            r#"<span class="product-condition">{condition}</span>"#
        ));
    }

    if !opts.related.is_empty() {
        let tiles: String = opts
            .related
            .iter()
            .map(|(title, price)| {
                format!(
                    r#"<article class="product-card">
    <h3 class="product-card__title">{title}</h3>
    <span class="product-card__price">{price}</span>
</article>"#
                )
            })
            .collect();
        body.push_str(&format!(r#"<div class="related-products">{tiles}</div>"#));
    }

    page_with_consent_banner(&body)
}
