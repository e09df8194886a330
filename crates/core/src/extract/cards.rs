//! Product card extraction.

use std::collections::HashSet;

use scraper::{ElementRef, Html};

use crate::store::{dedup_key, NewProduct};

use super::outcome::Extraction;
use super::{clean_text, rules};

/// Intermediate, not-yet-validated extraction of one product tile.
#[derive(Debug, Clone, Default)]
pub struct RawCard {
    pub title: Option<String>,
    pub price: Option<String>,
    pub author: Option<String>,
    pub image_url: Option<String>,
    pub tag: Option<String>,
}

/// A validated card, ready for persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductCard {
    pub title: String,
    pub price: String,
    pub author: String,
    pub image_url: Option<String>,
    pub tag: Option<String>,
}

impl RawCard {
    /// Normalize into a validated card. A card lacking both title and price
    /// carries no identity and is rejected.
    pub fn normalize(self) -> Option<ProductCard> {
        if self.title.is_none() && self.price.is_none() {
            return None;
        }
        Some(ProductCard {
            title: self.title.unwrap_or_default(),
            price: self.price.unwrap_or_default(),
            author: self
                .author
                .filter(|a| !a.is_empty())
                .unwrap_or_else(|| "Unknown".to_string()),
            image_url: self.image_url,
            tag: self.tag,
        })
    }
}

impl ProductCard {
    pub fn into_new_product(self) -> NewProduct {
        NewProduct {
            title: self.title,
            author: self.author,
            price: self.price,
            image_url: self.image_url,
            tag: self.tag,
        }
    }
}

/// Extract product cards from a whole document.
pub fn extract_cards(html: &Html) -> Extraction<Vec<ProductCard>> {
    extract_cards_in(html.root_element())
}

/// Extract product cards scoped to one container element.
///
/// Candidates come from every fallback container selector (deduplicated per
/// element); hidden elements are skipped. Output cards are deduplicated by
/// (lowercased trimmed title, whitespace-stripped price), first wins.
pub fn extract_cards_in(scope: ElementRef<'_>) -> Extraction<Vec<ProductCard>> {
    let mut seen_elements = HashSet::new();
    let mut raw = Vec::new();
    for selector in rules::CARD_CONTAINERS.iter() {
        for element in scope.select(selector) {
            if !seen_elements.insert(element.id()) {
                continue;
            }
            if is_hidden(element) {
                continue;
            }
            raw.push(read_card(element));
        }
    }

    if raw.is_empty() {
        return Extraction::Empty;
    }

    let mut dropped = 0usize;
    let mut seen_keys = HashSet::new();
    let mut cards = Vec::new();
    for raw_card in raw {
        match raw_card.normalize() {
            Some(card) => {
                let key = dedup_key(&card.title, &card.price);
                if seen_keys.insert(key) {
                    cards.push(card);
                }
            }
            None => dropped += 1,
        }
    }

    if cards.is_empty() {
        Extraction::Empty
    } else if dropped == 0 {
        Extraction::Complete(cards)
    } else {
        Extraction::Partial {
            data: cards,
            dropped,
        }
    }
}

fn read_card(element: ElementRef<'_>) -> RawCard {
    let title = first_text(element, &rules::CARD_TITLE);

    let price = first_text(element, &rules::CARD_PRICE).or_else(|| {
        // No explicit price element; fish a currency amount out of the text.
        let text = clean_text(element);
        rules::PRICE_RE
            .find(&text)
            .map(|m| m.as_str().to_string())
    });

    let author = first_text(element, &rules::CARD_AUTHOR);
    let image_url = read_image(element);
    let tag = first_text(element, &rules::CARD_TAG);

    RawCard {
        title,
        price,
        author,
        image_url,
        tag,
    }
}

fn first_text(element: ElementRef<'_>, selectors: &[scraper::Selector]) -> Option<String> {
    for selector in selectors {
        for hit in element.select(selector) {
            let text = clean_text(hit);
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

fn read_image(element: ElementRef<'_>) -> Option<String> {
    for img in element.select(&rules::CARD_IMAGE) {
        let src = img
            .value()
            .attr("src")
            .or_else(|| img.value().attr("data-src"));
        if let Some(src) = src {
            if !src.trim().is_empty() {
                return Some(src.trim().to_string());
            }
        }
    }

    // Lazily-loaded cards paint the cover as a CSS background instead.
    for styled in element.select(&rules::CARD_BG) {
        if let Some(style) = styled.value().attr("style") {
            if let Some(captures) = rules::BACKGROUND_IMAGE_RE.captures(style) {
                return Some(captures[1].to_string());
            }
        }
    }
    None
}

fn is_hidden(element: ElementRef<'_>) -> bool {
    if element.value().attr("hidden").is_some() {
        return true;
    }
    let style = element
        .value()
        .attr("style")
        .unwrap_or("")
        .replace(' ', "");
    style.contains("display:none") || style.contains("width:0") || style.contains("height:0")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card_html(title: &str, author: &str, price: &str) -> String {
        format!(
            r#"<article class="product-card">
                <h3 class="product-card__title">{title}</h3>
                <p class="product-card__author">{author}</p>
                <span class="product-card__price">{price}</span>
                <img src="https://cdn.example.com/{title}.jpg">
            </article>"#
        )
    }

    fn page(cards: &str) -> Html {
        Html::parse_document(&format!("<html><body>{cards}</body></html>"))
    }

    #[test]
    fn test_extract_basic_card() {
        let html = page(&card_html("The Hobbit", "J. R. R. Tolkien", "£4.99"));
        let cards = extract_cards(&html).into_data().unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].title, "The Hobbit");
        assert_eq!(cards[0].author, "J. R. R. Tolkien");
        assert_eq!(cards[0].price, "£4.99");
        assert_eq!(
            cards[0].image_url.as_deref(),
            Some("https://cdn.example.com/The Hobbit.jpg")
        );
    }

    #[test]
    fn test_author_defaults_to_unknown() {
        let html = page(
            r#"<article class="product-card">
                <h3 class="product-card__title">Dune</h3>
                <span class="product-card__price">£5.50</span>
            </article>"#,
        );
        let cards = extract_cards(&html).into_data().unwrap();
        assert_eq!(cards[0].author, "Unknown");
    }

    #[test]
    fn test_price_regex_fallback() {
        let html = page(
            r#"<article class="product-card">
                <h3 class="product-card__title">Dune</h3>
                <p>Our lowest price: £ 3.25 while stocks last</p>
            </article>"#,
        );
        let cards = extract_cards(&html).into_data().unwrap();
        assert_eq!(cards[0].price, "£ 3.25");
    }

    #[test]
    fn test_background_image_fallback() {
        let html = page(
            r#"<article class="product-card">
                <h3 class="product-card__title">Dune</h3>
                <span class="product-card__price">£5.50</span>
                <div class="cover" style="background-image: url('https://cdn.example.com/dune.jpg')"></div>
            </article>"#,
        );
        let cards = extract_cards(&html).into_data().unwrap();
        assert_eq!(
            cards[0].image_url.as_deref(),
            Some("https://cdn.example.com/dune.jpg")
        );
    }

    #[test]
    fn test_card_without_title_and_price_dropped() {
        let html = page(
            r#"<article class="product-card"><p>placeholder tile</p></article>"#,
        );
        assert!(extract_cards(&html).is_empty());
    }

    #[test]
    fn test_partial_outcome_counts_dropped() {
        let mut body = card_html("Dune", "Frank Herbert", "£5.50");
        body.push_str(r#"<article class="product-card"><p>broken tile</p></article>"#);
        let html = page(&body);
        let outcome = extract_cards(&html);
        assert_eq!(outcome.dropped(), 1);
        assert_eq!(outcome.into_data().unwrap().len(), 1);
    }

    #[test]
    fn test_hidden_cards_skipped() {
        let html = page(
            r#"<article class="product-card" style="display: none">
                <h3 class="product-card__title">Ghost</h3>
                <span class="product-card__price">£1.00</span>
            </article>"#,
        );
        assert!(extract_cards(&html).is_empty());
    }

    #[test]
    fn test_dedup_first_occurrence_wins() {
        let mut body = card_html("Dune", "Frank Herbert", "£5.50");
        body.push_str(&card_html("DUNE", "F. Herbert", " £5.50"));
        let html = page(&body);
        let cards = extract_cards(&html).into_data().unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].author, "Frank Herbert");
    }

    #[test]
    fn test_identical_markup_extracts_identically() {
        let html = page(&card_html("Dune", "Frank Herbert", "£5.50"));
        let first = extract_cards(&html).into_data().unwrap();
        let second = extract_cards(&html).into_data().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_fallback_container_selectors() {
        let html = page(
            r#"<li class="product-item">
                <h3>Old Shape</h3>
                <span class="price">£2.00</span>
            </li>"#,
        );
        let cards = extract_cards(&html).into_data().unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].title, "Old Shape");
    }

    #[test]
    fn test_pill_tag_extracted() {
        let html = page(
            r#"<article class="product-card">
                <h3 class="product-card__title">Dune</h3>
                <span class="product-card__price">£5.50</span>
                <span class="pill">Save 20%</span>
            </article>"#,
        );
        let cards = extract_cards(&html).into_data().unwrap();
        assert_eq!(cards[0].tag.as_deref(), Some("Save 20%"));
    }
}
