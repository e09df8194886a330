//! Shared heuristic extraction over page snapshots.
//!
//! Selector lists and patterns live in [`rules`] as data; the functions here
//! apply them to parsed documents. Everything is exercisable against fixture
//! markup, no live engine required.

pub mod cards;
pub mod consent;
mod outcome;
pub mod rules;
pub mod sections;
pub mod specs;

pub use cards::{extract_cards, extract_cards_in, ProductCard, RawCard};
pub use consent::dismiss_cookie_banner;
pub use outcome::Extraction;
pub use sections::{extract_accordion_sections, AccordionSection};
pub use specs::{extract_condition, extract_specifications, fill_required_keys};

use scraper::ElementRef;

/// Element text with whitespace collapsed to single spaces.
pub(crate) fn clean_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(|t| t.split_whitespace())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Element text with one line per non-empty text node, preserving the
/// line structure panels and spec lists rely on.
pub(crate) fn text_lines(el: ElementRef<'_>) -> String {
    el.text()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
