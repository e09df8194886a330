//! Collapsible content section extraction.

use std::collections::HashSet;

use scraper::Html;

use super::{clean_text, rules, text_lines};

/// One collapsible section on a product page, e.g. "Summary" or "Reviews".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccordionSection {
    pub heading: String,
    /// Panel text, one line per text node.
    pub body: String,
}

/// Extract every collapsible section with its heading and panel text.
pub fn extract_accordion_sections(html: &Html) -> Vec<AccordionSection> {
    let mut seen = HashSet::new();
    let mut sections = Vec::new();

    for selector in rules::ACCORDION_SECTIONS.iter() {
        for element in html.select(selector) {
            if !seen.insert(element.id()) {
                continue;
            }

            let heading = rules::ACCORDION_HEADING
                .iter()
                .flat_map(|s| element.select(s))
                .map(clean_text)
                .find(|t| !t.is_empty())
                .unwrap_or_default();

            let body = rules::ACCORDION_PANEL
                .iter()
                .flat_map(|s| element.select(s))
                .map(text_lines)
                .find(|t| !t.is_empty())
                .unwrap_or_else(|| {
                    // No recognizable panel wrapper; take the section text
                    // minus the heading line.
                    let all = text_lines(element);
                    all.lines()
                        .filter(|line| line.trim() != heading)
                        .collect::<Vec<_>>()
                        .join("\n")
                });

            sections.push(AccordionSection { heading, body });
        }
    }

    sections
}
