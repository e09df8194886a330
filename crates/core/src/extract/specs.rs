//! Specification and condition extraction from product detail pages.

use std::collections::{BTreeMap, HashSet};

use scraper::Html;

use super::{clean_text, rules, text_lines};

/// Extract the specification mapping from a detail page.
///
/// Three sources feed the map; later sources only fill keys not already set:
/// (a) labeled table rows, (b) `dt`/`dd` pairs, (c) full-page-text
/// heuristics. All twelve required keys are present afterwards, possibly
/// empty.
pub fn extract_specifications(html: &Html) -> BTreeMap<String, String> {
    let mut specs = BTreeMap::new();

    collect_table_rows(html, &mut specs);
    collect_definition_lists(html, &mut specs);
    collect_text_heuristics(html, &mut specs);
    fill_required_keys(&mut specs);

    specs
}

/// Ensure every required specification key is present, possibly empty.
pub fn fill_required_keys(specs: &mut BTreeMap<String, String>) {
    for key in rules::REQUIRED_SPEC_KEYS {
        specs.entry((*key).to_string()).or_default();
    }
}

/// Extract the dedicated condition label, if the page carries one.
pub fn extract_condition(html: &Html) -> Option<String> {
    rules::CONDITION_LABEL
        .iter()
        .flat_map(|s| html.select(s))
        .map(clean_text)
        .find(|t| !t.is_empty())
}

fn collect_table_rows(html: &Html, specs: &mut BTreeMap<String, String>) {
    let mut seen = HashSet::new();
    for selector in rules::SPEC_ROWS.iter() {
        for row in html.select(selector) {
            if !seen.insert(row.id()) {
                continue;
            }
            let cells: Vec<_> = row.select(&rules::SPEC_LABEL_CELL).collect();
            if cells.len() < 2 {
                continue;
            }
            let label = clean_text(cells[0]);
            let value = clean_text(cells[cells.len() - 1]);
            if value.is_empty() {
                continue;
            }
            if let Some(key) = canonical_key(&label) {
                insert_spec(specs, key, value);
            }
        }
    }
}

fn collect_definition_lists(html: &Html, specs: &mut BTreeMap<String, String>) {
    let terms = html.select(&rules::SPEC_DT);
    let values = html.select(&rules::SPEC_DD);
    for (dt, dd) in terms.zip(values) {
        let label = clean_text(dt);
        let value = clean_text(dd);
        if value.is_empty() {
            continue;
        }
        if let Some(key) = canonical_key(&label) {
            insert_spec(specs, key, value);
        }
    }
}

fn collect_text_heuristics(html: &Html, specs: &mut BTreeMap<String, String>) {
    let text = text_lines(html.root_element());

    for line in text.lines() {
        if let Some((label, value)) = line.split_once(':') {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            if let Some(key) = canonical_key(label) {
                insert_spec(specs, key, value.to_string());
            }
        }
    }

    if !specs.contains_key("ISBN 13") {
        if let Some(captures) = rules::ISBN13_RE.captures(&text) {
            let digits: String = captures[1].chars().filter(char::is_ascii_digit).collect();
            if digits.len() == 13 {
                specs.insert("ISBN 13".to_string(), digits);
            }
        }
    }

    if !specs.contains_key("ISBN 10") {
        if let Some(captures) = rules::ISBN10_RE.captures(&text) {
            let digits: String = captures[1].chars().filter(char::is_ascii_digit).collect();
            if digits.len() == 10 {
                specs.insert("ISBN 10".to_string(), digits);
            }
        }
    }

    if !specs.contains_key("Year published") {
        if let Some(captures) = rules::YEAR_RE.captures(&text) {
            specs.insert("Year published".to_string(), captures[1].to_string());
        }
    }

    if !specs.contains_key("Number of pages") {
        if let Some(captures) = rules::PAGES_RE.captures(&text) {
            specs.insert("Number of pages".to_string(), captures[1].to_string());
        }
    }

    if !specs.contains_key("Binding Type") {
        // Longest names first so "Mass Market Paperback" beats "Paperback".
        for binding in rules::BINDING_TYPES {
            if text.contains(binding) {
                specs.insert("Binding Type".to_string(), (*binding).to_string());
                break;
            }
        }
    }
}

fn insert_spec(specs: &mut BTreeMap<String, String>, key: String, value: String) {
    // ISBNs are stored digits-only; a malformed ISBN-10 is dropped so the
    // regex fallback gets a chance at the rest of the page.
    let value = match key.as_str() {
        "ISBN 13" => value.chars().filter(char::is_ascii_digit).collect(),
        "ISBN 10" => {
            let digits: String = value.chars().filter(char::is_ascii_digit).collect();
            if digits.len() != 10 {
                return;
            }
            digits
        }
        _ => value,
    };
    specs.entry(key).or_insert(value);
}

fn canonical_key(label: &str) -> Option<String> {
    let normalized = label.trim().trim_end_matches(':').trim().to_lowercase();
    rules::TEXT_LABELS
        .iter()
        .find(|(candidate, _)| *candidate == normalized)
        .map(|(_, key)| (*key).to_string())
}
