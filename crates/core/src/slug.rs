//! Public slug to canonical URL fragment resolution.
//!
//! Callers address categories by short public slugs ("fiction-books",
//! "crime-mystery"); internally categories are identified by canonical
//! collection URLs. The mapping is a fixed table assembled once at process
//! start; unknown slugs pass through unchanged.

use std::collections::HashMap;

use once_cell::sync::Lazy;

/// URL fragment of the fiction root collection.
pub const FICTION_FRAGMENT: &str = "fiction-books";

/// URL fragment of the non-fiction root collection. Contains
/// [`FICTION_FRAGMENT`] as a substring, hence the exclusion clause below.
pub const NON_FICTION_FRAGMENT: &str = "non-fiction-books";

/// Top-level root slugs.
const ROOT_SLUGS: &[(&str, &str)] = &[
    ("fiction-books", FICTION_FRAGMENT),
    ("fiction", FICTION_FRAGMENT),
    ("non-fiction-books", NON_FICTION_FRAGMENT),
    ("non-fiction", NON_FICTION_FRAGMENT),
    ("childrens-books", "childrens-books"),
    ("children", "childrens-books"),
    ("rare-books", "rare-books"),
    ("rare", "rare-books"),
];

/// Genre shelf slugs.
const SHELF_SLUGS: &[(&str, &str)] = &[
    ("crime-mystery", "crime-mystery-books"),
    ("science-fiction-fantasy", "science-fiction-fantasy-horror-books"),
    ("romance", "romance-books"),
    ("biography", "biography-true-stories-books"),
    ("history", "history-books"),
    ("cookery", "food-drink-books"),
    ("health-wellbeing", "health-wellbeing-books"),
    ("kids-fiction", "childrens-fiction-books"),
    ("picture-books", "childrens-picture-books"),
];

static SLUG_TABLE: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    ROOT_SLUGS.iter().chain(SHELF_SLUGS).copied().collect()
});

/// Resolve a public slug to the canonical URL fragment used for category
/// lookup. Unknown slugs are returned unchanged. Pure and deterministic.
pub fn resolve_slug(slug: &str) -> &str {
    SLUG_TABLE.get(slug).copied().unwrap_or(slug)
}

/// A category lookup clause: the URL must contain `fragment` and, when set,
/// must NOT contain `exclude`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryMatch {
    pub fragment: String,
    pub exclude: Option<String>,
}

impl CategoryMatch {
    /// Build the lookup clause for a public slug.
    ///
    /// The fiction root fragment is a substring of the non-fiction fragment,
    /// so matching it by containment alone would absorb every non-fiction
    /// category; the exclusion keeps the two roots apart.
    pub fn for_slug(slug: &str) -> Self {
        let fragment = resolve_slug(slug);
        let exclude = if fragment == FICTION_FRAGMENT {
            Some(NON_FICTION_FRAGMENT.to_string())
        } else {
            None
        };
        Self {
            fragment: fragment.to_string(),
            exclude,
        }
    }

    /// Whether a candidate URL satisfies this clause.
    pub fn matches(&self, url: &str) -> bool {
        if !url.contains(&self.fragment) {
            return false;
        }
        match &self.exclude {
            Some(excluded) => !url.contains(excluded.as_str()),
            None => true,
        }
    }
}
