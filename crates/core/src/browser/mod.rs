//! Browser automation boundary.
//!
//! Crawl components drive an engine through this trait: navigate, inspect
//! the current document, wait for selectors, click. The production engine
//! fetches static HTML over HTTP; tests script snapshots through
//! [`crate::testing::MockEngine`].

mod http;
mod types;

pub use http::HttpEngine;
pub use types::{BrowserSession, EngineError, PageSnapshot, SelectorState, WaitUntil};

use async_trait::async_trait;
use scraper::{Html, Selector};

/// Trait for the page automation engine.
#[async_trait]
pub trait BrowserEngine: Send + Sync {
    /// Navigate the session to `url` and snapshot the resulting document.
    ///
    /// Counts against the session's request budget; an exhausted budget is
    /// `EngineError::BudgetExhausted`.
    async fn navigate(
        &self,
        session: &mut BrowserSession,
        url: &str,
        wait: WaitUntil,
    ) -> Result<PageSnapshot, EngineError>;

    /// Wait up to `timeout_ms` for `selector` to reach `state` on the
    /// current page. Returns whether the state was reached.
    async fn wait_for(
        &self,
        session: &mut BrowserSession,
        selector: &str,
        state: SelectorState,
        timeout_ms: u64,
    ) -> Result<bool, EngineError>;

    /// Best-effort click. Returns whether a matching element was found and
    /// the click dispatched.
    async fn try_click(
        &self,
        session: &mut BrowserSession,
        selector: &str,
    ) -> Result<bool, EngineError>;
}

/// Evaluate a selector state against a static document.
///
/// Presence counts as visible unless the element hints `display:none` or the
/// `hidden` attribute.
pub(crate) fn selector_state_on(
    html: &str,
    selector: &str,
    state: SelectorState,
) -> Result<bool, EngineError> {
    let parsed = Selector::parse(selector)
        .map_err(|e| EngineError::Selector(format!("{selector}: {e}")))?;
    let document = Html::parse_document(html);
    let visible = document.select(&parsed).any(|el| {
        let style = el.value().attr("style").unwrap_or("");
        !style.replace(' ', "").contains("display:none") && el.value().attr("hidden").is_none()
    });

    Ok(match state {
        SelectorState::Visible => visible,
        SelectorState::Hidden => !visible,
    })
}
