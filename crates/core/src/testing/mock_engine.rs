//! Mock browser engine for testing.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::browser::{
    selector_state_on, BrowserEngine, BrowserSession, EngineError, PageSnapshot, SelectorState,
    WaitUntil,
};
use crate::extract::rules;

use super::fixtures;

/// Mock implementation of the browser engine.
///
/// Provides controllable behavior for testing:
/// - Serve scripted HTML per URL
/// - Track navigations and clicks for assertions
/// - Simulate consent-banner dismissal and navigation failures
///
/// # Example
///
/// ```rust,ignore
/// use bookmirror_core::testing::{fixtures, MockEngine};
///
/// let engine = MockEngine::new();
/// engine.add_page(
///     "https://shop.test/collections/fiction-books",
///     fixtures::listing_page(&[("Dune", "Frank Herbert", "£5.50")]),
/// ).await;
///
/// // ... run a crawl against the engine ...
///
/// assert_eq!(engine.navigation_count().await, 1);
/// ```
pub struct MockEngine {
    /// Scripted pages by exact URL.
    pages: RwLock<HashMap<String, String>>,
    /// Recorded navigation URLs, in order.
    navigations: RwLock<Vec<String>>,
    /// Recorded click selectors, in order.
    clicks: RwLock<Vec<String>>,
    /// If set, the next navigation fails with this error.
    next_error: RwLock<Option<EngineError>>,
    /// Whether clicking a consent control removes the banner.
    dismiss_banner: RwLock<bool>,
}

impl Default for MockEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEngine {
    /// Create a new mock engine with no pages.
    pub fn new() -> Self {
        Self {
            pages: RwLock::new(HashMap::new()),
            navigations: RwLock::new(Vec::new()),
            clicks: RwLock::new(Vec::new()),
            next_error: RwLock::new(None),
            dismiss_banner: RwLock::new(true),
        }
    }

    /// Script a page for an exact URL.
    pub async fn add_page(&self, url: impl Into<String>, html: impl Into<String>) {
        self.pages.write().await.insert(url.into(), html.into());
    }

    /// Recorded navigation URLs.
    pub async fn recorded_navigations(&self) -> Vec<String> {
        self.navigations.read().await.clone()
    }

    /// Number of navigations performed.
    pub async fn navigation_count(&self) -> usize {
        self.navigations.read().await.len()
    }

    /// Recorded click selectors.
    pub async fn recorded_clicks(&self) -> Vec<String> {
        self.clicks.read().await.clone()
    }

    /// Configure the next navigation to fail with the given error.
    pub async fn set_next_error(&self, error: EngineError) {
        *self.next_error.write().await = Some(error);
    }

    /// Make consent-control clicks strip the banner from the current page
    /// (the default).
    pub async fn dismiss_banner_on_click(&self) {
        *self.dismiss_banner.write().await = true;
    }

    /// Make consent-control clicks inert, like the static HTTP engine.
    pub async fn keep_banner_on_click(&self) {
        *self.dismiss_banner.write().await = false;
    }

    async fn take_error(&self) -> Option<EngineError> {
        self.next_error.write().await.take()
    }
}

#[async_trait]
impl BrowserEngine for MockEngine {
    async fn navigate(
        &self,
        session: &mut BrowserSession,
        url: &str,
        _wait: WaitUntil,
    ) -> Result<PageSnapshot, EngineError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }
        if !session.try_spend() {
            return Err(EngineError::BudgetExhausted);
        }

        self.navigations.write().await.push(url.to_string());

        let html = self
            .pages
            .read()
            .await
            .get(url)
            .cloned()
            .ok_or_else(|| EngineError::Navigation(format!("No scripted page for {url}")))?;

        let snapshot = PageSnapshot {
            url: url.to_string(),
            html,
        };
        session.set_current(snapshot.clone());
        Ok(snapshot)
    }

    async fn wait_for(
        &self,
        session: &mut BrowserSession,
        selector: &str,
        state: SelectorState,
        _timeout_ms: u64,
    ) -> Result<bool, EngineError> {
        match session.current() {
            Some(snapshot) => selector_state_on(&snapshot.html, selector, state),
            None => Ok(state == SelectorState::Hidden),
        }
    }

    async fn try_click(
        &self,
        session: &mut BrowserSession,
        selector: &str,
    ) -> Result<bool, EngineError> {
        self.clicks.write().await.push(selector.to_string());

        let Some(snapshot) = session.current() else {
            return Ok(false);
        };
        if !selector_state_on(&snapshot.html, selector, SelectorState::Visible)? {
            return Ok(false);
        }

        let is_consent_control =
            selector == rules::CONSENT_REJECT || selector == rules::CONSENT_ACCEPT;
        if is_consent_control && *self.dismiss_banner.read().await {
            let stripped = snapshot.html.replace(fixtures::consent_banner_html(), "");
            session.replace_current_html(stripped);
        }

        Ok(true)
    }
}
