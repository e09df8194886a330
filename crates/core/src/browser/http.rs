//! HTTP-backed engine implementation.
//!
//! Fetches pages as static HTML with a cookie-persisting reqwest client.
//! Selector waits are answered from the current snapshot (a static document
//! does not mutate), and interactive clicks are reported as unavailable;
//! callers that click are best-effort by contract and tolerate this.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::config::SiteConfig;

use super::{
    selector_state_on, BrowserEngine, BrowserSession, EngineError, PageSnapshot, SelectorState,
    WaitUntil,
};

/// HTTP-fetch engine over reqwest.
pub struct HttpEngine {
    client: Client,
    navigation_timeout: Duration,
}

impl HttpEngine {
    /// Create a new engine from the site configuration.
    pub fn new(site: &SiteConfig) -> Result<Self, EngineError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(site.request_timeout_secs as u64))
            .cookie_store(true)
            .user_agent(site.user_agent.clone())
            .build()
            .map_err(|e| EngineError::Navigation(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            navigation_timeout: Duration::from_secs(site.navigation_timeout_secs as u64),
        })
    }
}

#[async_trait]
impl BrowserEngine for HttpEngine {
    async fn navigate(
        &self,
        session: &mut BrowserSession,
        url: &str,
        _wait: WaitUntil,
    ) -> Result<PageSnapshot, EngineError> {
        if !session.try_spend() {
            return Err(EngineError::BudgetExhausted);
        }

        debug!(url, "Fetching page");
        let response = tokio::time::timeout(self.navigation_timeout, self.client.get(url).send())
            .await
            .map_err(|_| EngineError::Timeout)?
            .map_err(|e| {
                if e.is_timeout() {
                    EngineError::Timeout
                } else {
                    EngineError::Navigation(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(EngineError::Navigation(format!(
                "HTTP {} for {}",
                response.status(),
                url
            )));
        }

        let final_url = response.url().to_string();
        let html = response
            .text()
            .await
            .map_err(|e| EngineError::Navigation(e.to_string()))?;

        let snapshot = PageSnapshot {
            url: final_url,
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
        // Static documents never change after the fetch; answer immediately.
        match session.current() {
            Some(snapshot) => selector_state_on(&snapshot.html, selector, state),
            None => Ok(state == SelectorState::Hidden),
        }
    }

    async fn try_click(
        &self,
        _session: &mut BrowserSession,
        selector: &str,
    ) -> Result<bool, EngineError> {
        // No script runtime behind a static fetch; the control stays inert.
        debug!(selector, "Click unavailable on static fetch engine");
        Ok(false)
    }
}
