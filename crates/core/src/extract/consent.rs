//! Cookie-consent dismissal.

use tracing::debug;

use crate::browser::{BrowserEngine, BrowserSession, SelectorState};

use super::rules;

/// Dismiss a cookie-consent overlay if one is present.
///
/// Prefers "reject all", falls back to "accept all", then waits (bounded)
/// for the banner to disappear. This routine exists to unblock the page,
/// not to guarantee anything: it never returns an error, it only logs and
/// lets the caller proceed.
pub async fn dismiss_cookie_banner(
    engine: &dyn BrowserEngine,
    session: &mut BrowserSession,
    wait_ms: u64,
) {
    let present = match engine
        .wait_for(session, rules::CONSENT_BANNER, SelectorState::Visible, 1_000)
        .await
    {
        Ok(present) => present,
        Err(e) => {
            debug!(error = %e, "Consent banner probe failed");
            return;
        }
    };
    if !present {
        return;
    }

    let rejected = engine
        .try_click(session, rules::CONSENT_REJECT)
        .await
        .unwrap_or_else(|e| {
            debug!(error = %e, "Reject-all click failed");
            false
        });

    let dismissed = if rejected {
        true
    } else {
        engine
            .try_click(session, rules::CONSENT_ACCEPT)
            .await
            .unwrap_or_else(|e| {
                debug!(error = %e, "Accept-all click failed");
                false
            })
    };

    if !dismissed {
        debug!("Consent banner present but no dismiss control found");
        return;
    }

    match engine
        .wait_for(session, rules::CONSENT_BANNER, SelectorState::Hidden, wait_ms)
        .await
    {
        Ok(true) => {}
        Ok(false) => debug!("Consent banner still visible after dismissal"),
        Err(e) => debug!(error = %e, "Consent banner hide wait failed"),
    }
}
