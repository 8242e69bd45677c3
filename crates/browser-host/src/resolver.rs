use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use tabpilot_core_types::{Envelope, TabId, TabRef, TabStatus, TabUpdate};
use tabpilot_event_bus::{BusError, OneShot};

use crate::errors::HostError;
use crate::ports::{TabHost, TabQuery};

/// Outcome of waiting for a tab to finish loading.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadWait {
    /// Already complete, nothing to wait for.
    Ready,
    /// A matching completion signal arrived.
    Loaded,
    /// The configured limit elapsed first.
    TimedOut,
    /// The host stopped publishing tab updates.
    HostClosed,
}

/// Finds the tab the agent should act on. Never caches: the active tab is
/// queried fresh on every call.
#[derive(Clone)]
pub struct TabResolver {
    host: Arc<dyn TabHost>,
}

impl TabResolver {
    pub fn new(host: Arc<dyn TabHost>) -> Self {
        Self { host }
    }

    pub fn host(&self) -> &Arc<dyn TabHost> {
        &self.host
    }

    /// First active tab of the current normal window, or the sentinel.
    pub async fn resolve_active_tab(&self) -> TabRef {
        match self.host.query_tabs(&TabQuery::active_normal()).await {
            Ok(tabs) => tabs.first().map(TabRef::from).unwrap_or_default(),
            Err(err) => {
                debug!(?err, "tab query failed; treating as no active tab");
                TabRef::sentinel()
            }
        }
    }

    /// Suspend until `tab` reports `complete`. The update subscription is
    /// released as soon as the wait ends, whichever way it ends.
    pub async fn await_load(&self, tab: &TabRef, limit: Option<Duration>) -> LoadWait {
        if tab.is_loaded() {
            return LoadWait::Ready;
        }

        let tab_id = tab.id;
        let waiter = OneShot::new(self.host.subscribe_updates(), move |update: &TabUpdate| {
            update.completed(tab_id)
        });

        // Completion between the query and the subscription would otherwise be lost.
        if let Ok(Some(info)) = self.host.get_tab(tab_id).await {
            if info.status == TabStatus::Complete {
                return LoadWait::Ready;
            }
        }

        debug!(%tab_id, "waiting for tab load");
        let outcome = match waiter.wait_for(limit).await {
            Ok(_) => LoadWait::Loaded,
            Err(BusError::Timeout(_)) => LoadWait::TimedOut,
            Err(BusError::Closed) => LoadWait::HostClosed,
        };
        debug!(%tab_id, ?outcome, "tab load wait finished");
        outcome
    }

    /// Deliver `envelope` to the active tab's content script, if there is one.
    pub async fn post_to_active(&self, envelope: &Envelope) -> Result<Option<TabId>, HostError> {
        let tab = self.resolve_active_tab().await;
        if tab.is_sentinel() {
            return Ok(None);
        }
        self.host.post_to_tab(tab.id, envelope).await?;
        Ok(Some(tab.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SimulatedBrowser;
    use tabpilot_core_types::Message;

    #[tokio::test]
    async fn no_tabs_yields_sentinel() {
        let browser = SimulatedBrowser::new();
        let resolver = TabResolver::new(browser);
        assert!(resolver.resolve_active_tab().await.is_sentinel());
    }

    #[tokio::test]
    async fn resolves_most_recently_activated_tab() {
        let browser = SimulatedBrowser::new();
        browser.open_tab("https://a.test", "a");
        let second = browser.open_tab("https://b.test", "b");

        let resolver = TabResolver::new(browser.clone());
        let tab = resolver.resolve_active_tab().await;
        assert_eq!(tab.id, second);
        assert_eq!(tab.url.as_deref(), Some("https://b.test"));
    }

    #[tokio::test]
    async fn loaded_tab_does_not_wait() {
        let browser = SimulatedBrowser::new();
        browser.open_tab("https://a.test", "a");
        let resolver = TabResolver::new(browser.clone());
        let tab = resolver.resolve_active_tab().await;
        assert_eq!(resolver.await_load(&tab, None).await, LoadWait::Ready);
    }

    #[tokio::test]
    async fn waits_for_matching_completion_only() {
        let browser = SimulatedBrowser::new();
        let other = browser.open_loading_tab("https://other.test", "");
        let id = browser.open_loading_tab("https://a.test", "a");
        let resolver = TabResolver::new(browser.clone());
        let tab = resolver.resolve_active_tab().await;
        assert_eq!(tab.id, id);

        let signaller = browser.clone();
        tokio::spawn(async move {
            tokio::task::yield_now().await;
            signaller.set_status(other, TabStatus::Complete);
            signaller.set_status(id, TabStatus::Complete);
        });

        assert_eq!(resolver.await_load(&tab, None).await, LoadWait::Loaded);
        assert_eq!(browser.update_subscribers(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn bounded_wait_times_out() {
        let browser = SimulatedBrowser::new();
        browser.open_loading_tab("https://slow.test", "");
        let resolver = TabResolver::new(browser.clone());
        let tab = resolver.resolve_active_tab().await;
        let outcome = resolver
            .await_load(&tab, Some(Duration::from_secs(2)))
            .await;
        assert_eq!(outcome, LoadWait::TimedOut);
        assert_eq!(browser.update_subscribers(), 0);
    }

    #[tokio::test]
    async fn post_to_active_reports_missing_listener() {
        let browser = SimulatedBrowser::new();
        let id = browser.open_tab("https://a.test", "a");
        browser.mute(id);
        let resolver = TabResolver::new(browser.clone());
        let envelope = Envelope::new("test", Message::audio("finish"));
        assert!(resolver.post_to_active(&envelope).await.is_err());
    }
}
