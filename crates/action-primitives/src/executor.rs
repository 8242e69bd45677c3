use std::sync::Arc;

use browser_host::PageCapability;
use tabpilot_core_types::{Action, TabId};
use tracing::{debug, info};

use crate::errors::ActionError;
use crate::types::ActionKind;

/// Runs actions through the page capability.
#[derive(Clone)]
pub struct ActionExecutor {
    page: Arc<dyn PageCapability>,
}

impl ActionExecutor {
    pub fn new(page: Arc<dyn PageCapability>) -> Self {
        Self { page }
    }

    /// Markdown of the visible content of `tab`.
    pub async fn capture(&self, tab: TabId) -> Result<String, ActionError> {
        Ok(self.page.capture_page(tab).await?)
    }

    /// Apply `action` to `tab`.
    ///
    /// `Ok(true)` means keep stepping. `Ok(false)` means the action completed
    /// the task or the page reported no further progress.
    pub async fn execute(&self, tab: TabId, action: &Action) -> Result<bool, ActionError> {
        let kind: ActionKind = action.action.parse()?;
        let Some(operation) = kind.operation(&action.target)? else {
            debug!(%tab, %kind, "completion action; page untouched");
            return Ok(false);
        };

        info!(%tab, %kind, target = %action.target, "executing page operation");
        let proceed = self.page.execute_action(tab, &operation).await?;
        debug!(%tab, %kind, proceed, "page operation finished");
        Ok(proceed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use browser_host::{HostError, PageOperation, SimulatedBrowser};

    #[tokio::test]
    async fn click_reaches_page() {
        let browser = SimulatedBrowser::new();
        let tab = browser.open_tab("https://shop.test", "# Shop");
        let executor = ActionExecutor::new(browser.clone());

        let proceed = executor
            .execute(tab, &Action::new("open pricing", "click", "Pricing"))
            .await
            .unwrap();
        assert!(proceed);
        assert_eq!(
            browser.operations(),
            vec![(
                tab,
                PageOperation::Click {
                    target: "Pricing".to_string()
                }
            )]
        );
    }

    #[tokio::test]
    async fn done_stops_without_page_call() {
        let browser = SimulatedBrowser::new();
        let tab = browser.open_tab("https://shop.test", "# Shop");
        let executor = ActionExecutor::new(browser.clone());

        let proceed = executor
            .execute(tab, &Action::new("answer", "done", "Paris"))
            .await
            .unwrap();
        assert!(!proceed);
        assert!(browser.operations().is_empty());
    }

    #[tokio::test]
    async fn page_can_signal_no_progress() {
        let browser = SimulatedBrowser::new();
        let tab = browser.open_tab("https://shop.test", "# Shop");
        browser.queue_outcomes([Ok(false)]);
        let executor = ActionExecutor::new(browser.clone());

        let proceed = executor
            .execute(tab, &Action::new("scroll", "scroll", "down"))
            .await
            .unwrap();
        assert!(!proceed);
    }

    #[tokio::test]
    async fn unknown_kind_is_local_error() {
        let browser = SimulatedBrowser::new();
        let tab = browser.open_tab("https://shop.test", "# Shop");
        let executor = ActionExecutor::new(browser.clone());

        let err = executor
            .execute(tab, &Action::new("hover", "hover", "menu"))
            .await
            .unwrap_err();
        assert!(err.is_local());
        assert!(browser.operations().is_empty());
    }

    #[tokio::test]
    async fn page_failure_is_propagated() {
        let browser = SimulatedBrowser::new();
        let tab = browser.open_tab("https://shop.test", "# Shop");
        browser.queue_outcomes([Err(HostError::Injection("csp".to_string()))]);
        let executor = ActionExecutor::new(browser.clone());

        let err = executor
            .execute(tab, &Action::new("go back", "back", ""))
            .await
            .unwrap_err();
        assert_eq!(err, ActionError::Page(HostError::Injection("csp".to_string())));
    }
}
