//! In-memory browser keeping track of tabs, page content and script calls.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::debug;

use tabpilot_core_types::{Envelope, TabId, TabInfo, TabStatus, TabUpdate, WindowType};

use crate::errors::HostError;
use crate::ports::{PageCapability, PageOperation, TabHost, TabQuery};

#[derive(Debug)]
struct SimTab {
    info: TabInfo,
    page: String,
    captures: VecDeque<String>,
    inbox: Vec<Envelope>,
    listening: bool,
}

/// Concurrent registry of simulated tabs.
pub struct SimulatedBrowser {
    tabs: DashMap<TabId, SimTab>,
    next_id: AtomicU64,
    updates: broadcast::Sender<TabUpdate>,
    operations: Mutex<Vec<(TabId, PageOperation)>>,
    outcomes: Mutex<VecDeque<Result<bool, HostError>>>,
    captures: AtomicUsize,
}

impl SimulatedBrowser {
    pub fn new() -> Arc<Self> {
        let (updates, _) = broadcast::channel(64);
        Arc::new(Self {
            tabs: DashMap::new(),
            next_id: AtomicU64::new(1),
            updates,
            operations: Mutex::new(Vec::new()),
            outcomes: Mutex::new(VecDeque::new()),
            captures: AtomicUsize::new(0),
        })
    }

    /// Open a loaded tab and make it the active one.
    pub fn open_tab(&self, url: &str, page: &str) -> TabId {
        self.insert_tab(url, page, TabStatus::Complete)
    }

    /// Open a still-loading tab and make it the active one.
    pub fn open_loading_tab(&self, url: &str, page: &str) -> TabId {
        self.insert_tab(url, page, TabStatus::Loading)
    }

    fn insert_tab(&self, url: &str, page: &str, status: TabStatus) -> TabId {
        let id = TabId(self.next_id.fetch_add(1, Ordering::Relaxed));
        for mut entry in self.tabs.iter_mut() {
            entry.info.active = false;
        }
        let info = TabInfo {
            id,
            window_id: 1,
            url: Some(url.to_string()),
            status,
            active: true,
            window_type: WindowType::Normal,
            in_current_window: true,
        };
        self.tabs.insert(
            id,
            SimTab {
                info,
                page: page.to_string(),
                captures: VecDeque::new(),
                inbox: Vec::new(),
                listening: true,
            },
        );
        id
    }

    pub fn close_tab(&self, id: TabId) {
        self.tabs.remove(&id);
    }

    /// Change a tab's load status and raise the matching update signal.
    pub fn set_status(&self, id: TabId, status: TabStatus) {
        let url = match self.tabs.get_mut(&id) {
            Some(mut entry) => {
                entry.info.status = status;
                entry.info.url.clone()
            }
            None => return,
        };
        let _ = self.updates.send(TabUpdate {
            tab_id: id,
            status: Some(status),
            url,
        });
    }

    pub fn set_window_type(&self, id: TabId, window_type: WindowType) {
        if let Some(mut entry) = self.tabs.get_mut(&id) {
            entry.info.window_type = window_type;
        }
    }

    pub fn set_page(&self, id: TabId, page: &str) {
        if let Some(mut entry) = self.tabs.get_mut(&id) {
            entry.page = page.to_string();
        }
    }

    /// Captures returned (in order) before falling back to the current page.
    pub fn queue_captures<I, S>(&self, id: TabId, captures: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Some(mut entry) = self.tabs.get_mut(&id) {
            entry.captures.extend(captures.into_iter().map(Into::into));
        }
    }

    /// Results handed out by `execute_action` (in order) before defaulting to `true`.
    pub fn queue_outcomes<I>(&self, outcomes: I)
    where
        I: IntoIterator<Item = Result<bool, HostError>>,
    {
        self.outcomes.lock().extend(outcomes);
    }

    /// Stop the tab's content script from listening.
    pub fn mute(&self, id: TabId) {
        if let Some(mut entry) = self.tabs.get_mut(&id) {
            entry.listening = false;
        }
    }

    pub fn posted(&self, id: TabId) -> Vec<Envelope> {
        self.tabs
            .get(&id)
            .map(|entry| entry.inbox.clone())
            .unwrap_or_default()
    }

    pub fn operations(&self) -> Vec<(TabId, PageOperation)> {
        self.operations.lock().clone()
    }

    pub fn capture_count(&self) -> usize {
        self.captures.load(Ordering::Relaxed)
    }

    pub fn update_subscribers(&self) -> usize {
        self.updates.receiver_count()
    }
}

#[async_trait]
impl TabHost for SimulatedBrowser {
    async fn query_tabs(&self, query: &TabQuery) -> Result<Vec<TabInfo>, HostError> {
        let mut tabs: Vec<TabInfo> = self
            .tabs
            .iter()
            .filter(|entry| query.matches(&entry.info))
            .map(|entry| entry.info.clone())
            .collect();
        tabs.sort_by_key(|tab| tab.id.0);
        Ok(tabs)
    }

    async fn get_tab(&self, id: TabId) -> Result<Option<TabInfo>, HostError> {
        Ok(self.tabs.get(&id).map(|entry| entry.info.clone()))
    }

    fn subscribe_updates(&self) -> broadcast::Receiver<TabUpdate> {
        self.updates.subscribe()
    }

    async fn post_to_tab(&self, id: TabId, envelope: &Envelope) -> Result<(), HostError> {
        let mut entry = self.tabs.get_mut(&id).ok_or(HostError::TabClosed(id))?;
        if !entry.listening {
            return Err(HostError::NoListener(format!("tab {id}")));
        }
        entry.inbox.push(envelope.clone());
        Ok(())
    }
}

#[async_trait]
impl PageCapability for SimulatedBrowser {
    async fn capture_page(&self, tab: TabId) -> Result<String, HostError> {
        let mut entry = self.tabs.get_mut(&tab).ok_or(HostError::TabClosed(tab))?;
        self.captures.fetch_add(1, Ordering::Relaxed);
        let page = match entry.captures.pop_front() {
            Some(capture) => capture,
            None => entry.page.clone(),
        };
        Ok(page)
    }

    async fn execute_action(
        &self,
        tab: TabId,
        operation: &PageOperation,
    ) -> Result<bool, HostError> {
        {
            let mut entry = self.tabs.get_mut(&tab).ok_or(HostError::TabClosed(tab))?;
            if let PageOperation::Navigate { url } = operation {
                entry.info.url = Some(url.clone());
            }
        }
        debug!(%tab, ?operation, "simulated page operation");
        self.operations.lock().push((tab, operation.clone()));
        self.outcomes.lock().pop_front().unwrap_or(Ok(true))
    }
}
