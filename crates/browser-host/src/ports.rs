use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use tabpilot_core_types::{Envelope, TabId, TabInfo, TabUpdate, WindowType};

use crate::errors::HostError;

/// Filter for [`TabHost::query_tabs`]. `None` fields match anything.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TabQuery {
    pub active: Option<bool>,
    pub current_window: Option<bool>,
    pub window_type: Option<WindowType>,
}

impl TabQuery {
    /// The active tab of the current, normal window.
    pub fn active_normal() -> Self {
        Self {
            active: Some(true),
            current_window: Some(true),
            window_type: Some(WindowType::Normal),
        }
    }

    pub fn matches(&self, tab: &TabInfo) -> bool {
        self.active.map_or(true, |active| tab.active == active)
            && self
                .current_window
                .map_or(true, |current| tab.in_current_window == current)
            && self
                .window_type
                .map_or(true, |window_type| tab.window_type == window_type)
    }
}

#[async_trait]
pub trait TabHost: Send + Sync {
    /// Tabs matching `query`, in host order.
    async fn query_tabs(&self, query: &TabQuery) -> Result<Vec<TabInfo>, HostError>;

    async fn get_tab(&self, id: TabId) -> Result<Option<TabInfo>, HostError>;

    /// Tab-update signals raised after this call.
    fn subscribe_updates(&self) -> broadcast::Receiver<TabUpdate>;

    /// Deliver a message to the tab's content-script context.
    async fn post_to_tab(&self, id: TabId, envelope: &Envelope) -> Result<(), HostError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollDirection {
    Up,
    Down,
}

/// Operation run inside the page's isolated script context.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PageOperation {
    Navigate { url: String },
    Click { target: String },
    Type { selector: Option<String>, text: String },
    Scroll { direction: ScrollDirection },
    Back,
}

#[async_trait]
pub trait PageCapability: Send + Sync {
    /// Markdown rendering of the page's visible content.
    async fn capture_page(&self, tab: TabId) -> Result<String, HostError>;

    /// Run `operation` in the page. `true` means the page moved on and the
    /// task can keep stepping.
    async fn execute_action(&self, tab: TabId, operation: &PageOperation)
        -> Result<bool, HostError>;
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PlaybackRequest {
    /// Short named cue (`process`, `error`, `finish`, ...).
    Cue(String),
    /// Text to synthesize.
    Speech(String),
}

/// Creates a fresh playback context per request. Completion of speech is
/// reported back over the message bus, never through the return value.
#[async_trait]
pub trait PlaybackHost: Send + Sync {
    async fn spawn(&self, request: PlaybackRequest) -> Result<(), HostError>;
}
