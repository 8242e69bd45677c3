use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Host-assigned tab identifier. `0` is never a real tab.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct TabId(pub u64);

impl TabId {
    pub const NONE: TabId = TabId(0);

    pub fn is_none(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TabStatus {
    #[default]
    Unloaded,
    Loading,
    Complete,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowType {
    #[default]
    Normal,
    Popup,
    Panel,
    App,
    Devtools,
}

/// Everything the host reports about a tab.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabInfo {
    pub id: TabId,
    pub window_id: u64,
    pub url: Option<String>,
    pub status: TabStatus,
    pub active: bool,
    pub window_type: WindowType,
    pub in_current_window: bool,
}

/// Result of active tab resolution. Absence is the sentinel with an empty id.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabRef {
    pub id: TabId,
    pub url: Option<String>,
    pub status: TabStatus,
}

impl TabRef {
    pub fn sentinel() -> Self {
        Self::default()
    }

    pub fn is_sentinel(&self) -> bool {
        self.id.is_none()
    }

    pub fn is_loaded(&self) -> bool {
        self.status == TabStatus::Complete
    }
}

impl From<&TabInfo> for TabRef {
    fn from(info: &TabInfo) -> Self {
        Self {
            id: info.id,
            url: info.url.clone(),
            status: info.status,
        }
    }
}

/// Tab-update signal raised by the host.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabUpdate {
    pub tab_id: TabId,
    pub status: Option<TabStatus>,
    pub url: Option<String>,
}

impl TabUpdate {
    pub fn completed(&self, tab_id: TabId) -> bool {
        self.tab_id == tab_id && self.status == Some(TabStatus::Complete)
    }
}

/// Identifier of one agent loop invocation.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct RunId(pub String);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
