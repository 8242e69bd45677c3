//! Error types for host capability calls

use thiserror::Error;

use tabpilot_core_types::TabId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HostError {
    /// The tab no longer exists
    #[error("tab {0} is closed")]
    TabClosed(TabId),

    /// Nothing is listening in the target context
    #[error("no listener in target context: {0}")]
    NoListener(String),

    /// Script injection into the page failed
    #[error("script injection failed: {0}")]
    Injection(String),

    /// The host refused to create a playback context
    #[error("playback rejected: {0}")]
    Playback(String),

    /// Host I/O failure (file, socket, devtools pipe)
    #[error("host i/o error: {0}")]
    Io(String),
}
