//! Dry-run host implementations used by the CLI.
//!
//! [`FilePageHost`] exposes a single loaded tab whose page is read from disk on
//! every capture. [`ConsolePlayback`] prints cues and speech to stderr and
//! reports speech completion back over the router.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use tokio::sync::broadcast;
use tracing::{debug, info};

use browser_host::{
    HostError, PageCapability, PageOperation, PlaybackHost, PlaybackRequest, TabHost, TabQuery,
};
use message_router::RouterHandle;
use tabpilot_core_types::{
    Envelope, Message, TabId, TabInfo, TabStatus, TabUpdate, TtsKind, WindowType,
};

pub const DRY_RUN_TAB: TabId = TabId(1);

#[derive(Debug, Clone)]
pub enum PageSource {
    File(PathBuf),
    Inline(String),
}

pub struct FilePageHost {
    tab: RwLock<TabInfo>,
    source: PageSource,
    updates: broadcast::Sender<TabUpdate>,
    operations: Mutex<Vec<PageOperation>>,
}

impl FilePageHost {
    pub fn new(source: PageSource, url: Option<String>) -> Arc<Self> {
        let url = url.or_else(|| match &source {
            PageSource::File(path) => Some(format!("file://{}", path.display())),
            PageSource::Inline(_) => None,
        });
        let (updates, _) = broadcast::channel(16);
        Arc::new(Self {
            tab: RwLock::new(TabInfo {
                id: DRY_RUN_TAB,
                window_id: 1,
                url,
                status: TabStatus::Complete,
                active: true,
                window_type: WindowType::Normal,
                in_current_window: true,
            }),
            source,
            updates,
            operations: Mutex::new(Vec::new()),
        })
    }

    pub fn operations(&self) -> Vec<PageOperation> {
        self.operations.lock().clone()
    }

    fn check_tab(&self, id: TabId) -> Result<(), HostError> {
        if id == DRY_RUN_TAB {
            Ok(())
        } else {
            Err(HostError::TabClosed(id))
        }
    }
}

#[async_trait]
impl TabHost for FilePageHost {
    async fn query_tabs(&self, query: &TabQuery) -> Result<Vec<TabInfo>, HostError> {
        let tab = self.tab.read().clone();
        Ok(if query.matches(&tab) { vec![tab] } else { Vec::new() })
    }

    async fn get_tab(&self, id: TabId) -> Result<Option<TabInfo>, HostError> {
        Ok((id == DRY_RUN_TAB).then(|| self.tab.read().clone()))
    }

    fn subscribe_updates(&self) -> broadcast::Receiver<TabUpdate> {
        self.updates.subscribe()
    }

    async fn post_to_tab(&self, id: TabId, envelope: &Envelope) -> Result<(), HostError> {
        self.check_tab(id)?;
        debug!(origin = %envelope.origin, kind = envelope.message.kind(), "content script received message");
        Ok(())
    }
}

#[async_trait]
impl PageCapability for FilePageHost {
    async fn capture_page(&self, tab: TabId) -> Result<String, HostError> {
        self.check_tab(tab)?;
        match &self.source {
            PageSource::File(path) => tokio::fs::read_to_string(path)
                .await
                .map_err(|err| HostError::Io(format!("{}: {err}", path.display()))),
            PageSource::Inline(page) => Ok(page.clone()),
        }
    }

    async fn execute_action(
        &self,
        tab: TabId,
        operation: &PageOperation,
    ) -> Result<bool, HostError> {
        self.check_tab(tab)?;
        info!(?operation, "dry run page operation");
        if let PageOperation::Navigate { url } = operation {
            self.tab.write().url = Some(url.clone());
            let update = TabUpdate {
                tab_id: tab,
                status: Some(TabStatus::Complete),
                url: Some(url.clone()),
            };
            if let Err(err) = self.updates.send(update) {
                debug!(%err, "no tab update listeners");
            }
        }
        self.operations.lock().push(operation.clone());
        Ok(true)
    }
}

/// Playback host that writes to stderr and finishes speech immediately.
pub struct ConsolePlayback {
    handle: RouterHandle,
    quiet: bool,
}

impl ConsolePlayback {
    pub fn new(handle: RouterHandle, quiet: bool) -> Arc<Self> {
        Arc::new(Self { handle, quiet })
    }
}

#[async_trait]
impl PlaybackHost for ConsolePlayback {
    async fn spawn(&self, request: PlaybackRequest) -> Result<(), HostError> {
        match request {
            PlaybackRequest::Cue(cue) => {
                if !self.quiet {
                    eprintln!("(cue) {cue}");
                }
            }
            PlaybackRequest::Speech(text) => {
                if !self.quiet {
                    eprintln!("(speech) {text}");
                }
                self.handle.send(Message::tts(TtsKind::Ended));
            }
        }
        Ok(())
    }
}
