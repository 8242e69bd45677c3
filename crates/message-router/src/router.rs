use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use browser_host::{PlaybackHost, PlaybackRequest, TabResolver};
use tabpilot_core_types::{parse_message, Envelope, Inbound, Message, SessionStore, TtsKind};
use tabpilot_event_bus::EventBus;

use crate::handle::{RouterHandle, RouterInbox};
use crate::launcher::{RunHandle, RunLauncher};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Identifier stamped on messages relayed to content scripts.
    pub origin: String,

    /// Capacity of the fan-out bus.
    pub bus_capacity: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            origin: "tabpilot".to_string(),
            bus_capacity: 256,
        }
    }
}

/// Collaborators the router drives.
#[derive(Clone)]
pub struct RouterPorts {
    pub resolver: TabResolver,
    pub playback: Arc<dyn PlaybackHost>,
    pub sessions: Arc<SessionStore>,
    pub launcher: Arc<dyn RunLauncher>,
}

pub struct MessageRouter {
    config: RouterConfig,
    handle: RouterHandle,
    ports: RouterPorts,
    runs: Mutex<Vec<RunHandle>>,
}

impl MessageRouter {
    pub fn new(config: RouterConfig, handle: RouterHandle, ports: RouterPorts) -> Arc<Self> {
        Arc::new(Self {
            config,
            handle,
            ports,
            runs: Mutex::new(Vec::new()),
        })
    }

    pub fn handle(&self) -> &RouterHandle {
        &self.handle
    }

    /// Route everything arriving on `inbox` until every sender is gone.
    pub fn spawn(self: &Arc<Self>, mut inbox: RouterInbox) -> JoinHandle<()> {
        let router = Arc::clone(self);
        tokio::spawn(async move {
            while let Some(value) = inbox.recv().await {
                router.route(value).await;
            }
            debug!("router inbox closed");
        })
    }

    /// Route whatever is queued right now, including follow-ups queued while
    /// routing. Returns the number of values routed.
    pub async fn drain(&self, inbox: &mut RouterInbox) -> usize {
        let mut routed = 0;
        while let Some(value) = inbox.try_recv() {
            self.route(value).await;
            routed += 1;
        }
        routed
    }

    /// Validate, fan out and dispatch one raw value. Never fails.
    pub async fn route(&self, value: Value) {
        let message = match parse_message(&value) {
            Inbound::Message(message) => message,
            Inbound::Untyped => {
                debug!("dropping untyped message");
                return;
            }
            Inbound::Unknown(kind) => {
                warn!(%kind, "undefined message type; dropped");
                return;
            }
            Inbound::Malformed(err) => {
                warn!(%err, "dropping malformed message");
                return;
            }
        };

        self.forward(&message).await;
        self.dispatch(message).await;
    }

    async fn forward(&self, message: &Message) {
        let envelope = Envelope::new(self.config.origin.clone(), message.clone());
        if let Err(err) = self.ports.resolver.post_to_active(&envelope).await {
            debug!(kind = message.kind(), %err, "active tab did not take message");
        }

        if let Err(err) = self.handle.bus().publish(message.clone()).await {
            debug!(kind = message.kind(), %err, "no context listening");
        }
    }

    async fn dispatch(&self, message: Message) {
        match message {
            Message::Prompt { prompt, reset } => {
                if reset == Some(true) {
                    self.ports.sessions.clear();
                }
                let run = self.ports.launcher.launch(prompt);
                info!(run_id = %run.id(), "agent run launched");
                let mut runs = self.runs.lock();
                runs.retain(|run| !run.is_finished());
                runs.push(run);
            }
            Message::ResetSession => {
                self.ports.sessions.clear();
                info!("session reset");
            }
            Message::Notify { audio, .. } => {
                if let Some(audio) = audio {
                    self.handle.send(Message::audio(audio));
                }
            }
            Message::Audio { audio } => {
                self.play(PlaybackRequest::Cue(audio)).await;
            }
            Message::Tts {
                kind: TtsKind::Text,
                text,
            } => {
                let played = match text {
                    Some(text) => self.play(PlaybackRequest::Speech(text)).await,
                    None => {
                        debug!("speech request without text");
                        false
                    }
                };
                // No host will report completion, so release any waiting speaker.
                if !played {
                    self.handle.send(Message::tts(TtsKind::Ended));
                }
            }
            // Stopping and completion belong to the playback side.
            Message::Tts { .. } => {}
        }
    }

    /// Returns whether a playback host took the request.
    async fn play(&self, request: PlaybackRequest) -> bool {
        match self.ports.playback.spawn(request).await {
            Ok(()) => true,
            Err(err) => {
                debug!(%err, "playback host rejected request");
                false
            }
        }
    }

    /// Runs launched by this router that have not finished yet.
    pub fn active_runs(&self) -> usize {
        self.runs.lock().iter().filter(|run| !run.is_finished()).count()
    }
}
