use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use message_router::RouterHandle;
use tabpilot_core_types::{Message, TtsKind};
use tabpilot_event_bus::BusError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// Upper bound on waiting for a playback host to report completion.
    /// `None` waits until the signal arrives.
    pub speech_timeout_ms: Option<u64>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VoiceError {
    #[error("no speech completion within {0:?}")]
    Timeout(Duration),
    #[error("message bus closed while waiting for speech")]
    BusClosed,
}

impl From<BusError> for VoiceError {
    fn from(err: BusError) -> Self {
        match err {
            BusError::Timeout(limit) => VoiceError::Timeout(limit),
            BusError::Closed => VoiceError::BusClosed,
        }
    }
}

/// Issues speech requests and waits for the playback side to finish them.
#[derive(Clone)]
pub struct VoiceCoordinator {
    handle: RouterHandle,
    config: VoiceConfig,
}

impl VoiceCoordinator {
    pub fn new(handle: RouterHandle, config: VoiceConfig) -> Self {
        Self { handle, config }
    }

    /// Speak `text` and resolve once a non-`text` TTS signal is observed.
    /// Returns the kind that ended the wait (`ended` or `stop`).
    pub async fn speak(&self, text: &str) -> Result<TtsKind, VoiceError> {
        // Registered before the request goes out so a fast completion is seen.
        let waiter = self.handle.once(|message| {
            matches!(message, Message::Tts { kind, .. } if *kind != TtsKind::Text)
        });
        self.handle.send(Message::speak(text));

        let limit = self.config.speech_timeout_ms.map(Duration::from_millis);
        let signal = waiter.wait_for(limit).await?;
        let kind = match signal {
            Message::Tts { kind, .. } => kind,
            _ => TtsKind::Ended,
        };
        debug!(?kind, "speech finished");
        Ok(kind)
    }

    pub fn stop(&self) {
        self.handle.send(Message::tts(TtsKind::Stop));
    }
}
