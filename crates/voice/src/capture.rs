use tracing::{debug, warn};

use message_router::PresentationClient;
use tabpilot_core_types::cues;

use crate::transcript::TranscriptAssembler;

/// Events raised by a speech recognizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureEvent {
    AudioStart,
    /// Current interim results for the utterance, oldest first.
    Results(Vec<String>),
    AudioEnd,
    /// Recognizer error code, e.g. `not-allowed`, `no-speech`.
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    Listening,
    Draft(String),
    Submitted(String),
    /// Utterance ended without any recognized text.
    Empty,
    /// Microphone permission must be granted before listening again.
    PermissionRequired,
    Failed(String),
}

/// Turns recognizer events into bus traffic: listening cues while capturing,
/// and a prompt submission when the utterance ends.
pub struct CaptureSession {
    client: PresentationClient,
    transcript: TranscriptAssembler,
    listening: bool,
}

impl CaptureSession {
    pub fn new(client: PresentationClient) -> Self {
        Self {
            client,
            transcript: TranscriptAssembler::new(),
            listening: false,
        }
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    pub fn handle(&mut self, event: CaptureEvent) -> CaptureOutcome {
        match event {
            CaptureEvent::AudioStart => {
                self.listening = true;
                self.client
                    .notify("Listening to microphone", Some(cues::LISTEN));
                CaptureOutcome::Listening
            }
            CaptureEvent::Results(results) => {
                CaptureOutcome::Draft(self.transcript.update(&results).to_string())
            }
            CaptureEvent::AudioEnd => {
                self.listening = false;
                self.client.notify("Finished listening", Some(cues::FINISH));
                match self.transcript.finish() {
                    Some(prompt) => {
                        self.client.submit_prompt(&prompt);
                        CaptureOutcome::Submitted(prompt)
                    }
                    None => {
                        debug!("utterance ended without text; nothing submitted");
                        CaptureOutcome::Empty
                    }
                }
            }
            CaptureEvent::Error(code) => {
                self.listening = false;
                if code == "not-allowed" {
                    return CaptureOutcome::PermissionRequired;
                }
                warn!(%code, "speech recognition error");
                self.client.notify(
                    &format!("Speech recognition error: {code}"),
                    Some(cues::ERROR),
                );
                CaptureOutcome::Failed(code)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use message_router::{RouterHandle, RouterInbox};
    use tabpilot_core_types::{parse_message, Inbound, Message};

    fn sent(inbox: &mut RouterInbox) -> Vec<Message> {
        let mut out = Vec::new();
        while let Some(value) = inbox.try_recv() {
            if let Inbound::Message(message) = parse_message(&value) {
                out.push(message);
            }
        }
        out
    }

    fn session() -> (CaptureSession, RouterInbox) {
        let (handle, inbox) = RouterHandle::channel(8);
        (CaptureSession::new(PresentationClient::new(handle)), inbox)
    }

    #[test]
    fn utterance_becomes_prompt() {
        let (mut session, mut inbox) = session();
        assert_eq!(session.handle(CaptureEvent::AudioStart), CaptureOutcome::Listening);
        assert!(session.is_listening());
        session.handle(CaptureEvent::Results(vec!["find".into()]));
        session.handle(CaptureEvent::Results(vec!["find".into(), " the price".into()]));
        assert_eq!(
            session.handle(CaptureEvent::AudioEnd),
            CaptureOutcome::Submitted("find the price".to_string())
        );

        assert_eq!(
            sent(&mut inbox),
            vec![
                Message::notify("Listening to microphone", Some(cues::LISTEN)),
                Message::notify("Finished listening", Some(cues::FINISH)),
                Message::notify("Running agent", Some(cues::NEXT_STEP)),
                Message::prompt("find the price"),
            ]
        );
    }

    #[test]
    fn silent_utterance_submits_nothing() {
        let (mut session, mut inbox) = session();
        session.handle(CaptureEvent::AudioStart);
        assert_eq!(session.handle(CaptureEvent::AudioEnd), CaptureOutcome::Empty);
        assert!(!sent(&mut inbox)
            .iter()
            .any(|message| matches!(message, Message::Prompt { .. })));
    }

    #[test]
    fn permission_error_is_silent() {
        let (mut session, mut inbox) = session();
        assert_eq!(
            session.handle(CaptureEvent::Error("not-allowed".into())),
            CaptureOutcome::PermissionRequired
        );
        assert!(sent(&mut inbox).is_empty());
    }

    #[test]
    fn other_errors_are_announced() {
        let (mut session, mut inbox) = session();
        session.handle(CaptureEvent::Error("no-speech".into()));
        assert_eq!(
            sent(&mut inbox),
            vec![Message::notify(
                "Speech recognition error: no-speech",
                Some(cues::ERROR)
            )]
        );
    }
}
