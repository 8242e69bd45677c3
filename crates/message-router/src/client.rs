use tokio::sync::broadcast;

use tabpilot_core_types::{cues, Message, TtsKind};

use crate::handle::RouterHandle;

/// Presentation-side view of the bus: the operations a popup offers.
#[derive(Clone)]
pub struct PresentationClient {
    handle: RouterHandle,
}

impl PresentationClient {
    pub fn new(handle: RouterHandle) -> Self {
        Self { handle }
    }

    /// Announce the run, then hand the prompt to the router.
    pub fn submit_prompt(&self, prompt: &str) {
        self.notify("Running agent", Some(cues::NEXT_STEP));
        self.handle.send(Message::prompt(prompt));
    }

    pub fn reset_session(&self) {
        self.handle.send(Message::ResetSession);
    }

    pub fn stop_speech(&self) {
        self.handle.send(Message::tts(TtsKind::Stop));
    }

    pub fn notify(&self, message: &str, audio: Option<&str>) {
        self.handle.send(Message::notify(message, audio));
    }

    /// Notifications, cues and speech events for display.
    pub fn subscribe(&self) -> broadcast::Receiver<Message> {
        self.handle.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabpilot_core_types::{parse_message, Inbound};

    fn drain(inbox: &mut crate::RouterInbox) -> Vec<Message> {
        let mut out = Vec::new();
        while let Some(value) = inbox.try_recv() {
            if let Inbound::Message(message) = parse_message(&value) {
                out.push(message);
            }
        }
        out
    }

    #[test]
    fn submit_announces_before_prompt() {
        let (handle, mut inbox) = RouterHandle::channel(8);
        let client = PresentationClient::new(handle);
        client.submit_prompt("find the price");

        assert_eq!(
            drain(&mut inbox),
            vec![
                Message::notify("Running agent", Some(cues::NEXT_STEP)),
                Message::prompt("find the price"),
            ]
        );
    }

    #[test]
    fn stop_and_reset_are_plain_messages() {
        let (handle, mut inbox) = RouterHandle::channel(8);
        let client = PresentationClient::new(handle);
        client.stop_speech();
        client.reset_session();

        assert_eq!(
            drain(&mut inbox),
            vec![Message::tts(TtsKind::Stop), Message::ResetSession]
        );
    }
}
