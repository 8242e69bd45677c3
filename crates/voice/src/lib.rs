//! Voice side of the agent: narration through ephemeral playback hosts and
//! the speech-to-text front end that turns an utterance into a prompt.

mod capture;
mod coordinator;
mod transcript;

pub use capture::{CaptureEvent, CaptureOutcome, CaptureSession};
pub use coordinator::{VoiceConfig, VoiceCoordinator, VoiceError};
pub use transcript::TranscriptAssembler;
