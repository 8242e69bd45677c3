//! Shared primitives for the tabpilot agent workspace.
//!
//! Every execution context (router, agent loop, presentation clients, playback
//! hosts) talks in terms of the types defined here.

mod action;
mod error;
mod message;
mod session;
mod tab;

pub mod cues;

pub use action::{Action, Usage};
pub use error::CoreError;
pub use message::{parse_message, Envelope, Inbound, Message, TtsKind};
pub use session::SessionStore;
pub use tab::{RunId, TabId, TabInfo, TabRef, TabStatus, TabUpdate, WindowType};
