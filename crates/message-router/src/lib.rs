//! Central message router.
//!
//! Every context (popup, content scripts, playback hosts, the agent loop)
//! sends raw messages to the router through a [`RouterHandle`]. The router
//! validates them, fans a copy out to the active tab and to every subscribed
//! context, then performs the side effect keyed on the message kind.

pub mod client;
pub mod error;
pub mod handle;
pub mod launcher;
pub mod router;

pub use client::PresentationClient;
pub use error::RouterError;
pub use handle::{RouterHandle, RouterInbox};
pub use launcher::{RunHandle, RunLauncher};
pub use router::{MessageRouter, RouterConfig, RouterPorts};
