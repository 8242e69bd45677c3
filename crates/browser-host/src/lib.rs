//! Host capability ports for the tabpilot agent.
//!
//! The agent never touches a browser directly. It goes through three ports:
//! - [`TabHost`]: tab queries, tab-update signals and content-script delivery
//! - [`PageCapability`]: page capture and page-side operations
//! - [`PlaybackHost`]: ephemeral audio/speech playback hosts
//!
//! [`SimulatedBrowser`] implements the first two over an in-memory registry.

pub mod errors;
pub mod ports;
mod resolver;
mod simulated;

pub use errors::HostError;
pub use ports::{
    PageCapability, PageOperation, PlaybackHost, PlaybackRequest, ScrollDirection, TabHost,
    TabQuery,
};
pub use resolver::{LoadWait, TabResolver};
pub use simulated::SimulatedBrowser;
