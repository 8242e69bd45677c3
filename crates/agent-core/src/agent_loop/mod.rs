//! Step loop: resolve the tab, wait for it, capture, ask for an action,
//! narrate it, execute it, then continue or stop.

mod config;
mod controller;
mod types;

pub use config::{AgentLoopConfig, RunPolicy};
pub use controller::{AgentLoop, AgentPorts};
pub use types::{RunOutcome, RunReport, RunState, MAX_STEPS_MESSAGE};
