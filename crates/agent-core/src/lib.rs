//! Agent core: the step loop that drives one user instruction to completion.
//!
//! Provides the loop controller, the reasoning client seam and the runner that
//! launches loops on behalf of the message router.

pub mod agent_loop;
pub mod errors;
pub mod http;
pub mod reasoning;
pub mod runner;

pub use agent_loop::{AgentLoop, AgentLoopConfig, AgentPorts, RunOutcome, RunPolicy, RunReport, RunState};
pub use errors::{AgentError, ReasoningError};
pub use http::HttpReasoningClient;
pub use reasoning::{MockReasoningClient, ReasoningClient, ReasoningConfig, ReasoningRequest};
pub use runner::AgentRunner;
