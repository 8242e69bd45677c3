use thiserror::Error;

/// Errors emitted by the agent-core crate.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Raised when the configuration cannot drive a loop.
    #[error("invalid agent configuration: {0}")]
    InvalidConfig(String),

    /// Raised when building a reasoning client fails.
    #[error(transparent)]
    Reasoning(#[from] ReasoningError),
}

impl AgentError {
    /// Helper for configuration problems.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }
}

/// Failure of a reasoning request. Always terminal for the current run.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReasoningError {
    /// Could not reach the service.
    #[error("reasoning service unreachable: {0}")]
    Transport(String),

    /// Service answered with a non-success status.
    #[error("reasoning service returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body is not an action.
    #[error("could not decode reasoning response: {0}")]
    Decode(String),

    /// No answer within the configured limit.
    #[error("reasoning request timed out after {0} ms")]
    Timeout(u64),
}
