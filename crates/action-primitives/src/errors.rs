//! Error types for action execution

use browser_host::HostError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ActionError {
    /// The reasoning service asked for an operation kind we do not implement
    #[error("unsupported action kind: {0}")]
    UnsupportedAction(String),

    /// The action's target cannot be turned into an operation
    #[error("invalid target for {kind}: {reason}")]
    InvalidTarget { kind: String, reason: String },

    /// The page capability failed while running the operation
    #[error("page operation failed: {0}")]
    Page(#[from] HostError),
}

impl ActionError {
    pub fn invalid_target(kind: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidTarget {
            kind: kind.into(),
            reason: reason.into(),
        }
    }

    /// Whether the failure happened before anything reached the page.
    pub fn is_local(&self) -> bool {
        !matches!(self, ActionError::Page(_))
    }
}
