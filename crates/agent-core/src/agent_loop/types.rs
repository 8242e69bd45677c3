//! State and results of a single agent run.

use serde::{Deserialize, Serialize};

use tabpilot_core_types::Action;

/// Message reported when the loop runs out of steps without a final action.
pub const MAX_STEPS_MESSAGE: &str = "Max steps reached";

/// Mutable state for one loop invocation. Dropped when the run ends.
#[derive(Debug, Clone, Default)]
pub struct RunState {
    /// Iterations consumed, including tab retries.
    pub steps: u32,
    /// Most recent page capture that was sent to the reasoning service.
    pub last_page: String,
    /// Action that stopped the loop, if any.
    pub last_action: Option<Action>,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the page to send, or `None` when it matches the previous capture.
    pub fn page_delta(&mut self, capture: String) -> Option<String> {
        if capture.is_empty() || capture == self.last_page {
            return None;
        }
        self.last_page = capture.clone();
        Some(capture)
    }

    /// Final message for the terminal report.
    pub fn final_message(&self) -> String {
        self.last_action
            .as_ref()
            .map(|action| action.target.clone())
            .unwrap_or_else(|| MAX_STEPS_MESSAGE.to_string())
    }
}

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// An executed action asked to stop.
    Completed,
    /// The step cap was reached.
    MaxStepsReached,
    /// The reasoning service failed; no final report was given.
    ReasoningFailed,
}

/// Summary returned once a run has finished.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub steps: u32,
    /// Text of the `[DONE]` report, absent when reasoning failed.
    pub final_message: Option<String>,
    pub reasoning_calls: u32,
    pub executions: u32,
    pub total_tokens: u64,
}

impl RunReport {
    pub fn is_completed(&self) -> bool {
        self.outcome == RunOutcome::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_capture_is_always_sent() {
        let mut state = RunState::new();
        assert_eq!(state.page_delta("# Pricing".into()), Some("# Pricing".into()));
        assert_eq!(state.last_page, "# Pricing");
    }

    #[test]
    fn identical_capture_is_omitted() {
        let mut state = RunState::new();
        state.page_delta("# Pricing".into());
        assert_eq!(state.page_delta("# Pricing".into()), None);
        assert_eq!(state.page_delta("# Pricing v2".into()), Some("# Pricing v2".into()));
    }

    #[test]
    fn empty_capture_counts_as_unchanged() {
        let mut state = RunState::new();
        state.page_delta("page".into());
        assert_eq!(state.page_delta(String::new()), None);
        assert_eq!(state.last_page, "page");
    }

    #[test]
    fn final_message_falls_back_to_cap() {
        let mut state = RunState::new();
        assert_eq!(state.final_message(), MAX_STEPS_MESSAGE);
        state.last_action = Some(Action::new("answer", "answer", "Paris"));
        assert_eq!(state.final_message(), "Paris");
    }
}
