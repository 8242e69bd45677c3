use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use tabpilot_core_types::{Action, Usage};

use crate::errors::ReasoningError;

/// Context sent to the reasoning service for one step.
///
/// Absent fields are left out of the request body entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasoningRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
}

/// Remote service that decides the next action.
///
/// Implementations do not retry; a failure ends the current run.
#[async_trait]
pub trait ReasoningClient: Send + Sync {
    async fn request_action(&self, request: &ReasoningRequest) -> Result<Action, ReasoningError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReasoningConfig {
    /// Address the request JSON is POSTed to.
    pub endpoint: String,
    /// Per-call timeout.
    pub timeout_ms: u64,
    /// Use the offline mock client instead of the network.
    pub mock: bool,
}

impl Default for ReasoningConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:3000/prompt".to_string(),
            timeout_ms: 60_000,
            mock: false,
        }
    }
}

/// Deterministic reasoning client for dry runs and tests.
///
/// Scrolls for a fixed number of calls, then answers with the first line of
/// the last page it was sent.
pub struct MockReasoningClient {
    scroll_steps: u32,
    state: Mutex<MockState>,
}

#[derive(Default)]
struct MockState {
    calls: u32,
    last_page: Option<String>,
}

impl MockReasoningClient {
    pub const SESSION: &'static str = "mock-session";

    pub fn new(scroll_steps: u32) -> Self {
        Self {
            scroll_steps,
            state: Mutex::new(MockState::default()),
        }
    }

    pub fn calls(&self) -> u32 {
        self.state.lock().calls
    }
}

impl Default for MockReasoningClient {
    fn default() -> Self {
        Self::new(2)
    }
}

#[async_trait]
impl ReasoningClient for MockReasoningClient {
    async fn request_action(&self, request: &ReasoningRequest) -> Result<Action, ReasoningError> {
        let (call, page) = {
            let mut state = self.state.lock();
            state.calls += 1;
            if let Some(page) = &request.page {
                state.last_page = Some(page.clone());
            }
            (state.calls, state.last_page.clone())
        };

        let action = if call <= self.scroll_steps {
            Action::new("Look further down the page", "scroll", "down")
        } else {
            let prompt = request.prompt.as_deref().unwrap_or_default();
            let seen = page
                .as_deref()
                .and_then(|page| page.lines().find(|line| !line.trim().is_empty()))
                .map(str::trim)
                .unwrap_or("the current page");
            Action::new(
                "Answer from what is on the page",
                "answer",
                format!("{prompt}: see {seen}"),
            )
        };

        Ok(Action {
            usage: Some(Usage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            }),
            ..action.with_session(Self::SESSION)
        })
    }
}
