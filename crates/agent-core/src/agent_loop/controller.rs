//! Agent loop controller: drives one instruction through the step machine.
//!
//! Every suspension point (tab backoff, load wait, reasoning call, page
//! injection, speech wait, pacing) is a single awaited signal or timer.

use std::sync::Arc;

use tracing::{debug, info, warn};

use action_primitives::ActionExecutor;
use browser_host::{LoadWait, PageCapability, TabResolver};
use message_router::RouterHandle;
use tabpilot_core_types::{cues, Action, Message, SessionStore};
use tabpilot_voice::VoiceCoordinator;

use super::config::AgentLoopConfig;
use super::types::{RunOutcome, RunReport, RunState};
use crate::reasoning::{ReasoningClient, ReasoningRequest};

pub const CONTINUING_MESSAGE: &str = "Continuing agent...";

/// Collaborators the loop talks to.
#[derive(Clone)]
pub struct AgentPorts {
    pub resolver: TabResolver,
    pub page: Arc<dyn PageCapability>,
    pub reasoning: Arc<dyn ReasoningClient>,
    pub voice: VoiceCoordinator,
    pub router: RouterHandle,
    pub sessions: Arc<SessionStore>,
}

/// Counters kept alongside [`RunState`] for the final report.
#[derive(Debug, Default)]
struct RunTally {
    reasoning_calls: u32,
    executions: u32,
    total_tokens: u64,
}

pub struct AgentLoop {
    config: AgentLoopConfig,
    resolver: TabResolver,
    executor: ActionExecutor,
    reasoning: Arc<dyn ReasoningClient>,
    voice: VoiceCoordinator,
    router: RouterHandle,
    sessions: Arc<SessionStore>,
}

impl AgentLoop {
    pub fn new(config: AgentLoopConfig, ports: AgentPorts) -> Self {
        Self {
            config,
            resolver: ports.resolver,
            executor: ActionExecutor::new(ports.page),
            reasoning: ports.reasoning,
            voice: ports.voice,
            router: ports.router,
            sessions: ports.sessions,
        }
    }

    pub fn config(&self) -> &AgentLoopConfig {
        &self.config
    }

    /// Run `prompt` until an action stops the loop, the step cap is reached,
    /// or the reasoning service fails.
    pub async fn run(&self, prompt: &str) -> RunReport {
        let mut state = RunState::new();
        let mut tally = RunTally::default();
        info!(max_steps = self.config.max_steps, "agent run started");

        while state.steps < self.config.max_steps {
            let tab = self.resolver.resolve_active_tab().await;
            if tab.is_sentinel() {
                debug!(step = state.steps, "no active tab; backing off");
                tokio::time::sleep(self.config.tab_retry_backoff()).await;
                state.steps += 1;
                continue;
            }

            match self.resolver.await_load(&tab, self.config.load_timeout()).await {
                LoadWait::Ready | LoadWait::Loaded => {}
                LoadWait::TimedOut => {
                    warn!(tab_id = %tab.id, "tab did not finish loading in time; capturing anyway")
                }
                LoadWait::HostClosed => {
                    warn!(tab_id = %tab.id, "tab updates stopped; capturing anyway")
                }
            }

            let capture = match self.executor.capture(tab.id).await {
                Ok(page) => page,
                Err(err) => {
                    warn!(tab_id = %tab.id, %err, "page capture failed; treating as unchanged");
                    String::new()
                }
            };

            let request = ReasoningRequest {
                session: self.sessions.get(),
                url: tab.url.clone(),
                prompt: Some(prompt.to_string()),
                page: state.page_delta(capture),
            };
            info!(
                step = state.steps + 1,
                page_sent = request.page.is_some(),
                "requesting next action"
            );

            tally.reasoning_calls += 1;
            let action = match self.reasoning.request_action(&request).await {
                Ok(action) => action,
                Err(err) => {
                    warn!(%err, "reasoning failed; ending run");
                    self.router
                        .send(Message::notify(format!("Error: {err}"), Some(cues::ERROR)));
                    return self.report(RunOutcome::ReasoningFailed, &state, tally, None);
                }
            };

            self.absorb(&action, &mut tally);
            self.narrate(&action).await;

            tally.executions += 1;
            let proceed = match self.executor.execute(tab.id, &action).await {
                Ok(proceed) => proceed,
                Err(err) => {
                    warn!(action = %action.action, %err, "action failed; stopping");
                    false
                }
            };

            if !proceed {
                info!(action = %action.action, "action signalled completion");
                state.last_action = Some(action);
                break;
            }

            tokio::time::sleep(self.config.step_pacing()).await;
            self.router
                .send(Message::notify(CONTINUING_MESSAGE, Some(cues::PROCESS)));
            state.steps += 1;
        }

        let outcome = if state.last_action.is_some() {
            RunOutcome::Completed
        } else {
            RunOutcome::MaxStepsReached
        };
        let message = state.final_message();
        self.speak(&message).await;
        self.router
            .send(Message::notify(format!("[DONE] {message}"), Some(cues::FINISH)));
        self.report(outcome, &state, tally, Some(message))
    }

    fn absorb(&self, action: &Action, tally: &mut RunTally) {
        if self.sessions.adopt(&action.session) {
            debug!("adopted reasoning session");
        }
        if let Some(usage) = action.usage {
            tally.total_tokens += usage.total_tokens;
        }
        match serde_json::to_string_pretty(action) {
            Ok(json) => debug!(action = %json, "received action"),
            Err(err) => debug!(%err, "action not printable"),
        }
    }

    async fn narrate(&self, action: &Action) {
        let narration = action.narration();
        self.router
            .send(Message::notify(narration.clone(), Some(cues::PROCESS)));
        let spoken = if action.intent.trim().is_empty() {
            narration
        } else {
            action.intent.clone()
        };
        self.speak(&spoken).await;
    }

    async fn speak(&self, text: &str) {
        if let Err(err) = self.voice.speak(text).await {
            debug!(%err, "speech did not complete; continuing");
        }
    }

    fn report(
        &self,
        outcome: RunOutcome,
        state: &RunState,
        tally: RunTally,
        final_message: Option<String>,
    ) -> RunReport {
        info!(
            ?outcome,
            steps = state.steps,
            total_tokens = tally.total_tokens,
            "agent run finished"
        );
        RunReport {
            outcome,
            steps: state.steps,
            final_message,
            reasoning_calls: tally.reasoning_calls,
            executions: tally.executions,
            total_tokens: tally.total_tokens,
        }
    }
}
