use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{info, info_span, Instrument};

use message_router::{RunHandle, RunLauncher};
use tabpilot_core_types::RunId;

use crate::agent_loop::{AgentLoop, RunPolicy, RunReport};

/// Launches agent runs for the router and for direct callers.
///
/// Under [`RunPolicy::Serialize`] every run holds the run slot for its whole
/// lifetime, so at most one loop touches the tab and the session at a time.
#[derive(Clone)]
pub struct AgentRunner {
    agent: Arc<AgentLoop>,
    slot: Arc<Mutex<()>>,
    policy: RunPolicy,
}

impl AgentRunner {
    pub fn new(agent: AgentLoop) -> Self {
        let policy = agent.config().run_policy;
        Self {
            agent: Arc::new(agent),
            slot: Arc::new(Mutex::new(())),
            policy,
        }
    }

    pub fn policy(&self) -> RunPolicy {
        self.policy
    }

    /// Run `prompt` to completion on the caller's task.
    pub async fn run(&self, prompt: &str) -> RunReport {
        let run_id = RunId::new();
        Self::run_in_slot(
            self.agent.clone(),
            self.slot.clone(),
            self.policy,
            prompt.to_string(),
        )
        .instrument(info_span!("agent_run", run_id = %run_id.0))
        .await
    }

    async fn run_in_slot(
        agent: Arc<AgentLoop>,
        slot: Arc<Mutex<()>>,
        policy: RunPolicy,
        prompt: String,
    ) -> RunReport {
        let _guard = match policy {
            RunPolicy::Serialize => Some(slot.lock_owned().await),
            RunPolicy::Concurrent => None,
        };
        info!(%prompt, "run slot acquired");
        agent.run(&prompt).await
    }
}

impl RunLauncher for AgentRunner {
    fn launch(&self, prompt: String) -> RunHandle {
        let run_id = RunId::new();
        let span = info_span!("agent_run", run_id = %run_id.0);
        let agent = self.agent.clone();
        let slot = self.slot.clone();
        let policy = self.policy;
        let task = tokio::spawn(
            async move {
                let report = Self::run_in_slot(agent, slot, policy, prompt).await;
                info!(outcome = ?report.outcome, steps = report.steps, "launched run finished");
            }
            .instrument(span),
        );
        RunHandle::new(run_id, task)
    }
}
