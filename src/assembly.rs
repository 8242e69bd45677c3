//! Wires hosts, router, voice and agent loop into one running system.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::info;

use agent_core::{
    AgentError, AgentLoop, AgentPorts, AgentRunner, HttpReasoningClient, MockReasoningClient,
    ReasoningClient, ReasoningConfig,
};
use browser_host::{PageCapability, PlaybackHost, TabHost, TabResolver};
use message_router::{MessageRouter, RouterHandle, RouterInbox, RouterPorts};
use tabpilot_core_types::SessionStore;
use tabpilot_voice::VoiceCoordinator;

use crate::config::Config;

pub struct Assembly {
    pub handle: RouterHandle,
    pub router: Arc<MessageRouter>,
    pub runner: AgentRunner,
    pub sessions: Arc<SessionStore>,
    inbox: Option<RouterInbox>,
}

impl Assembly {
    /// Build every component. The router is not running until [`Assembly::start`].
    pub fn build<H, P>(config: &Config, host: Arc<H>, playback: P) -> Result<Self, AgentError>
    where
        H: TabHost + PageCapability + 'static,
        P: FnOnce(RouterHandle) -> Arc<dyn PlaybackHost>,
    {
        let (handle, inbox) = RouterHandle::channel(config.router.bus_capacity);
        let sessions = Arc::new(SessionStore::new());
        let resolver = TabResolver::new(host.clone());

        let agent = AgentLoop::new(
            config.agent.clone(),
            AgentPorts {
                resolver: resolver.clone(),
                page: host,
                reasoning: reasoning_client(&config.reasoning)?,
                voice: VoiceCoordinator::new(handle.clone(), config.voice.clone()),
                router: handle.clone(),
                sessions: sessions.clone(),
            },
        );
        let runner = AgentRunner::new(agent);

        let router = MessageRouter::new(
            config.router.clone(),
            handle.clone(),
            RouterPorts {
                resolver,
                playback: playback(handle.clone()),
                sessions: sessions.clone(),
                launcher: Arc::new(runner.clone()),
            },
        );

        Ok(Self {
            handle,
            router,
            runner,
            sessions,
            inbox: Some(inbox),
        })
    }

    /// Start routing. Returns `None` if the router was already started.
    pub fn start(&mut self) -> Option<JoinHandle<()>> {
        let inbox = self.inbox.take()?;
        info!(policy = ?self.runner.policy(), "router started");
        Some(self.router.spawn(inbox))
    }
}

pub fn reasoning_client(config: &ReasoningConfig) -> Result<Arc<dyn ReasoningClient>, AgentError> {
    if config.mock {
        info!("using mock reasoning client");
        return Ok(Arc::new(MockReasoningClient::default()));
    }
    info!(endpoint = %config.endpoint, "using HTTP reasoning client");
    Ok(Arc::new(HttpReasoningClient::new(config)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hosts::{ConsolePlayback, FilePageHost, PageSource};
    use agent_core::{AgentLoopConfig, RunOutcome};

    #[tokio::test]
    async fn mock_run_completes_on_inline_page() {
        let mut config = Config::default();
        config.reasoning.mock = true;
        config.agent = AgentLoopConfig::immediate();

        let host = FilePageHost::new(PageSource::Inline("# Weather\nSunny".into()), None);
        let mut assembly = Assembly::build(&config, host.clone(), |handle| {
            ConsolePlayback::new(handle, true) as Arc<dyn PlaybackHost>
        })
        .unwrap();
        let router = assembly.start().unwrap();
        assert!(assembly.start().is_none());

        let report = assembly.runner.run("weather today").await;
        assert_eq!(report.outcome, RunOutcome::Completed);
        assert_eq!(report.final_message.as_deref(), Some("weather today: see # Weather"));
        assert_eq!(host.operations().len(), 2);
        assert_eq!(report.total_tokens, 45);
        assert_eq!(
            assembly.sessions.get().as_deref(),
            Some(MockReasoningClient::SESSION)
        );
        router.abort();
    }
}
