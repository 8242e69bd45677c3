use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use tabpilot_core_types::Action;

use crate::errors::{AgentError, ReasoningError};
use crate::reasoning::{ReasoningClient, ReasoningConfig, ReasoningRequest};

/// Reasoning client that POSTs the step context as JSON.
pub struct HttpReasoningClient {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpReasoningClient {
    pub fn new(config: &ReasoningConfig) -> Result<Self, AgentError> {
        if config.endpoint.trim().is_empty() {
            return Err(AgentError::invalid_config("reasoning endpoint is empty"));
        }
        let timeout = Duration::from_millis(config.timeout_ms);
        let client = Client::builder().timeout(timeout).build().map_err(|err| {
            AgentError::invalid_config(format!("failed to build HTTP client: {err}"))
        })?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn map_send_error(&self, err: reqwest::Error) -> ReasoningError {
        if err.is_timeout() {
            ReasoningError::Timeout(self.timeout.as_millis() as u64)
        } else {
            ReasoningError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl ReasoningClient for HttpReasoningClient {
    async fn request_action(&self, request: &ReasoningRequest) -> Result<Action, ReasoningError> {
        debug!(
            endpoint = %self.endpoint,
            has_session = request.session.is_some(),
            has_page = request.page.is_some(),
            "requesting next action"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|err| self.map_send_error(err))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<response unavailable>".to_string());
            return Err(ReasoningError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|err| self.map_send_error(err))?;
        serde_json::from_str::<Action>(&body).map_err(|err| ReasoningError::Decode(err.to_string()))
    }
}
