use serde::{Deserialize, Serialize};

/// Token accounting reported by the reasoning service, when available.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default, alias = "promptTokens")]
    pub prompt_tokens: u64,
    #[serde(default, alias = "completionTokens")]
    pub completion_tokens: u64,
    #[serde(default, alias = "totalTokens")]
    pub total_tokens: u64,
}

/// Next step decided by the reasoning service.
///
/// `action` stays a plain string on the wire; the executor maps it onto the
/// closed set of operation kinds it understands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    #[serde(default)]
    pub intent: String,
    pub action: String,
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub session: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

impl Action {
    pub fn new(
        intent: impl Into<String>,
        action: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            intent: intent.into(),
            action: action.into(),
            target: target.into(),
            ..Self::default()
        }
    }

    /// Builder: attach the session token returned alongside the action.
    pub fn with_session(mut self, session: impl Into<String>) -> Self {
        self.session = session.into();
        self
    }

    /// Line spoken and shown while the action runs: `[action] intent`.
    pub fn narration(&self) -> String {
        format!("[{}] {}", self.action, self.intent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_minimal_response() {
        let action: Action = serde_json::from_str(
            r#"{"intent":"open page","action":"navigate","target":"https://example.com","session":"s-1"}"#,
        )
        .unwrap();
        assert_eq!(action.action, "navigate");
        assert_eq!(action.session, "s-1");
        assert!(action.usage.is_none());
    }

    #[test]
    fn decodes_camel_case_usage() {
        let action: Action = serde_json::from_str(
            r#"{"action":"done","usage":{"promptTokens":10,"completionTokens":5,"totalTokens":15}}"#,
        )
        .unwrap();
        assert_eq!(action.usage.unwrap().total_tokens, 15);
        assert_eq!(action.intent, "");
    }

    #[test]
    fn narration_prefixes_kind() {
        let action = Action::new("find the price", "click", "#price");
        assert_eq!(action.narration(), "[click] find the price");
    }
}
