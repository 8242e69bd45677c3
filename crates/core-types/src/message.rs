use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;

/// Kind carried by a `TTS` message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TtsKind {
    /// Request to speak `text`.
    Text,
    /// Request to silence any speech in progress.
    Stop,
    /// Reported by a playback host once speech has finished.
    Ended,
}

/// Messages exchanged between execution contexts over the bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Message {
    #[serde(rename = "PROMPT")]
    Prompt {
        prompt: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reset: Option<bool>,
    },

    #[serde(rename = "RESET_SESSION", alias = "RESET-SESSION")]
    ResetSession,

    #[serde(rename = "NOTIFY")]
    Notify {
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        audio: Option<String>,
    },

    #[serde(rename = "AUDIO")]
    Audio { audio: String },

    #[serde(rename = "TTS")]
    Tts {
        kind: TtsKind,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },
}

impl Message {
    const KNOWN_TAGS: [&'static str; 6] = [
        "PROMPT",
        "RESET_SESSION",
        "RESET-SESSION",
        "NOTIFY",
        "AUDIO",
        "TTS",
    ];

    pub fn prompt(prompt: impl Into<String>) -> Self {
        Self::Prompt {
            prompt: prompt.into(),
            reset: None,
        }
    }

    pub fn notify(message: impl Into<String>, audio: Option<&str>) -> Self {
        Self::Notify {
            message: message.into(),
            audio: audio.map(str::to_string),
        }
    }

    pub fn audio(audio: impl Into<String>) -> Self {
        Self::Audio {
            audio: audio.into(),
        }
    }

    pub fn speak(text: impl Into<String>) -> Self {
        Self::Tts {
            kind: TtsKind::Text,
            text: Some(text.into()),
        }
    }

    pub fn tts(kind: TtsKind) -> Self {
        Self::Tts { kind, text: None }
    }

    /// Wire tag of this message.
    pub fn kind(&self) -> &'static str {
        match self {
            Message::Prompt { .. } => "PROMPT",
            Message::ResetSession => "RESET_SESSION",
            Message::Notify { .. } => "NOTIFY",
            Message::Audio { .. } => "AUDIO",
            Message::Tts { .. } => "TTS",
        }
    }

    pub fn is_known_tag(tag: &str) -> bool {
        Self::KNOWN_TAGS.contains(&tag)
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Copy of a message handed to a tab's content-script context, stamped with
/// the identifier of the runtime that relayed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub origin: String,
    #[serde(flatten)]
    pub message: Message,
}

impl Envelope {
    pub fn new(origin: impl Into<String>, message: Message) -> Self {
        Self {
            origin: origin.into(),
            message,
        }
    }
}

/// Result of classifying a raw value received at the bus boundary.
#[derive(Debug, Clone)]
pub enum Inbound {
    /// Well-formed message of a known kind.
    Message(Message),
    /// Not an object, or no non-empty `type` tag.
    Untyped,
    /// Tagged with a kind nobody understands.
    Unknown(String),
    /// Known kind whose payload does not match its shape.
    Malformed(CoreError),
}

/// Classify a raw bus value. Never fails; callers decide what to drop.
pub fn parse_message(value: &Value) -> Inbound {
    let Some(tag) = value
        .as_object()
        .and_then(|object| object.get("type"))
        .and_then(Value::as_str)
        .filter(|tag| !tag.is_empty())
    else {
        return Inbound::Untyped;
    };

    if !Message::is_known_tag(tag) {
        return Inbound::Unknown(tag.to_string());
    }

    match serde_json::from_value::<Message>(value.clone()) {
        Ok(message) => Inbound::Message(message),
        Err(err) => Inbound::Malformed(CoreError::malformed(tag, err.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn untyped_values_are_classified() {
        for value in [
            json!(null),
            json!("PROMPT"),
            json!(42),
            json!({}),
            json!({"type": ""}),
            json!({"type": 7}),
        ] {
            assert!(matches!(parse_message(&value), Inbound::Untyped), "{value}");
        }
    }

    #[test]
    fn unknown_tag_is_reported() {
        match parse_message(&json!({"type": "PING"})) {
            Inbound::Unknown(tag) => assert_eq!(tag, "PING"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn prompt_without_text_is_malformed() {
        assert!(matches!(
            parse_message(&json!({"type": "PROMPT"})),
            Inbound::Malformed(_)
        ));
    }

    #[test]
    fn reset_session_accepts_dashed_alias() {
        for tag in ["RESET_SESSION", "RESET-SESSION"] {
            match parse_message(&json!({ "type": tag })) {
                Inbound::Message(Message::ResetSession) => {}
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn notify_audio_is_optional() {
        match parse_message(&json!({"type": "NOTIFY", "message": "hi"})) {
            Inbound::Message(Message::Notify { message, audio }) => {
                assert_eq!(message, "hi");
                assert!(audio.is_none());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn tts_kinds_use_lowercase_names() {
        let value = Message::tts(TtsKind::Ended).to_value();
        assert_eq!(value, json!({"type": "TTS", "kind": "ended"}));
        assert!(matches!(
            parse_message(&json!({"type": "TTS", "kind": "stop"})),
            Inbound::Message(Message::Tts {
                kind: TtsKind::Stop,
                text: None
            })
        ));
    }

    #[test]
    fn envelope_flattens_origin_into_message() {
        let envelope = Envelope::new("tabpilot", Message::audio("finish"));
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({"origin": "tabpilot", "type": "AUDIO", "audio": "finish"})
        );
    }
}
