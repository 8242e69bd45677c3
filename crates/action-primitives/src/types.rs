//! Operation kinds understood by the executor

use std::fmt;
use std::str::FromStr;

use browser_host::{PageOperation, ScrollDirection};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::ActionError;

/// Closed set of action kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Open `target` as a URL.
    Navigate,
    /// Click the element described by `target`.
    Click,
    /// Type text; `target` is `selector::text` or bare text.
    Type,
    /// Scroll the viewport `up` or `down`.
    Scroll,
    /// Go back in history.
    Back,
    /// Report `target` as the answer and stop.
    Answer,
    /// Task finished; `target` is the final message.
    Done,
}

impl ActionKind {
    pub const ALL: [ActionKind; 7] = [
        ActionKind::Navigate,
        ActionKind::Click,
        ActionKind::Type,
        ActionKind::Scroll,
        ActionKind::Back,
        ActionKind::Answer,
        ActionKind::Done,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Navigate => "navigate",
            ActionKind::Click => "click",
            ActionKind::Type => "type",
            ActionKind::Scroll => "scroll",
            ActionKind::Back => "back",
            ActionKind::Answer => "answer",
            ActionKind::Done => "done",
        }
    }

    /// Kinds that end the run instead of reaching the page.
    pub fn is_completion(&self) -> bool {
        matches!(self, ActionKind::Answer | ActionKind::Done)
    }

    /// Page operation for this kind, or `None` for completion kinds.
    pub fn operation(&self, target: &str) -> Result<Option<PageOperation>, ActionError> {
        let target = target.trim();
        let operation = match self {
            ActionKind::Navigate => PageOperation::Navigate {
                url: normalize_url(target)?,
            },
            ActionKind::Click => {
                if target.is_empty() {
                    return Err(ActionError::invalid_target("click", "empty target"));
                }
                PageOperation::Click {
                    target: target.to_string(),
                }
            }
            ActionKind::Type => match target.split_once("::") {
                Some((selector, text)) => PageOperation::Type {
                    selector: Some(selector.trim().to_string()).filter(|s| !s.is_empty()),
                    text: text.to_string(),
                },
                None => PageOperation::Type {
                    selector: None,
                    text: target.to_string(),
                },
            },
            ActionKind::Scroll => PageOperation::Scroll {
                direction: match target.to_ascii_lowercase().as_str() {
                    "" | "down" => ScrollDirection::Down,
                    "up" => ScrollDirection::Up,
                    other => {
                        return Err(ActionError::invalid_target(
                            "scroll",
                            format!("unknown direction '{other}'"),
                        ))
                    }
                },
            },
            ActionKind::Back => PageOperation::Back,
            ActionKind::Answer | ActionKind::Done => return Ok(None),
        };
        Ok(Some(operation))
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = ActionError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase();
        let kind = match normalized.as_str() {
            "input" | "type_text" => ActionKind::Type,
            other => ActionKind::ALL
                .into_iter()
                .find(|kind| kind.as_str() == other)
                .ok_or_else(|| ActionError::UnsupportedAction(raw.to_string()))?,
        };
        Ok(kind)
    }
}

fn normalize_url(target: &str) -> Result<String, ActionError> {
    if target.is_empty() {
        return Err(ActionError::invalid_target("navigate", "empty url"));
    }
    let parsed = Url::parse(target).or_else(|_| Url::parse(&format!("https://{target}")));
    match parsed {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(url.to_string()),
        Ok(url) => Err(ActionError::invalid_target(
            "navigate",
            format!("scheme '{}' not allowed", url.scheme()),
        )),
        Err(err) => Err(ActionError::invalid_target("navigate", err.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_kinds_and_aliases() {
        assert_eq!("navigate".parse::<ActionKind>().unwrap(), ActionKind::Navigate);
        assert_eq!(" Click ".parse::<ActionKind>().unwrap(), ActionKind::Click);
        assert_eq!("input".parse::<ActionKind>().unwrap(), ActionKind::Type);
        assert_eq!("DONE".parse::<ActionKind>().unwrap(), ActionKind::Done);
    }

    #[test]
    fn rejects_unknown_kind() {
        assert_eq!(
            "hover".parse::<ActionKind>(),
            Err(ActionError::UnsupportedAction("hover".to_string()))
        );
    }

    #[test]
    fn navigate_adds_missing_scheme() {
        let op = ActionKind::Navigate.operation("example.com/prices").unwrap();
        assert_eq!(
            op,
            Some(PageOperation::Navigate {
                url: "https://example.com/prices".to_string()
            })
        );
    }

    #[test]
    fn navigate_rejects_script_urls() {
        assert!(ActionKind::Navigate.operation("javascript:alert(1)").is_err());
    }

    #[test]
    fn type_splits_selector_and_text() {
        assert_eq!(
            ActionKind::Type.operation("#q::cheap flights").unwrap(),
            Some(PageOperation::Type {
                selector: Some("#q".to_string()),
                text: "cheap flights".to_string()
            })
        );
        assert_eq!(
            ActionKind::Type.operation("hello").unwrap(),
            Some(PageOperation::Type {
                selector: None,
                text: "hello".to_string()
            })
        );
    }

    #[test]
    fn completion_kinds_have_no_operation() {
        for kind in [ActionKind::Answer, ActionKind::Done] {
            assert!(kind.is_completion());
            assert_eq!(kind.operation("Paris").unwrap(), None);
        }
    }

    #[test]
    fn scroll_direction_defaults_down() {
        assert_eq!(
            ActionKind::Scroll.operation("").unwrap(),
            Some(PageOperation::Scroll {
                direction: ScrollDirection::Down
            })
        );
        assert!(ActionKind::Scroll.operation("sideways").is_err());
    }
}
