//! Transcript message types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Who sent a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sender::User => write!(f, "user"),
            Sender::Bot => write!(f, "bot"),
        }
    }
}

/// Tag attached to bot messages describing what produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionTag {
    Help,
    Create,
    Search,
    Update,
    Delete,
    Cancel,
    Conversation,
    Error,
    /// Prompt or acknowledgement inside a flow.
    Response,
}

impl fmt::Display for ActionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ActionTag::Help => "help",
            ActionTag::Create => "create",
            ActionTag::Search => "search",
            ActionTag::Update => "update",
            ActionTag::Delete => "delete",
            ActionTag::Cancel => "cancel",
            ActionTag::Conversation => "conversation",
            ActionTag::Error => "error",
            ActionTag::Response => "response",
        };
        f.write_str(s)
    }
}

/// One entry in a session transcript. Never mutated once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptMessage {
    pub id: Uuid,
    pub sender: Sender,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<ActionTag>,
}

impl TranscriptMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            sender: Sender::User,
            text: text.into(),
            timestamp: Utc::now(),
            action: None,
        }
    }

    pub fn bot(text: impl Into<String>, action: ActionTag) -> Self {
        Self {
            id: Uuid::now_v7(),
            sender: Sender::Bot,
            text: text.into(),
            timestamp: Utc::now(),
            action: Some(action),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_has_no_action() {
        let msg = TranscriptMessage::user("hello");
        assert_eq!(msg.sender, Sender::User);
        assert!(msg.action.is_none());
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"sender\":\"user\""));
        assert!(!json.contains("action"));
    }

    #[test]
    fn test_bot_messages_get_distinct_ids() {
        let a = TranscriptMessage::bot("one", ActionTag::Help);
        let b = TranscriptMessage::bot("two", ActionTag::Response);
        assert_ne!(a.id, b.id);
        assert_eq!(b.action, Some(ActionTag::Response));
    }

    #[test]
    fn test_action_tag_serde() {
        let json = serde_json::to_string(&ActionTag::Conversation).unwrap();
        assert_eq!(json, "\"conversation\"");
        assert_eq!(ActionTag::Cancel.to_string(), "cancel");
    }
}
