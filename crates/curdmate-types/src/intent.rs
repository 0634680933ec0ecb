//! Structured intents: what CRUD operation to perform, and with which data.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// The operation an intent asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntentAction {
    Create,
    Read,
    Update,
    Delete,
    Conversation,
}

impl fmt::Display for IntentAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntentAction::Create => write!(f, "create"),
            IntentAction::Read => write!(f, "read"),
            IntentAction::Update => write!(f, "update"),
            IntentAction::Delete => write!(f, "delete"),
            IntentAction::Conversation => write!(f, "conversation"),
        }
    }
}

impl FromStr for IntentAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "create" => Ok(IntentAction::Create),
            "read" => Ok(IntentAction::Read),
            "update" => Ok(IntentAction::Update),
            "delete" => Ok(IntentAction::Delete),
            "conversation" => Ok(IntentAction::Conversation),
            other => Err(format!("invalid intent action: '{other}'")),
        }
    }
}

/// Keys under which an intent may carry the target record id.
pub const RECORD_ID_KEYS: [&str; 4] = ["contact_id", "record_id", "id", "_id"];

/// A structured `{action, data}` intent.
///
/// Produced by the NLP resolver (after normalization) or synthesized by the
/// engine. Consumed once by the command executor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    pub action: IntentAction,
    #[serde(default)]
    pub data: Map<String, Value>,
    /// The resolver asked for explicit confirmation before execution.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub need_confirmation: bool,
}

impl Intent {
    pub fn new(action: IntentAction, data: Map<String, Value>) -> Self {
        Self {
            action,
            data,
            need_confirmation: false,
        }
    }

    /// The fallback intent: no CRUD operation, just chat.
    pub fn conversation() -> Self {
        Self::new(IntentAction::Conversation, Map::new())
    }

    /// A string (or number) value from `data`, trimmed. Empty strings are
    /// treated as absent.
    pub fn text(&self, key: &str) -> Option<String> {
        match self.data.get(key)? {
            Value::String(s) => {
                let t = s.trim();
                (!t.is_empty()).then(|| t.to_string())
            }
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// The first present value among `keys`.
    pub fn first_text(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|k| self.text(k))
    }

    /// The raw record id, looked up under every accepted key.
    pub fn record_id_text(&self) -> Option<String> {
        self.first_text(&RECORD_ID_KEYS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn intent(value: Value) -> Intent {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_intent_action_roundtrip() {
        for action in [
            IntentAction::Create,
            IntentAction::Read,
            IntentAction::Update,
            IntentAction::Delete,
            IntentAction::Conversation,
        ] {
            let parsed: IntentAction = action.to_string().parse().unwrap();
            assert_eq!(action, parsed);
        }
        assert!("upsert".parse::<IntentAction>().is_err());
    }

    #[test]
    fn test_intent_deserialize_defaults() {
        let i = intent(json!({"action": "read"}));
        assert_eq!(i.action, IntentAction::Read);
        assert!(i.data.is_empty());
        assert!(!i.need_confirmation);
    }

    #[test]
    fn test_need_confirmation_skipped_when_false() {
        let json = serde_json::to_string(&Intent::conversation()).unwrap();
        assert_eq!(json, r#"{"action":"conversation","data":{}}"#);
    }

    #[test]
    fn test_text_handles_numbers_and_blanks() {
        let i = intent(json!({"action": "create", "data": {"age": 30, "name": "  ", "email": " a@b.co "}}));
        assert_eq!(i.text("age").as_deref(), Some("30"));
        assert!(i.text("name").is_none());
        assert_eq!(i.text("email").as_deref(), Some("a@b.co"));
    }

    #[test]
    fn test_record_id_aliases() {
        let i = intent(json!({"action": "delete", "data": {"id": "507f1f77bcf86cd799439011"}}));
        assert_eq!(i.record_id_text().as_deref(), Some("507f1f77bcf86cd799439011"));
        let i = intent(json!({"action": "delete", "data": {"contact_id": "abc", "id": "def"}}));
        assert_eq!(i.record_id_text().as_deref(), Some("abc"));
    }
}
