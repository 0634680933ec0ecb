//! Normalization of raw completion output into an [`Intent`].
//!
//! Models wrap JSON in code fences, add prose around it, double-encode it,
//! or nest it under `body` or `plan`. All of that is handled here so the
//! engine only ever sees a well-formed intent. Anything unusable becomes
//! the `conversation` intent.

use serde_json::{Map, Value};
use tracing::warn;

use curdmate_types::intent::{Intent, IntentAction};

/// Parse raw completion text into an intent. Never fails.
pub fn normalize_intent(raw: &str) -> Intent {
    match parse_intent(raw) {
        Some(intent) => intent,
        None => {
            warn!(raw_len = raw.len(), "unusable completion output, treating as conversation");
            Intent::conversation()
        }
    }
}

fn parse_intent(raw: &str) -> Option<Intent> {
    let value = parse_json(raw)?;
    let object = unwrap_object(value, 0)?;
    intent_from_object(&object)
}

fn parse_json(raw: &str) -> Option<Value> {
    let text = strip_fences(raw.trim());
    if let Ok(value) = serde_json::from_str::<Value>(text) {
        return Some(value);
    }
    // Prose around the object: take the outermost braces.
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&text[start..=end]).ok()
}

fn strip_fences(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the language tag line (```json).
    let rest = rest.split_once('\n').map_or(rest, |(_, body)| body);
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

/// Peel string encodings and `body` wrappers down to the intent object.
fn unwrap_object(value: Value, depth: usize) -> Option<Map<String, Value>> {
    if depth > 3 {
        return None;
    }
    match value {
        Value::String(s) => unwrap_object(parse_json(&s)?, depth + 1),
        Value::Object(mut obj) if !obj.contains_key("action") && !obj.contains_key("plan") => {
            let body = obj.remove("body")?;
            unwrap_object(body, depth + 1)
        }
        Value::Object(obj) => Some(obj),
        _ => None,
    }
}

fn intent_from_object(obj: &Map<String, Value>) -> Option<Intent> {
    let top_confirm = obj
        .get("need_confirmation")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    // {"plan": {"action": ..., "args": {...}}, "need_confirmation": bool}
    let (source, data_key) = match obj.get("plan").and_then(Value::as_object) {
        Some(plan) => (plan, "args"),
        None => (obj, "data"),
    };

    let action = source
        .get("action")
        .and_then(Value::as_str)
        .map(parse_action)?;

    let data = source
        .get(data_key)
        .or_else(|| source.get("data"))
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    let need_confirmation = top_confirm
        || source
            .get("need_confirmation")
            .and_then(Value::as_bool)
            .unwrap_or(false);

    Some(Intent {
        action,
        data,
        need_confirmation,
    })
}

/// Map an action name (and common synonyms) to an action. Unknown names are
/// conversation.
fn parse_action(name: &str) -> IntentAction {
    if let Ok(action) = name.parse::<IntentAction>() {
        return action;
    }
    match name.trim().to_lowercase().as_str() {
        "search" | "find" | "list" | "get" | "lookup" => IntentAction::Read,
        "add" | "new" => IntentAction::Create,
        "edit" | "modify" | "change" => IntentAction::Update,
        "remove" => IntentAction::Delete,
        _ => IntentAction::Conversation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_json() {
        let intent = normalize_intent(r#"{"action":"create","data":{"name":"john"}}"#);
        assert_eq!(intent.action, IntentAction::Create);
        assert_eq!(intent.text("name").as_deref(), Some("john"));
        assert!(!intent.need_confirmation);
    }

    #[test]
    fn test_code_fenced_json() {
        let raw = "```json\n{\"action\": \"read\", \"data\": {\"search\": \"all\"}}\n```";
        let intent = normalize_intent(raw);
        assert_eq!(intent.action, IntentAction::Read);
        assert_eq!(intent.text("search").as_deref(), Some("all"));
    }

    #[test]
    fn test_prose_around_json() {
        let raw = "Sure! Here you go: {\"action\":\"delete\",\"data\":{\"contact_id\":\"507f1f77bcf86cd799439011\"}} Hope that helps.";
        let intent = normalize_intent(raw);
        assert_eq!(intent.action, IntentAction::Delete);
        assert_eq!(
            intent.record_id_text().as_deref(),
            Some("507f1f77bcf86cd799439011")
        );
    }

    #[test]
    fn test_double_encoded_string() {
        let raw = r#""{\"action\":\"update\",\"data\":{\"contact_id\":\"abc\"}}""#;
        assert_eq!(normalize_intent(raw).action, IntentAction::Update);
    }

    #[test]
    fn test_body_string_and_object() {
        let as_string = r#"{"body":"{\"action\":\"read\",\"data\":{}}"}"#;
        assert_eq!(normalize_intent(as_string).action, IntentAction::Read);
        let as_object = r#"{"body":{"action":"create","data":{"name":"x"}}}"#;
        assert_eq!(normalize_intent(as_object).action, IntentAction::Create);
    }

    #[test]
    fn test_plan_args_with_confirmation() {
        let raw = r#"{"plan":{"action":"delete","args":{"contact_id":"507f1f77bcf86cd799439011"}},"need_confirmation":true}"#;
        let intent = normalize_intent(raw);
        assert_eq!(intent.action, IntentAction::Delete);
        assert!(intent.need_confirmation);
        assert!(intent.record_id_text().is_some());
    }

    #[test]
    fn test_action_synonyms() {
        assert_eq!(normalize_intent(r#"{"action":"search"}"#).action, IntentAction::Read);
        assert_eq!(normalize_intent(r#"{"action":"remove"}"#).action, IntentAction::Delete);
        assert_eq!(normalize_intent(r#"{"action":"dance"}"#).action, IntentAction::Conversation);
    }

    #[test]
    fn test_malformed_output_degrades_to_conversation() {
        for raw in ["", "not json at all", "{\"action\": ", "[1,2,3]", "42", "{\"data\":{}}", "} {"] {
            let intent = normalize_intent(raw);
            assert_eq!(intent.action, IntentAction::Conversation, "input: {raw:?}");
            assert!(intent.data.is_empty());
        }
    }
}
