//! Free-text intent resolution through a completion service.
//!
//! `IntentResolver::resolve` sends the user's message with a fixed system
//! instruction and normalizes whatever comes back. `detect_direct_lookup`
//! is the pre-pass that answers "find <id>" without calling the service.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use curdmate_types::intent::Intent;
use curdmate_types::llm::{
    CompletionRequest, LlmError, Message, ProviderCapabilities, StopReason,
};
use curdmate_types::record::RecordId;

use super::normalize::normalize_intent;
use crate::llm::box_provider::BoxLlmProvider;

/// System instruction constraining the completion to one JSON intent.
pub const INTENT_SYSTEM_PROMPT: &str = r#"You are a contact management assistant. Parse the user's message and return JSON in exactly this format:

{
  "action": "create|read|update|delete|conversation",
  "data": { ...extracted fields... }
}

ACTIONS:
- "create": extract name, email, phone, age, address
  Example: {"name": "john", "email": "john@test.com", "phone": "9876543210"}
- "read": extract the search term, or "all" to list everything
  Example: {"search": "all"} or {"search": "john"}
- "update": extract contact_id and the fields to change
  Example: {"contact_id": "507f1f77bcf86cd799439011", "email": "new@email.com"}
- "delete": extract contact_id
  Example: {"contact_id": "507f1f77bcf86cd799439011"}
- "conversation": greetings, help requests, anything else
  Example: {}

Return only valid JSON, no explanations."#;

static LOOKUP_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([a-fA-F0-9]{24}|[a-fA-F0-9]{12})\b").expect("lookup id pattern compiles")
});

const LOOKUP_VERBS: [&str; 4] = ["find", "search", "get", "show"];

/// Detect "look up this id" messages: an embedded record id plus a lookup verb.
pub fn detect_direct_lookup(message: &str) -> Option<RecordId> {
    let lowered = message.to_lowercase();
    if !LOOKUP_VERBS.iter().any(|v| lowered.contains(v)) {
        return None;
    }
    let id = LOOKUP_ID_RE.captures(message)?.get(1)?;
    RecordId::parse(id.as_str())
}

/// Resolves free text to an [`Intent`] via a completion provider.
///
/// With no provider configured every call fails with
/// [`LlmError::NotConfigured`].
pub struct IntentResolver {
    provider: Option<BoxLlmProvider>,
    model: String,
    temperature: f64,
    max_tokens: u32,
    missing_reason: String,
}

impl IntentResolver {
    pub fn new(provider: BoxLlmProvider, model: impl Into<String>, temperature: f64, max_tokens: u32) -> Self {
        Self {
            provider: Some(provider),
            model: model.into(),
            temperature,
            max_tokens,
            missing_reason: String::new(),
        }
    }

    /// A resolver whose every call reports `reason` as not configured.
    pub fn unconfigured(reason: impl Into<String>) -> Self {
        Self {
            provider: None,
            model: String::new(),
            temperature: 0.0,
            max_tokens: 0,
            missing_reason: reason.into(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// The provider's limits cap `max_tokens`; JSON mode is requested
    /// whenever the provider supports it.
    fn request(&self, message: &str, capabilities: &ProviderCapabilities) -> CompletionRequest {
        CompletionRequest {
            model: self.model.clone(),
            messages: vec![Message::system(INTENT_SYSTEM_PROMPT), Message::user(message)],
            max_tokens: self.max_tokens.min(capabilities.max_output_tokens),
            temperature: Some(self.temperature),
            json_response: capabilities.json_mode,
        }
    }

    /// Ask the completion service what `message` means.
    ///
    /// Malformed output is not an error: it resolves to `conversation`.
    #[tracing::instrument(name = "nlp.resolve", skip_all, fields(nlp.model = %self.model))]
    pub async fn resolve(&self, message: &str) -> Result<Intent, LlmError> {
        let Some(provider) = self.provider.as_ref() else {
            return Err(LlmError::NotConfigured(self.missing_reason.clone()));
        };
        let request = self.request(message, provider.capabilities());
        let response = provider.complete(&request).await?;
        if response.stop_reason == StopReason::MaxTokens {
            warn!(
                max_tokens = request.max_tokens,
                output_tokens = response.usage.output_tokens,
                "completion truncated at the token limit"
            );
        }
        let intent = normalize_intent(&response.content);
        debug!(
            action = %intent.action,
            output_tokens = response.usage.output_tokens,
            "intent resolved"
        );
        Ok(intent)
    }
}
