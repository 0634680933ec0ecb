//! OpenAI-compatible completion provider.
//!
//! A single [`OpenAiCompatibleProvider`] serves OpenRouter (the default),
//! OpenAI, and any gateway speaking the chat completions protocol, selected
//! by base URL.
//!
//! Uses [`async_openai`] for type-safe request/response handling.

pub mod config;

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
    ChatCompletionRequestSystemMessageContent, ChatCompletionRequestUserMessage,
    ChatCompletionRequestUserMessageContent, CreateChatCompletionRequest, FinishReason,
    ResponseFormat,
};
use secrecy::ExposeSecret;

use curdmate_core::llm::provider::LlmProvider;
use curdmate_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, MessageRole, ProviderCapabilities,
    StopReason, Usage,
};

use self::config::OpenAiCompatConfig;

/// Unified provider for any OpenAI-compatible API.
///
/// # API Key Security
///
/// Does NOT derive Debug to prevent accidental exposure of the API key
/// stored inside the `async_openai::Client`.
pub struct OpenAiCompatibleProvider {
    client: Client<OpenAIConfig>,
    provider_name: String,
    model: String,
    capabilities: ProviderCapabilities,
}

impl OpenAiCompatibleProvider {
    pub fn new(config: OpenAiCompatConfig) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(config.api_key.expose_secret())
            .with_api_base(&config.base_url);

        Self {
            client: Client::with_config(openai_config),
            provider_name: config.provider_name,
            model: config.model,
            capabilities: config.capabilities,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Build a [`CreateChatCompletionRequest`] from a generic [`CompletionRequest`].
    ///
    /// The token cap goes out as both `max_completion_tokens` and the older
    /// `max_tokens`; gateways routing to older models only honour the latter.
    #[allow(deprecated)]
    fn build_request(&self, request: &CompletionRequest) -> CreateChatCompletionRequest {
        let messages = request
            .messages
            .iter()
            .map(|msg| match msg.role {
                MessageRole::System => ChatCompletionRequestMessage::System(
                    ChatCompletionRequestSystemMessage {
                        content: ChatCompletionRequestSystemMessageContent::Text(
                            msg.content.clone(),
                        ),
                        name: None,
                    },
                ),
                MessageRole::User => ChatCompletionRequestMessage::User(
                    ChatCompletionRequestUserMessage {
                        content: ChatCompletionRequestUserMessageContent::Text(
                            msg.content.clone(),
                        ),
                        name: None,
                    },
                ),
            })
            .collect();

        // Use the model from the request if set, otherwise fall back to config default
        let model = if request.model.is_empty() {
            self.model.clone()
        } else {
            request.model.clone()
        };

        let response_format = (request.json_response && self.capabilities.json_mode)
            .then_some(ResponseFormat::JsonObject);

        CreateChatCompletionRequest {
            model,
            messages,
            max_completion_tokens: Some(request.max_tokens),
            max_tokens: Some(request.max_tokens),
            temperature: request.temperature.map(|t| t as f32),
            response_format,
            ..Default::default()
        }
    }
}

impl LlmProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.provider_name
    }

    fn capabilities(&self) -> &ProviderCapabilities {
        &self.capabilities
    }

    #[tracing::instrument(name = "llm.complete", skip_all, fields(provider = %self.provider_name))]
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let oai_request = self.build_request(request);

        let response = self
            .client
            .chat()
            .create(oai_request)
            .await
            .map_err(map_openai_error)?;

        let first = response.choices.first();
        let content = first
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();

        let stop_reason = first
            .and_then(|c| c.finish_reason.as_ref())
            .map(|fr| match fr {
                FinishReason::Length => StopReason::MaxTokens,
                _ => StopReason::EndTurn,
            })
            .unwrap_or(StopReason::EndTurn);

        let usage = response
            .usage
            .map(|u| Usage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        Ok(CompletionResponse {
            id: response.id,
            content,
            model: response.model,
            stop_reason,
            usage,
        })
    }
}

/// Map an `async_openai::error::OpenAIError` to an [`LlmError`].
fn map_openai_error(err: async_openai::error::OpenAIError) -> LlmError {
    use async_openai::error::OpenAIError;

    match &err {
        OpenAIError::ApiError(api_err) => {
            let code = api_err.code.as_deref().unwrap_or("");
            let error_type = api_err.r#type.as_deref().unwrap_or("");

            if code == "authentication_error"
                || error_type == "authentication_error"
                || api_err.message.contains("Incorrect API key")
                || api_err.message.contains("Invalid API key")
            {
                LlmError::AuthenticationFailed
            } else if code == "rate_limit_exceeded" || error_type == "rate_limit_error" {
                LlmError::RateLimited {
                    retry_after_ms: None,
                }
            } else {
                LlmError::Provider {
                    message: err.to_string(),
                }
            }
        }
        OpenAIError::Reqwest(reqwest_err) => match reqwest_err.status().map(|s| s.as_u16()) {
            Some(401) => LlmError::AuthenticationFailed,
            Some(429) => LlmError::RateLimited {
                retry_after_ms: None,
            },
            _ => LlmError::Provider {
                message: err.to_string(),
            },
        },
        OpenAIError::JSONDeserialize(_, content) => {
            LlmError::Deserialization(format!("failed to parse response: {content}"))
        }
        OpenAIError::InvalidArgument(msg) => LlmError::InvalidRequest(msg.clone()),
        _ => LlmError::Provider {
            message: err.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use curdmate_types::llm::Message;
    use secrecy::SecretString;

    fn provider() -> OpenAiCompatibleProvider {
        OpenAiCompatibleProvider::new(config::openrouter_defaults(
            SecretString::from("sk-test".to_string()),
            "openai/gpt-4o-mini",
        ))
    }

    fn request(model: &str, json_response: bool) -> CompletionRequest {
        CompletionRequest {
            model: model.to_string(),
            messages: vec![Message::system("return JSON"), Message::user("add john")],
            max_tokens: 300,
            temperature: Some(0.1),
            json_response,
        }
    }

    #[test]
    fn test_openrouter_provider() {
        let p = provider();
        assert_eq!(p.name(), "openrouter");
        assert_eq!(p.model(), "openai/gpt-4o-mini");
        assert!(p.capabilities().json_mode);
    }

    #[test]
    #[allow(deprecated)]
    fn test_build_request_keeps_message_order_and_caps() {
        let req = provider().build_request(&request("other/model", false));
        assert_eq!(req.model, "other/model");
        assert_eq!(req.messages.len(), 2);
        assert!(matches!(req.messages[0], ChatCompletionRequestMessage::System(_)));
        assert!(matches!(req.messages[1], ChatCompletionRequestMessage::User(_)));
        assert_eq!(req.max_completion_tokens, Some(300));
        assert_eq!(req.max_tokens, Some(300));
        assert!(req.response_format.is_none());
    }

    #[test]
    fn test_build_request_json_mode() {
        let req = provider().build_request(&request("", true));
        assert!(matches!(req.response_format, Some(ResponseFormat::JsonObject)));
    }

    #[test]
    fn test_build_request_skips_json_mode_without_support() {
        let nlp = curdmate_types::config::NlpConfig {
            provider_name: "local".into(),
            base_url: "http://localhost:8080/v1".into(),
            ..Default::default()
        };
        let p = OpenAiCompatibleProvider::new(config::from_nlp_config(
            &nlp,
            SecretString::from("sk-test".to_string()),
        ));
        let req = p.build_request(&request("", true));
        assert!(req.response_format.is_none());
    }

    #[test]
    fn test_build_request_falls_back_to_configured_model() {
        let req = provider().build_request(&request("", false));
        assert_eq!(req.model, "openai/gpt-4o-mini");
    }

    #[test]
    fn test_map_invalid_argument() {
        let err = map_openai_error(async_openai::error::OpenAIError::InvalidArgument(
            "bad".to_string(),
        ));
        assert!(matches!(err, LlmError::InvalidRequest(m) if m == "bad"));
    }
}
