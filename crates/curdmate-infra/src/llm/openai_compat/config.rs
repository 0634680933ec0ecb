//! Configuration types and per-provider defaults for OpenAI-compatible providers.

use secrecy::SecretString;

use curdmate_types::config::NlpConfig;
use curdmate_types::llm::ProviderCapabilities;

/// Configuration for an OpenAI-compatible completion provider.
///
/// Used to construct an [`super::OpenAiCompatibleProvider`].
pub struct OpenAiCompatConfig {
    /// Human-readable provider name (e.g., "openrouter").
    pub provider_name: String,
    /// Base URL for the API (e.g., "https://openrouter.ai/api/v1").
    pub base_url: String,
    pub api_key: SecretString,
    /// Model identifier (e.g., "openai/gpt-4o-mini").
    pub model: String,
    pub capabilities: ProviderCapabilities,
}

/// OpenRouter default configuration.
///
/// Base URL: `https://openrouter.ai/api/v1`
/// Routes to many upstream models; capabilities are those of the default
/// small model.
pub fn openrouter_defaults(api_key: SecretString, model: &str) -> OpenAiCompatConfig {
    OpenAiCompatConfig {
        provider_name: "openrouter".into(),
        base_url: "https://openrouter.ai/api/v1".into(),
        api_key,
        model: model.into(),
        capabilities: ProviderCapabilities {
            json_mode: true,
            max_output_tokens: 16_384,
        },
    }
}

/// OpenAI default configuration.
///
/// Base URL: `https://api.openai.com/v1`
pub fn openai_defaults(api_key: SecretString, model: &str) -> OpenAiCompatConfig {
    OpenAiCompatConfig {
        provider_name: "openai".into(),
        base_url: "https://api.openai.com/v1".into(),
        api_key,
        model: model.into(),
        capabilities: ProviderCapabilities {
            json_mode: true,
            max_output_tokens: 16_384,
        },
    }
}

/// Build a config from `[nlp]` settings.
///
/// Well-known provider names keep their capabilities; `base_url` from config
/// always wins so proxies and self-hosted gateways work.
pub fn from_nlp_config(config: &NlpConfig, api_key: SecretString) -> OpenAiCompatConfig {
    let mut oai = match config.provider_name.as_str() {
        "openai" => openai_defaults(api_key, &config.model),
        "openrouter" => openrouter_defaults(api_key, &config.model),
        other => OpenAiCompatConfig {
            provider_name: other.to_string(),
            base_url: String::new(),
            api_key,
            model: config.model.clone(),
            // Conservative defaults for unknown gateways
            capabilities: ProviderCapabilities {
                json_mode: false,
                max_output_tokens: 4_096,
            },
        },
    };
    if !config.base_url.trim().is_empty() {
        oai.base_url = config.base_url.trim_end_matches('/').to_string();
    }
    oai
}
