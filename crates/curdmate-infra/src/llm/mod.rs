//! Completion provider implementations.
//!
//! [`create_provider`] builds the configured provider; [`build_resolver`]
//! wraps it in an [`IntentResolver`], or an unconfigured one when no API key
//! is available.

pub mod openai_compat;

use secrecy::SecretString;
use tracing::{info, warn};

use curdmate_core::intent::nlp::IntentResolver;
use curdmate_core::llm::box_provider::BoxLlmProvider;
use curdmate_types::config::NlpConfig;
use curdmate_types::llm::LlmError;

use self::openai_compat::OpenAiCompatibleProvider;

/// Create a [`BoxLlmProvider`] from `[nlp]` settings.
///
/// # Errors
///
/// Returns [`LlmError::NotConfigured`] when `api_key` is `None`.
pub fn create_provider(config: &NlpConfig, api_key: Option<SecretString>) -> Result<BoxLlmProvider, LlmError> {
    let key = api_key.ok_or_else(|| {
        LlmError::NotConfigured(format!("set {} to enable free-text requests", config.api_key_env))
    })?;
    let provider = OpenAiCompatibleProvider::new(openai_compat::config::from_nlp_config(config, key));
    Ok(BoxLlmProvider::new(provider))
}

/// Build the intent resolver for `config`.
///
/// A missing key is not fatal: guided flows still work and free-text turns
/// report that the completion service is not configured.
pub fn build_resolver(config: &NlpConfig, api_key: Option<SecretString>) -> IntentResolver {
    match create_provider(config, api_key) {
        Ok(provider) => {
            info!(provider = provider.name(), model = %config.model, "completion provider ready");
            IntentResolver::new(provider, config.model.clone(), config.temperature, config.max_tokens)
        }
        Err(LlmError::NotConfigured(reason)) => {
            warn!(%reason, "free-text understanding disabled");
            IntentResolver::unconfigured(reason)
        }
        Err(e) => {
            warn!(error = %e, "free-text understanding disabled");
            IntentResolver::unconfigured(e.to_string())
        }
    }
}
