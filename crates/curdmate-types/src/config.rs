//! Application configuration types for CurdMate.
//!
//! `AppConfig` represents the `config.toml` in the data directory. Every
//! field has a default so an empty (or missing) file is a valid config.

use serde::{Deserialize, Serialize};

/// Top-level configuration.
///
/// Loaded from `~/.curdmate/config.toml` unless `CURDMATE_DATA_DIR` points
/// elsewhere.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub record_api: RecordApiConfig,
    #[serde(default)]
    pub nlp: NlpConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Connection settings for the backend record API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordApiConfig {
    /// Base URL including any API prefix, e.g. `http://localhost:5000/api`.
    #[serde(default = "default_record_base_url")]
    pub base_url: String,
    /// Path segment of the record collection under `base_url`.
    #[serde(default = "default_collection")]
    pub collection: String,
    /// Results per page for list and search calls.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Environment variable holding the bearer token.
    #[serde(default = "default_token_env")]
    pub token_env: String,
}

fn default_record_base_url() -> String {
    "http://localhost:5000/api".to_string()
}

fn default_collection() -> String {
    "users".to_string()
}

fn default_page_size() -> u32 {
    10
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_token_env() -> String {
    "CURDMATE_API_TOKEN".to_string()
}

impl Default for RecordApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_record_base_url(),
            collection: default_collection(),
            page_size: default_page_size(),
            timeout_secs: default_timeout_secs(),
            token_env: default_token_env(),
        }
    }
}

/// Completion service settings for free-text intent resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NlpConfig {
    #[serde(default = "default_provider_name")]
    pub provider_name: String,
    #[serde(default = "default_nlp_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_provider_name() -> String {
    "openrouter".to_string()
}

fn default_nlp_base_url() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

fn default_model() -> String {
    "openai/gpt-4o-mini".to_string()
}

fn default_api_key_env() -> String {
    "OPENROUTER_API_KEY".to_string()
}

fn default_temperature() -> f64 {
    0.1
}

fn default_max_tokens() -> u32 {
    300
}

impl Default for NlpConfig {
    fn default() -> Self {
        Self {
            provider_name: default_provider_name(),
            base_url: default_nlp_base_url(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

/// HTTP transport bind address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3030
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}
