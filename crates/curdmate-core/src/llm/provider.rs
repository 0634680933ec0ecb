//! LlmProvider trait definition.
//!
//! The port the intent resolver talks to. Uses RPITIT for `complete`; the
//! object-safe wrapper lives in [`super::box_provider`].

use curdmate_types::llm::{CompletionRequest, CompletionResponse, LlmError, ProviderCapabilities};

/// Trait for completion service backends.
///
/// Implementations live in curdmate-infra (e.g., `OpenAiCompatibleProvider`).
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g., "openrouter").
    fn name(&self) -> &str;

    fn capabilities(&self) -> &ProviderCapabilities;

    /// Send a completion request and receive the full response.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, LlmError>> + Send;
}
