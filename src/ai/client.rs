//! Completion client.
//!
//! One prompt in, normalized text out, exactly one outbound HTTP call per
//! invocation. No retries, no caching, no client-side timeout; every
//! failure is terminal for the call and surfaced to the caller.

use reqwest::Client;
use serde_json::Value;

use super::wire::WireFormat;
use super::{Completer, CompletionError};
use crate::core::{ModelConfig, ModelSelection};
use crate::providers;

/// HTTP client for local and hosted model backends.
pub struct CompletionClient {
    client: Client,
}

impl CompletionClient {
    pub fn new() -> Self {
        Self { client: Client::new() }
    }

    /// Send one prompt to the configured backend and return the completion
    /// text.
    pub async fn complete(
        &self,
        prompt: &str,
        config: &ModelConfig,
    ) -> Result<String, CompletionError> {
        match config.selection() {
            ModelSelection::Local { endpoint, model } => {
                let url = format!("{}/api/generate", endpoint.trim_end_matches('/'));
                tracing::debug!(endpoint = %url, model = %model, "Local completion request");
                self.request(WireFormat::Ollama, &url, &model, None, prompt, None).await
            }
            ModelSelection::Hosted { provider_id, model_id, endpoint, api_key } => {
                let provider = providers::find_provider(&provider_id).ok_or_else(|| {
                    CompletionError::Config(format!("unknown provider: {provider_id}"))
                })?;
                providers::find_model(&provider_id, &model_id).ok_or_else(|| {
                    CompletionError::Config(format!("unknown model: {model_id}"))
                })?;
                let wire = WireFormat::for_provider(provider.id);
                tracing::debug!(provider = provider.id, model = %model_id, endpoint = %endpoint, "Hosted completion request");
                self.request(wire, &endpoint, &model_id, Some(&api_key), prompt, Some(provider.id))
                    .await
            }
        }
    }

    async fn request(
        &self,
        wire: WireFormat,
        endpoint: &str,
        model: &str,
        api_key: Option<&str>,
        prompt: &str,
        provider_id: Option<&str>,
    ) -> Result<String, CompletionError> {
        let mut request = self.client.post(endpoint).header("Content-Type", "application/json");
        if let Some(key) = api_key {
            request = wire.apply_auth(request, key);
        }

        let response = request
            .json(&wire.build_body(model, prompt))
            .send()
            .await
            .map_err(|source| CompletionError::Network { endpoint: endpoint.to_string(), source })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_failure(status.as_u16(), provider_id, endpoint, body));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|source| CompletionError::Network { endpoint: endpoint.to_string(), source })?;
        Ok(wire.extract_content(&body))
    }
}

impl Default for CompletionClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Completer for CompletionClient {
    async fn complete(&self, prompt: &str, config: &ModelConfig) -> Result<String, CompletionError> {
        Self::complete(self, prompt, config).await
    }
}

/// Map a non-success HTTP status to the error taxonomy. A hosted 401 is an
/// auth failure; everything else is transport.
fn classify_failure(
    status: u16,
    provider_id: Option<&str>,
    endpoint: &str,
    body: String,
) -> CompletionError {
    match (status, provider_id) {
        (401, Some(provider)) => CompletionError::Auth { provider: provider.to_string() },
        _ => CompletionError::Transport { status, endpoint: endpoint.to_string(), body },
    }
}
