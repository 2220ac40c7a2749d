//! Per-provider wire formats.
//!
//! Providers differ in how a request authenticates, what the body looks
//! like and where the completion text lives in the response. Each family
//! is one variant here; adding a provider family is a new variant plus a
//! line in [`WireFormat::for_provider`], not scattered control flow.
//! Request and response shapes must match each vendor's public API exactly.

use reqwest::RequestBuilder;
use serde_json::{json, Value};

/// A provider family's request/response dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireFormat {
    /// `Authorization: Bearer`, chat-completions body, content under
    /// `choices[0].message.content`. The default for unlisted providers.
    OpenAiCompat,
    /// `x-api-key` + `anthropic-version`, messages body without
    /// temperature, content under `content[0].text`.
    Anthropic,
    /// Local inference: no auth, `/api/generate` body, content under
    /// `response`.
    Ollama,
}

impl WireFormat {
    /// Pick the dialect for a hosted provider id.
    pub fn for_provider(provider_id: &str) -> Self {
        match provider_id {
            "anthropic" => Self::Anthropic,
            _ => Self::OpenAiCompat,
        }
    }

    /// Attach the provider's authentication headers.
    pub fn apply_auth(self, request: RequestBuilder, api_key: &str) -> RequestBuilder {
        match self {
            Self::OpenAiCompat => request.header("Authorization", format!("Bearer {api_key}")),
            Self::Anthropic => {
                request.header("x-api-key", api_key).header("anthropic-version", "2023-06-01")
            }
            Self::Ollama => request,
        }
    }

    /// Build the request body for a single-prompt completion.
    pub fn build_body(self, model: &str, prompt: &str) -> Value {
        match self {
            Self::OpenAiCompat => json!({
                "model": model,
                "messages": [{"role": "user", "content": prompt}],
                "temperature": 0.7,
                "max_tokens": 1000,
            }),
            Self::Anthropic => json!({
                "model": model,
                "messages": [{"role": "user", "content": prompt}],
                "max_tokens": 1000,
            }),
            Self::Ollama => json!({
                "model": model,
                "prompt": prompt,
                "stream": false,
                "options": {"temperature": 0.7, "top_p": 0.9},
            }),
        }
    }

    /// Pull the completion text out of a success response body.
    ///
    /// A missing content path yields the empty string, not an error.
    pub fn extract_content(self, body: &Value) -> String {
        let content = match self {
            Self::OpenAiCompat => body.pointer("/choices/0/message/content"),
            Self::Anthropic => body.pointer("/content/0/text"),
            Self::Ollama => body.get("response"),
        };
        content.and_then(Value::as_str).unwrap_or_default().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unlisted_provider_uses_openai_dialect() {
        assert_eq!(WireFormat::for_provider("anthropic"), WireFormat::Anthropic);
        assert_eq!(WireFormat::for_provider("openai"), WireFormat::OpenAiCompat);
        assert_eq!(WireFormat::for_provider("some-new-vendor"), WireFormat::OpenAiCompat);
    }

    #[test]
    fn test_openai_body_shape() {
        let body = WireFormat::OpenAiCompat.build_body("gpt-4o", "hello");
        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "hello");
        assert_eq!(body["temperature"], 0.7);
        assert_eq!(body["max_tokens"], 1000);
    }

    #[test]
    fn test_anthropic_body_has_no_temperature() {
        let body = WireFormat::Anthropic.build_body("claude-sonnet-4", "hello");
        assert_eq!(body["max_tokens"], 1000);
        assert!(body.get("temperature").is_none());
    }

    #[test]
    fn test_ollama_body_shape() {
        let body = WireFormat::Ollama.build_body("llama3.1:8b", "hello");
        assert_eq!(body["prompt"], "hello");
        assert_eq!(body["stream"], false);
        assert_eq!(body["options"]["top_p"], 0.9);
    }

    #[test]
    fn test_extract_per_dialect() {
        let openai = json!({"choices": [{"message": {"content": "hi"}}]});
        assert_eq!(WireFormat::OpenAiCompat.extract_content(&openai), "hi");

        let anthropic = json!({"content": [{"text": "hi"}]});
        assert_eq!(WireFormat::Anthropic.extract_content(&anthropic), "hi");

        let ollama = json!({"response": "hi"});
        assert_eq!(WireFormat::Ollama.extract_content(&ollama), "hi");
    }

    #[test]
    fn test_extract_missing_path_is_empty_string() {
        let body = json!({"unexpected": true});
        assert_eq!(WireFormat::OpenAiCompat.extract_content(&body), "");
        assert_eq!(WireFormat::Anthropic.extract_content(&body), "");
        assert_eq!(WireFormat::Ollama.extract_content(&body), "");
    }
}
