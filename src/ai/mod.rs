//! Model integration.
//!
//! Turns a one-line idea into a PRD, a feature list and a task breakdown
//! via a language model, local or hosted.
//!
//! ## Pieces
//!
//! - [`CompletionClient`] - one prompt in, normalized text out
//! - [`extract_json`] - recover JSON from prose-wrapped model output
//! - [`GenerationPipeline`] - the four-stage document/features/tasks/finalize run
//! - [`CancelToken`] - cooperative cancellation for in-flight runs

mod client;
mod extract;
mod pipeline;
mod prompts;
mod wire;

pub use client::CompletionClient;
pub use extract::{extract_json, JsonShape};
pub use pipeline::{
    CancelToken, GeneratedProject, GenerationPipeline, GenerationStep, PipelineError, StepStatus,
};
pub use prompts::{fallback_features, fallback_tasks, Locale};
pub use wire::WireFormat;

use async_trait::async_trait;

use crate::core::ModelConfig;

/// Anything that can answer a single prompt with text.
///
/// The pipeline is generic over this so tests can script responses without
/// a network.
#[async_trait]
pub trait Completer: Send + Sync {
    async fn complete(&self, prompt: &str, config: &ModelConfig) -> Result<String, CompletionError>;
}

/// Why a completion call failed. Never retried; each failure is terminal
/// for that call.
#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    /// Missing or invalid provider/model selection.
    #[error("invalid model configuration: {0}")]
    Config(String),

    /// HTTP 401 from a hosted provider.
    #[error("authentication failed for {provider}: invalid or missing API key")]
    Auth { provider: String },

    /// Any other non-2xx response.
    #[error("API error ({status}) from {endpoint}: {body}")]
    Transport { status: u16, endpoint: String, body: String },

    /// The request never completed (DNS, connect, decode).
    #[error("request to {endpoint} failed: {source}")]
    Network {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
}
