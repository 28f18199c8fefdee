//! Model collaborator: the contract for per-chunk text inference.
//!
//! The pipeline never speaks to a model directly — it goes through the
//! [`NoteModel`] trait so tests can script responses and applications can plug
//! in whatever runtime they host their model on. The bundled
//! [`LlamaServerModel`] talks to a llama.cpp server (`llama-server`) over
//! HTTP, which is the expected setup for a locally-run model: the server owns
//! the weights and the context window, this crate only sends prompts.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Sampling options for one inference call.
///
/// Each [`crate::method::MethodKind`] carries its own preset (see
/// [`crate::prompts::preset`]); callers normally never build these by hand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceOptions {
    /// Maximum tokens the model may generate for the chunk.
    pub max_tokens: usize,
    /// Sampling temperature (0.0–1.0 in practice).
    pub temperature: f32,
    /// Nucleus-sampling cutoff.
    pub top_p: f32,
    /// Penalty applied to repeated tokens.
    pub repeat_penalty: f32,
    /// Sequences at which generation must stop.
    pub stop: Vec<String>,
}

/// Failure reported by a model collaborator.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Transport-level failure (connection refused, timeout, HTTP error).
    #[error("model request failed: {0}")]
    Request(String),

    /// The model responded, but not in the shape the collaborator expects.
    #[error("malformed model response: {0}")]
    Malformed(String),
}

/// An external language model that completes prompts.
///
/// Implementations must be `Send + Sync`; the pipeline holds them behind
/// `Arc<dyn NoteModel>` and calls them from a background worker. Calls are
/// strictly sequential — one chunk at a time — so implementations need no
/// internal request queueing.
#[async_trait]
pub trait NoteModel: Send + Sync {
    /// Prepare the model for inference.
    ///
    /// Called once before the first chunk; the default is a no-op. Network
    /// collaborators use this as a health check so a dead server fails the run
    /// before any chunking work happens.
    async fn load(&self) -> Result<(), ModelError> {
        Ok(())
    }

    /// Complete `prompt` under `options`, returning the raw completion text.
    async fn infer(&self, prompt: &str, options: &InferenceOptions) -> Result<String, ModelError>;
}

// ── llama.cpp server collaborator ────────────────────────────────────────

/// `/completion` request body for a llama.cpp server.
#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    prompt: &'a str,
    n_predict: usize,
    temperature: f32,
    top_p: f32,
    repeat_penalty: f32,
    stop: &'a [String],
}

/// The subset of the `/completion` response we consume.
#[derive(Debug, Deserialize)]
struct CompletionResponse {
    content: String,
}

/// A [`NoteModel`] backed by a llama.cpp server.
///
/// Start one with e.g. `llama-server -m phi-3-mini-4k-instruct-q4.gguf`, then
/// point this collaborator at it:
///
/// ```rust,no_run
/// use studyspark::LlamaServerModel;
/// let model = LlamaServerModel::new("http://localhost:8080");
/// ```
pub struct LlamaServerModel {
    base_url: String,
    client: reqwest::Client,
}

impl LlamaServerModel {
    /// Create a collaborator for the server at `base_url` (no trailing slash
    /// required) with a 5-minute per-call timeout — local CPU inference on a
    /// long chunk can legitimately take minutes.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, Duration::from_secs(300))
    }

    /// Create a collaborator with an explicit per-call timeout.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }
}

#[async_trait]
impl NoteModel for LlamaServerModel {
    async fn load(&self) -> Result<(), ModelError> {
        let url = format!("{}/health", self.base_url);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ModelError::Request(format!("health check failed: {e}")))?;
        if !resp.status().is_success() {
            return Err(ModelError::Request(format!(
                "model server not ready: HTTP {} from {url}",
                resp.status()
            )));
        }
        debug!("model server healthy at {}", self.base_url);
        Ok(())
    }

    async fn infer(&self, prompt: &str, options: &InferenceOptions) -> Result<String, ModelError> {
        let body = CompletionRequest {
            prompt,
            n_predict: options.max_tokens,
            temperature: options.temperature,
            top_p: options.top_p,
            repeat_penalty: options.repeat_penalty,
            stop: &options.stop,
        };

        let resp = self
            .client
            .post(format!("{}/completion", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| ModelError::Request(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            return Err(ModelError::Request(format!("HTTP {status}: {detail}")));
        }

        let completion: CompletionResponse = resp
            .json()
            .await
            .map_err(|e| ModelError::Malformed(e.to_string()))?;

        debug!("completion: {} chars", completion.content.len());
        Ok(completion.content)
    }
}
