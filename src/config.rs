//! Configuration for a note-generation run.
//!
//! Every knob lives in [`NotesConfig`], built via [`NotesConfigBuilder`].
//! Keeping the collaborators (model, graph layout, progress callback,
//! cancellation token) in one struct means a run is fully described by
//! `(text, method, config)` and two runs can be diffed to understand why
//! their outputs differ.

use crate::cancel::CancelToken;
use crate::error::NotesError;
use crate::graph::GraphLayout;
use crate::model::NoteModel;
use crate::progress::ProgressCallback;
use std::fmt;
use std::sync::Arc;

/// Configuration for one note-generation run.
///
/// # Example
/// ```rust
/// use studyspark::{LlamaServerModel, NotesConfig};
/// use std::sync::Arc;
///
/// let config = NotesConfig::builder()
///     .model(Arc::new(LlamaServerModel::new("http://localhost:8080")))
///     .chunk_chars(3600)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct NotesConfig {
    /// Maximum chunk length in characters. Default: 3600.
    ///
    /// Character-based on purpose: counting characters instead of tokens is a
    /// conservative bound against the model's real token budget, and it keeps
    /// the chunker independent of any particular tokenizer.
    pub chunk_chars: usize,

    /// Retry attempts for a failed model call. Default: 2.
    ///
    /// Only transport failures are retried. A parse failure is never retried:
    /// the same prompt at the same temperature would almost certainly
    /// reproduce the same malformed shape.
    pub max_retries: u32,

    /// Initial retry delay in milliseconds, doubling per attempt. Default: 500.
    pub retry_backoff_ms: u64,

    /// The model collaborator. Required for [`crate::convert::generate`].
    pub model: Option<Arc<dyn NoteModel>>,

    /// The graph-layout collaborator, used only by the Mapping method.
    /// Defaults to [`crate::graph::GraphvizLayout`] when left unset.
    pub graph: Option<Arc<dyn GraphLayout>>,

    /// Progress callback receiving lifecycle and per-chunk events.
    pub progress_callback: Option<ProgressCallback>,

    /// Cancellation token checked between chunks.
    pub cancel: CancelToken,
}

impl Default for NotesConfig {
    fn default() -> Self {
        Self {
            chunk_chars: 3600,
            max_retries: 2,
            retry_backoff_ms: 500,
            model: None,
            graph: None,
            progress_callback: None,
            cancel: CancelToken::new(),
        }
    }
}

impl fmt::Debug for NotesConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotesConfig")
            .field("chunk_chars", &self.chunk_chars)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_ms", &self.retry_backoff_ms)
            .field("model", &self.model.as_ref().map(|_| "<dyn NoteModel>"))
            .field("graph", &self.graph.as_ref().map(|_| "<dyn GraphLayout>"))
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn NoteProgressCallback>"),
            )
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}

impl NotesConfig {
    /// Create a new builder.
    pub fn builder() -> NotesConfigBuilder {
        NotesConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`NotesConfig`].
#[derive(Debug)]
pub struct NotesConfigBuilder {
    config: NotesConfig,
}

impl NotesConfigBuilder {
    pub fn chunk_chars(mut self, chars: usize) -> Self {
        self.config.chunk_chars = chars;
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n;
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn model(mut self, model: Arc<dyn NoteModel>) -> Self {
        self.config.model = Some(model);
        self
    }

    pub fn graph(mut self, graph: Arc<dyn GraphLayout>) -> Self {
        self.config.graph = Some(graph);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.config.cancel = token;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<NotesConfig, NotesError> {
        if self.config.chunk_chars == 0 {
            return Err(NotesError::InvalidConfig(
                "chunk_chars must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = NotesConfig::default();
        assert_eq!(c.chunk_chars, 3600);
        assert_eq!(c.max_retries, 2);
        assert_eq!(c.retry_backoff_ms, 500);
        assert!(c.model.is_none());
    }

    #[test]
    fn zero_chunk_chars_rejected() {
        let err = NotesConfig::builder().chunk_chars(0).build().unwrap_err();
        assert!(matches!(err, NotesError::InvalidConfig(_)));
    }

    #[test]
    fn debug_hides_trait_objects() {
        let c = NotesConfig::default();
        let dbg = format!("{c:?}");
        assert!(dbg.contains("chunk_chars"));
        assert!(!dbg.contains("Arc"));
    }
}
