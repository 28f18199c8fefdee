//! Inference stage: one model call per chunk, with retry.
//!
//! The only pipeline stage with I/O. Transport failures get retried with
//! exponential backoff; a response that parses as text but violates the
//! method's structure is NOT handled here — that is the parse stage's job,
//! and it is never retried (same prompt, same sampling, same malformed shape).

use crate::config::NotesConfig;
use crate::error::NotesError;
use crate::method::MethodKind;
use crate::model::NoteModel;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Run inference for one chunk, retrying transport failures.
///
/// `chunk_index` is 1-indexed for error reports. Backoff doubles per attempt
/// starting from `config.retry_backoff_ms`.
pub async fn run_chunk(
    model: &Arc<dyn NoteModel>,
    method: MethodKind,
    chunk_text: &str,
    chunk_index: usize,
    config: &NotesConfig,
) -> Result<String, NotesError> {
    let prompt = method.prompt(chunk_text);
    let options = method.options();
    let mut last_error = String::new();

    for attempt in 0..=config.max_retries {
        if attempt > 0 {
            let delay = config.retry_backoff_ms * 2u64.pow(attempt - 1);
            warn!(
                "chunk {chunk_index}: model call failed ({last_error}), \
                 retry {attempt}/{} in {delay}ms",
                config.max_retries
            );
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        match model.infer(&prompt, &options).await {
            Ok(output) => {
                debug!(
                    "chunk {chunk_index}: {} chars in, {} chars out",
                    chunk_text.len(),
                    output.len()
                );
                return Ok(output);
            }
            Err(e) => last_error = e.to_string(),
        }
    }

    Err(NotesError::ModelFailure {
        chunk: chunk_index,
        retries: config.max_retries,
        detail: last_error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{InferenceOptions, ModelError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails `failures` times, then succeeds.
    struct FlakyModel {
        failures: u32,
        calls: AtomicU32,
    }

    #[async_trait]
    impl NoteModel for FlakyModel {
        async fn infer(
            &self,
            _prompt: &str,
            _options: &InferenceOptions,
        ) -> Result<String, ModelError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(ModelError::Request("connection refused".into()))
            } else {
                Ok("output".into())
            }
        }
    }

    fn fast_config() -> NotesConfig {
        NotesConfig::builder()
            .max_retries(2)
            .retry_backoff_ms(1)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn succeeds_first_try() {
        let model: Arc<dyn NoteModel> = Arc::new(FlakyModel {
            failures: 0,
            calls: AtomicU32::new(0),
        });
        let out = run_chunk(&model, MethodKind::Outline, "text", 1, &fast_config())
            .await
            .unwrap();
        assert_eq!(out, "output");
    }

    #[tokio::test]
    async fn recovers_within_retry_budget() {
        let model = Arc::new(FlakyModel {
            failures: 2,
            calls: AtomicU32::new(0),
        });
        let dyn_model: Arc<dyn NoteModel> = model.clone();
        let out = run_chunk(&dyn_model, MethodKind::Cornell, "text", 1, &fast_config())
            .await
            .unwrap();
        assert_eq!(out, "output");
        // 2 failures + 1 success
        assert_eq!(model.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhausted_retries_report_model_failure() {
        let model = Arc::new(FlakyModel {
            failures: 10,
            calls: AtomicU32::new(0),
        });
        let dyn_model: Arc<dyn NoteModel> = model.clone();
        let err = run_chunk(&dyn_model, MethodKind::Boxing, "text", 7, &fast_config())
            .await
            .unwrap_err();
        match err {
            NotesError::ModelFailure {
                chunk,
                retries,
                detail,
            } => {
                assert_eq!(chunk, 7);
                assert_eq!(retries, 2);
                assert!(detail.contains("connection refused"));
            }
            other => panic!("expected ModelFailure, got {other}"),
        }
        // initial attempt + 2 retries
        assert_eq!(model.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn zero_retries_means_single_attempt() {
        let model = Arc::new(FlakyModel {
            failures: 1,
            calls: AtomicU32::new(0),
        });
        let dyn_model: Arc<dyn NoteModel> = model.clone();
        let config = NotesConfig::builder()
            .max_retries(0)
            .retry_backoff_ms(1)
            .build()
            .unwrap();
        assert!(run_chunk(&dyn_model, MethodKind::Outline, "t", 1, &config)
            .await
            .is_err());
        assert_eq!(model.calls.load(Ordering::SeqCst), 1);
    }
}
