//! Progress-callback trait for pipeline lifecycle events.
//!
//! Inject an `Arc<dyn NoteProgressCallback>` via
//! [`crate::config::NotesConfigBuilder::progress_callback`] to receive events
//! as the pipeline moves through its stages and chunks. Events are
//! observational only — they carry no control-flow effect on the core — and
//! the callback approach keeps the library ignorant of how the host
//! application communicates: forward them to a progress bar, a channel, a GUI
//! signal, or nothing at all.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Ordered lifecycle stages of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineStage {
    /// The model collaborator is being prepared.
    LoadingModel,
    /// The input text is being split into chunks.
    Chunking,
    /// Chunks are being sent to the model and parsed.
    Prompting,
    /// Accumulated records are being rendered into the document.
    RenderingDocument,
    /// The document was persisted.
    Saved,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PipelineStage::LoadingModel => "Loading Model",
            PipelineStage::Chunking => "Chunking",
            PipelineStage::Prompting => "Prompting",
            PipelineStage::RenderingDocument => "Rendering Document",
            PipelineStage::Saved => "Saved",
        };
        f.write_str(s)
    }
}

/// Called by the pipeline as it processes a run.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Implementations must be `Send + Sync` — the pipeline
/// runs on a background worker.
pub trait NoteProgressCallback: Send + Sync {
    /// Called once per lifecycle stage, in order.
    fn on_stage(&self, stage: PipelineStage) {
        let _ = stage;
    }

    /// Called just before the model request for a chunk is sent.
    ///
    /// `chunk` is 1-indexed; `total` is the chunk count for the run.
    fn on_chunk_start(&self, chunk: usize, total: usize) {
        let _ = (chunk, total);
    }

    /// Called when a chunk was inferred and parsed successfully.
    ///
    /// `output_chars` is the length of the raw model output for the chunk.
    fn on_chunk_complete(&self, chunk: usize, total: usize, output_chars: usize) {
        let _ = (chunk, total, output_chars);
    }

    /// Called when a chunk fails; the run aborts right after this event.
    fn on_chunk_error(&self, chunk: usize, total: usize, error: String) {
        let _ = (chunk, total, error);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl NoteProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::NotesConfig`].
pub type ProgressCallback = Arc<dyn NoteProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct TrackingCallback {
        stages: Mutex<Vec<PipelineStage>>,
        chunk_completes: AtomicUsize,
    }

    impl NoteProgressCallback for TrackingCallback {
        fn on_stage(&self, stage: PipelineStage) {
            self.stages.lock().unwrap().push(stage);
        }
        fn on_chunk_complete(&self, _chunk: usize, _total: usize, _chars: usize) {
            self.chunk_completes.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_stage(PipelineStage::LoadingModel);
        cb.on_chunk_start(1, 2);
        cb.on_chunk_complete(1, 2, 42);
        cb.on_chunk_error(2, 2, "bad shape".to_string());
    }

    #[test]
    fn tracking_callback_receives_events() {
        let cb = TrackingCallback {
            stages: Mutex::new(Vec::new()),
            chunk_completes: AtomicUsize::new(0),
        };
        cb.on_stage(PipelineStage::Chunking);
        cb.on_stage(PipelineStage::Prompting);
        cb.on_chunk_complete(1, 1, 10);

        assert_eq!(
            *cb.stages.lock().unwrap(),
            vec![PipelineStage::Chunking, PipelineStage::Prompting]
        );
        assert_eq!(cb.chunk_completes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn stage_display_labels() {
        assert_eq!(PipelineStage::LoadingModel.to_string(), "Loading Model");
        assert_eq!(PipelineStage::Saved.to_string(), "Saved");
    }

    #[test]
    fn arc_dyn_callback_is_send() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn NoteProgressCallback>();
        let cb: Arc<dyn NoteProgressCallback> = Arc::new(NoopProgressCallback);
        cb.on_stage(PipelineStage::Saved);
    }
}
