//! The orchestrator: chunk, infer, parse, render, persist.
//!
//! [`generate`] drives the whole pipeline for one `(text, method)` pair and
//! returns the typed [`Document`] plus run statistics; [`generate_to_file`]
//! additionally persists through a [`DocumentSink`]. Any chunk failure aborts
//! the run — nothing partial is ever returned or written.

use crate::config::NotesConfig;
use crate::document::{Document, DocumentSink};
use crate::error::NotesError;
use crate::graph::GraphvizLayout;
use crate::method::MethodKind;
use crate::pipeline::chunk::Chunker;
use crate::pipeline::infer::run_chunk;
use crate::pipeline::parse::{parse_chunk, ParsedNotes};
use crate::pipeline::render::render;
use crate::progress::PipelineStage;
use serde::Serialize;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Statistics for one completed run.
#[derive(Debug, Clone, Serialize)]
pub struct NotesStats {
    /// Number of chunks the input was split into.
    pub chunks: usize,
    /// Wall time spent in model calls and parsing, in milliseconds.
    pub infer_duration_ms: u64,
    /// Wall time spent rendering the document, in milliseconds.
    pub render_duration_ms: u64,
    /// Total wall time for the run, in milliseconds.
    pub total_duration_ms: u64,
    /// Total raw model output length across all chunks, in characters.
    pub output_chars: usize,
}

/// The result of a [`generate`] call: the document plus run statistics.
#[derive(Debug)]
pub struct NotesOutput {
    pub method: MethodKind,
    pub document: Document,
    pub stats: NotesStats,
}

/// Generate study notes for `text` using `method`.
///
/// Requires a model in the config ([`NotesError::ModelNotConfigured`]
/// otherwise). The graph collaborator defaults to [`GraphvizLayout`] and is
/// only exercised by [`MethodKind::Mapping`].
///
/// # Example
/// ```rust,no_run
/// use studyspark::{generate, LlamaServerModel, MethodKind, NotesConfig};
/// use std::sync::Arc;
///
/// # async fn run() -> Result<(), studyspark::NotesError> {
/// let config = NotesConfig::builder()
///     .model(Arc::new(LlamaServerModel::new("http://localhost:8080")))
///     .build()?;
/// let output = generate("lecture text...", MethodKind::Cornell, &config).await?;
/// println!("{} blocks", output.document.blocks.len());
/// # Ok(())
/// # }
/// ```
pub async fn generate(
    text: &str,
    method: MethodKind,
    config: &NotesConfig,
) -> Result<NotesOutput, NotesError> {
    let start = Instant::now();
    let model = config.model.clone().ok_or(NotesError::ModelNotConfigured)?;
    let stage = |s: PipelineStage| {
        if let Some(cb) = &config.progress_callback {
            cb.on_stage(s);
        }
    };

    stage(PipelineStage::LoadingModel);
    model.load().await.map_err(|e| NotesError::ModelFailure {
        chunk: 0,
        retries: 0,
        detail: e.to_string(),
    })?;

    stage(PipelineStage::Chunking);
    let chunks: Vec<String> = Chunker::new(config.chunk_chars).split(text).collect();
    let total = chunks.len();
    info!("{method}: {total} chunks of ≤{} chars", config.chunk_chars);

    stage(PipelineStage::Prompting);
    let infer_start = Instant::now();
    let mut notes = ParsedNotes::empty(method);
    let mut output_chars = 0usize;

    for (i, chunk_text) in chunks.iter().enumerate() {
        let index = i + 1;
        if config.cancel.is_cancelled() {
            return Err(NotesError::Cancelled {
                completed_chunks: i,
                total_chunks: total,
            });
        }
        if let Some(cb) = &config.progress_callback {
            cb.on_chunk_start(index, total);
        }

        let result = async {
            let raw = run_chunk(&model, method, chunk_text, index, config).await?;
            let parsed = parse_chunk(method, &raw, index)?;
            Ok::<(String, ParsedNotes), NotesError>((raw, parsed))
        }
        .await;

        match result {
            Ok((raw, parsed)) => {
                if let Some(cb) = &config.progress_callback {
                    cb.on_chunk_complete(index, total, raw.len());
                }
                output_chars += raw.len();
                notes.extend(parsed);
            }
            Err(e) => {
                if let Some(cb) = &config.progress_callback {
                    cb.on_chunk_error(index, total, e.to_string());
                }
                return Err(e);
            }
        }
    }
    let infer_duration_ms = infer_start.elapsed().as_millis() as u64;

    stage(PipelineStage::RenderingDocument);
    let render_start = Instant::now();
    let mut document = Document::new();
    match &config.graph {
        Some(graph) => render(&mut document, &notes, graph.as_ref())?,
        None => render(&mut document, &notes, &GraphvizLayout::new())?,
    }
    let render_duration_ms = render_start.elapsed().as_millis() as u64;

    let stats = NotesStats {
        chunks: total,
        infer_duration_ms,
        render_duration_ms,
        total_duration_ms: start.elapsed().as_millis() as u64,
        output_chars,
    };
    debug!(
        "{method}: {} blocks in {}ms",
        document.blocks.len(),
        stats.total_duration_ms
    );

    Ok(NotesOutput {
        method,
        document,
        stats,
    })
}

/// Generate study notes and persist them through `sink` at `path`.
///
/// Emits [`PipelineStage::Saved`] after the write succeeds and returns the run
/// statistics. On any failure, nothing is written.
pub async fn generate_to_file(
    text: &str,
    method: MethodKind,
    path: &Path,
    sink: &dyn DocumentSink,
    config: &NotesConfig,
) -> Result<NotesStats, NotesError> {
    let output = generate(text, method, config).await?;
    output.document.save(sink, path)?;
    if let Some(cb) = &config.progress_callback {
        cb.on_stage(PipelineStage::Saved);
    }
    info!("{method}: saved to {}", path.display());
    Ok(output.stats)
}

/// Blocking wrapper around [`generate`] for synchronous callers.
///
/// Spins up a dedicated tokio runtime for the call; do not use from inside an
/// async context.
pub fn generate_blocking(
    text: &str,
    method: MethodKind,
    config: &NotesConfig,
) -> Result<NotesOutput, NotesError> {
    let runtime = tokio::runtime::Runtime::new().map_err(|e| {
        NotesError::InvalidConfig(format!("failed to create tokio runtime: {e}"))
    })?;
    runtime.block_on(generate(text, method, config))
}
