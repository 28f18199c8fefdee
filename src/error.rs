//! Error types for the studyspark library.
//!
//! One taxonomy covers the whole pipeline. Parser and renderer failures are
//! never retried: re-running the model on identical input at identical
//! sampling settings would most likely reproduce the same malformed shape, so
//! a `StructuralMismatch` propagates straight to the orchestrator, which halts
//! the run and reports a single consolidated failure. Nothing partial is ever
//! persisted.

use crate::method::MethodKind;
use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the studyspark library.
#[derive(Debug, Error)]
pub enum NotesError {
    // ── Parse errors ──────────────────────────────────────────────────────
    /// Model output for one chunk violated the fixed structure the method's
    /// parser expects (wrong row-count remainder, unparseable delimiters).
    #[error("chunk {chunk}: {method} output does not match the expected structure: {detail}")]
    StructuralMismatch {
        method: MethodKind,
        /// 1-indexed chunk the malformed output came from.
        chunk: usize,
        detail: String,
    },

    /// A method name that is not one of the five known methods.
    ///
    /// Upstream selection is a closed enum, so this should be unreachable in
    /// practice; it exists for the defensive `FromStr` boundary.
    #[error("unknown note-taking method '{name}'\nExpected one of: outline, cornell, boxing, charting, mapping")]
    UnknownMethod { name: String },

    // ── Collaborator errors ───────────────────────────────────────────────
    /// The model call for a chunk failed after all retries.
    #[error("chunk {chunk}: model call failed after {retries} retries: {detail}")]
    ModelFailure {
        chunk: usize,
        retries: u32,
        detail: String,
    },

    /// The graph-layout collaborator rejected a diagram description.
    #[error("graph layout failed: {detail}")]
    GraphLayoutFailure { detail: String },

    /// Could not write the output document.
    #[error("failed to write document '{path}': {source}")]
    PersistenceFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Run-control errors ────────────────────────────────────────────────
    /// The cancellation token was triggered between chunks.
    #[error("run cancelled after {completed_chunks}/{total_chunks} chunks")]
    Cancelled {
        completed_chunks: usize,
        total_chunks: usize,
    },

    /// No [`crate::model::NoteModel`] was configured.
    #[error("no note model configured.\nSet one with NotesConfigBuilder::model(), e.g. LlamaServerModel::new(\"http://localhost:8080\")")]
    ModelNotConfigured,

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
