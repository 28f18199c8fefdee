//! # studyspark
//!
//! Turn long-form study text into structured notes with a locally-hosted
//! language model. Five classic note-taking methods are supported, each with
//! its own prompt, sampling preset, structured parser, and document renderer:
//!
//! | Method   | Output shape                                  |
//! |----------|-----------------------------------------------|
//! | Outline  | Hierarchical plain-text outline               |
//! | Cornell  | Two-column cue/note table with summary rows   |
//! | Boxing   | One-column table of labelled boxes            |
//! | Charting | Three-column topic/definition/example table   |
//! | Mapping  | Mind-map diagrams rendered via Graphviz       |
//!
//! ## Pipeline
//!
//! ```text
//! input text ──▶ chunk ──▶ infer ──▶ parse ──▶ render ──▶ persist
//!               (≤N chars) (model)  (typed)   (blocks)    (sink)
//! ```
//!
//! The input is split into whitespace-aligned chunks, each chunk is sent to
//! the model with the method's prompt and sampling preset, the raw output is
//! parsed into typed records (malformed output is an error, never a silent
//! truncation), and the accumulated records are rendered into a format-
//! agnostic [`Document`] that a [`DocumentSink`] writes to disk.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use studyspark::{generate_to_file, LlamaServerModel, MarkdownSink, MethodKind, NotesConfig};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), studyspark::NotesError> {
//! let config = NotesConfig::builder()
//!     .model(Arc::new(LlamaServerModel::new("http://localhost:8080")))
//!     .build()?;
//!
//! let text = std::fs::read_to_string("lecture.txt").unwrap();
//! let stats = generate_to_file(
//!     &text,
//!     MethodKind::Cornell,
//!     Path::new("notes.md"),
//!     &MarkdownSink,
//!     &config,
//! )
//! .await?;
//! println!("done: {} chunks in {}ms", stats.chunks, stats.total_duration_ms);
//! # Ok(())
//! # }
//! ```
//!
//! Collaborators are traits: implement [`NoteModel`] for a different model
//! runtime, [`GraphLayout`] for a different diagram engine, [`DocumentSink`]
//! for a different output format, and [`NoteProgressCallback`] to observe the
//! run from a UI.

pub mod cancel;
pub mod config;
pub mod convert;
pub mod document;
pub mod error;
pub mod graph;
pub mod method;
pub mod model;
pub mod pipeline;
pub mod progress;
pub mod prompts;

pub use cancel::CancelToken;
pub use config::{NotesConfig, NotesConfigBuilder};
pub use convert::{generate, generate_blocking, generate_to_file, NotesOutput, NotesStats};
pub use document::{
    Block, DiagramPage, Document, DocumentSink, JsonSink, MarkdownSink, Orientation, Table,
    TableRow,
};
pub use error::NotesError;
pub use graph::{GraphLayout, GraphLayoutError, GraphvizLayout};
pub use method::MethodKind;
pub use model::{InferenceOptions, LlamaServerModel, ModelError, NoteModel};
pub use pipeline::chunk::Chunker;
pub use pipeline::parse::{ChartRow, CornellEntry, MapEdge, MapSegment, ParsedNotes};
pub use progress::{NoopProgressCallback, NoteProgressCallback, PipelineStage, ProgressCallback};
