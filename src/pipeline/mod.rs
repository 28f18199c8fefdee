//! Pipeline stages for text-to-structured-notes generation.
//!
//! Each submodule implements exactly one transformation step. Keeping stages
//! separate makes each independently testable and lets us swap implementations
//! without touching other stages.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ chunk ──▶ infer ──▶ parse ──▶ render
//! (text)  (≤N chars)  (model)  (typed)   (document blocks)
//! ```
//!
//! 1. [`chunk`]  — split the input into bounded, whitespace-aligned chunks
//! 2. [`infer`]  — drive the model call per chunk with retry/backoff; the only
//!    stage with I/O
//! 3. [`parse`]  — per-method structured parsers; pure, malformed-tolerant in
//!    detection but strict in acceptance
//! 4. [`render`] — per-method renderers appending blocks to the cumulative
//!    [`crate::document::Document`]

pub mod chunk;
pub mod infer;
pub mod parse;
pub mod render;
