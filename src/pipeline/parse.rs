//! Structured parsers: raw model output → typed per-method records.
//!
//! ## Why parsers instead of best-effort string surgery?
//!
//! The prompts *request* structure (pipe-delimited columns, numeric markers,
//! `%`-terminated map segments) but a small local model only *loosely* honours
//! the request. Malformed output is the common case, not the exception, so
//! every parser here is a small grammar with an explicit failure mode:
//! a wrong row-count remainder or an unparseable delimiter pattern is a
//! [`NotesError::StructuralMismatch`] tied to the offending chunk — never a
//! silent truncation.
//!
//! All parsers are pure functions over one chunk's output; the orchestrator
//! threads a [`ParsedNotes`] accumulator through the chunk loop.

use crate::error::NotesError;
use crate::method::MethodKind;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

// ── Record types ──────────────────────────────────────────────────────────

/// One Cornell entry: cue on the left, notes on the right, summary merged
/// across both columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CornellEntry {
    pub cue: String,
    pub note: String,
    pub summary: String,
}

/// One Charting row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartRow {
    pub topic: String,
    pub definition: String,
    pub example: String,
}

/// One directed edge of a mind map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapEdge {
    pub parent: String,
    pub child: String,
}

/// One `%`-delimited unit of Mapping output: the edge list for one diagram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapSegment {
    pub edges: Vec<MapEdge>,
}

impl MapSegment {
    /// Labels that appear as a parent but never as a child.
    ///
    /// A well-formed segment has exactly one; the parser stays lenient about
    /// it (see [`parse_mapping`]) so this mostly serves tests and diagnostics.
    pub fn root_labels(&self) -> Vec<&str> {
        self.edges
            .iter()
            .map(|e| e.parent.as_str())
            .filter(|p| !self.edges.iter().any(|e| e.child == *p))
            .collect::<std::collections::BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// The method-specific accumulator threaded through the chunk loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParsedNotes {
    Outline(String),
    Cornell(Vec<CornellEntry>),
    Boxing(Vec<String>),
    Charting(Vec<ChartRow>),
    Mapping(Vec<MapSegment>),
}

impl ParsedNotes {
    /// An empty accumulator for the given method.
    pub fn empty(method: MethodKind) -> Self {
        match method {
            MethodKind::Outline => ParsedNotes::Outline(String::new()),
            MethodKind::Cornell => ParsedNotes::Cornell(Vec::new()),
            MethodKind::Boxing => ParsedNotes::Boxing(Vec::new()),
            MethodKind::Charting => ParsedNotes::Charting(Vec::new()),
            MethodKind::Mapping => ParsedNotes::Mapping(Vec::new()),
        }
    }

    /// Append one chunk's records. Both sides always carry the same variant
    /// because both come from the same [`MethodKind`].
    pub fn extend(&mut self, chunk: ParsedNotes) {
        match (self, chunk) {
            (ParsedNotes::Outline(acc), ParsedNotes::Outline(s)) => acc.push_str(&s),
            (ParsedNotes::Cornell(acc), ParsedNotes::Cornell(v)) => acc.extend(v),
            (ParsedNotes::Boxing(acc), ParsedNotes::Boxing(v)) => acc.extend(v),
            (ParsedNotes::Charting(acc), ParsedNotes::Charting(v)) => acc.extend(v),
            (ParsedNotes::Mapping(acc), ParsedNotes::Mapping(v)) => acc.extend(v),
            _ => unreachable!("accumulator and chunk parse share one MethodKind"),
        }
    }
}

// ── Dispatch ──────────────────────────────────────────────────────────────

/// Parse one chunk's raw model output. `chunk` is 1-indexed for error reports.
pub fn parse_chunk(
    method: MethodKind,
    raw: &str,
    chunk: usize,
) -> Result<ParsedNotes, NotesError> {
    match method {
        MethodKind::Outline => Ok(ParsedNotes::Outline(raw.to_string())),
        MethodKind::Cornell => parse_cornell(raw, chunk).map(ParsedNotes::Cornell),
        MethodKind::Boxing => Ok(ParsedNotes::Boxing(parse_boxing(raw))),
        MethodKind::Charting => parse_charting(raw, chunk).map(ParsedNotes::Charting),
        MethodKind::Mapping => parse_mapping(raw, chunk).map(ParsedNotes::Mapping),
    }
}

// ── Shared helpers ────────────────────────────────────────────────────────

static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static RE_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());

/// Collapse every whitespace run to a single space.
fn normalise_whitespace(s: &str) -> String {
    RE_WHITESPACE.replace_all(s, " ").into_owned()
}

/// Split on numeric markers, keeping the markers.
///
/// Produces the alternation `[text, number, text, number, …, text]` with the
/// leading and trailing text pieces always present even when empty — the same
/// shape as a capture-group split. For n markers the result has `2n + 1`
/// pieces.
fn split_keeping_numbers(s: &str) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut last = 0;
    for m in RE_NUMBER.find_iter(s) {
        pieces.push(s[last..m.start()].to_string());
        pieces.push(m.as_str().to_string());
        last = m.end();
    }
    pieces.push(s[last..].to_string());
    pieces
}

// ── Cornell ───────────────────────────────────────────────────────────────

/// Cornell: whitespace-normalise, split on the numeric section markers the
/// prompt requests, and group into windows of 7:
/// `(lead, n, cue, n, note, n, summary)`. The numeric markers and the lead
/// piece are discarded. Any remainder is a structural mismatch.
pub fn parse_cornell(raw: &str, chunk: usize) -> Result<Vec<CornellEntry>, NotesError> {
    let normalised = normalise_whitespace(raw);
    let pieces = split_keeping_numbers(&normalised);

    if pieces.len() % 7 != 0 {
        return Err(NotesError::StructuralMismatch {
            method: MethodKind::Cornell,
            chunk,
            detail: format!(
                "{} pieces after numeric split is not a multiple of 7 \
                 (expected lead, marker, cue, marker, note, marker, summary groups)",
                pieces.len()
            ),
        });
    }

    Ok(pieces
        .chunks(7)
        .map(|w| CornellEntry {
            cue: w[2].trim().to_string(),
            note: w[4].trim().to_string(),
            summary: w[6].trim().to_string(),
        })
        .collect())
}

// ── Boxing ────────────────────────────────────────────────────────────────

/// `N. Heading | explanation` — a pipe the model put after the heading
/// despite the prompt. Rewritten to `N. Heading\nexplanation |` so the pipe
/// always trails the explanation before the split.
static RE_HEADING_PIPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+\.\s.+?) \| (.+)").unwrap());

/// Boxing: normalise stray pipe placement, split on `|`, strip the markdown
/// emphasis underscores small models sprinkle over headings, and drop
/// whitespace-only boxes left behind by a trailing delimiter.
pub fn parse_boxing(raw: &str) -> Vec<String> {
    let rewritten = RE_HEADING_PIPE.replace_all(raw, "$1\n$2 |");
    rewritten
        .split('|')
        .map(|b| b.replace('_', "").trim().to_string())
        .filter(|b| !b.is_empty())
        .collect()
}

// ── Charting ──────────────────────────────────────────────────────────────

/// Charting: whitespace-normalise, split on `|`, drop the single trailing
/// empty element a terminal delimiter produces, and group into
/// (topic, definition, example) triples. Any remainder is a mismatch.
pub fn parse_charting(raw: &str, chunk: usize) -> Result<Vec<ChartRow>, NotesError> {
    let normalised = normalise_whitespace(raw);
    let mut pieces: Vec<&str> = normalised.split('|').collect();

    if pieces.last().is_some_and(|p| p.trim().is_empty()) {
        pieces.pop();
    }
    if pieces.len() % 3 != 0 {
        return Err(NotesError::StructuralMismatch {
            method: MethodKind::Charting,
            chunk,
            detail: format!(
                "{} columns is not a multiple of 3 (expected topic | definition | example rows)",
                pieces.len()
            ),
        });
    }

    Ok(pieces
        .chunks(3)
        .map(|w| ChartRow {
            topic: w[0].trim().to_string(),
            definition: w[1].trim().to_string(),
            example: w[2].trim().to_string(),
        })
        .collect())
}

// ── Mapping ───────────────────────────────────────────────────────────────

static RE_EDGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\|([^|]+)\|\s*->\s*\|([^|]+)\|").unwrap());

/// Mapping: strip the attribution phrase and periods, whitespace-normalise,
/// split on `%` into independent map segments, and read `|Parent| -> |Child|`
/// edges from each.
///
/// A non-empty segment with no parseable edge is a structural mismatch.
/// Root uniqueness is deliberately NOT enforced: the prompt asks for a single
/// root but a multi-root graph still lays out fine, so a violation only gets
/// a warning and passes through.
pub fn parse_mapping(raw: &str, chunk: usize) -> Result<Vec<MapSegment>, NotesError> {
    let cleaned = raw.replace("Written by:", "").replace('.', "");
    let normalised = normalise_whitespace(&cleaned);

    let mut segments = Vec::new();
    for part in normalised.split('%') {
        if part.trim().is_empty() {
            continue;
        }
        let edges: Vec<MapEdge> = RE_EDGE
            .captures_iter(part)
            .map(|c| MapEdge {
                parent: c[1].trim().to_string(),
                child: c[2].trim().to_string(),
            })
            .collect();
        if edges.is_empty() {
            return Err(NotesError::StructuralMismatch {
                method: MethodKind::Mapping,
                chunk,
                detail: format!(
                    "map segment contains no |Parent| -> |Child| edges: {:?}",
                    part.trim().chars().take(60).collect::<String>()
                ),
            });
        }
        let segment = MapSegment { edges };
        let roots = segment.root_labels();
        if roots.len() != 1 {
            warn!(
                "chunk {chunk}: map segment has {} root nodes ({:?}), expected 1",
                roots.len(),
                roots
            );
        }
        segments.push(segment);
    }
    Ok(segments)
}
