//! The cumulative output document and its persistence collaborators.
//!
//! [`Document`] is a typed, format-agnostic sequence of blocks. The renderers
//! in [`crate::pipeline::render`] append to it; nothing in the core pipeline
//! knows or cares what bytes eventually land on disk. Concrete file formats
//! are the business of a [`DocumentSink`] — the crate ships a Markdown sink
//! and a JSON sink, and applications can implement their own (a DOCX writer,
//! an HTML exporter) without touching the pipeline.

use crate::error::NotesError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Page orientation for diagram sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    Portrait,
    Landscape,
}

/// A rasterised mind-map page.
///
/// The PNG bytes are held in memory until a sink persists them; the sizing
/// hints describe how the image should be placed on a landscape page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagramPage {
    pub png: Vec<u8>,
    pub orientation: Orientation,
    pub width_inches: f32,
    pub height_inches: f32,
}

impl DiagramPage {
    /// A landscape page at the fixed 9×3 inch placement the renderers use.
    pub fn landscape(png: Vec<u8>) -> Self {
        Self {
            png,
            orientation: Orientation::Landscape,
            width_inches: 9.0,
            height_inches: 3.0,
        }
    }
}

/// One table row: either ordinary cells or a single cell merged across the
/// full table width (Cornell summaries).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableRow {
    Cells(Vec<String>),
    Merged(String),
}

/// A table with a fixed column count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub columns: usize,
    pub rows: Vec<TableRow>,
}

impl Table {
    pub fn new(columns: usize) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }
}

/// One block of the output document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Block {
    Paragraph(String),
    Table(Table),
    DiagramPage(DiagramPage),
}

/// The cumulative output artifact.
///
/// Built incrementally by the renderers and exclusively owned by the
/// orchestrator until persisted; callers only see it inside the final
/// [`crate::convert::NotesOutput`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    pub blocks: Vec<Block>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Persist through the given sink. Equivalent to `sink.persist(self, path)`.
    pub fn save(&self, sink: &dyn DocumentSink, path: &Path) -> Result<(), NotesError> {
        sink.persist(self, path)
    }
}

/// Persistence collaborator: writes a [`Document`] to disk in some format.
pub trait DocumentSink: Send + Sync {
    fn persist(&self, document: &Document, path: &Path) -> Result<(), NotesError>;
}

// ── Markdown sink ─────────────────────────────────────────────────────────

/// Renders the document as GitHub-flavoured Markdown.
///
/// Tables become GFM pipe tables; a merged row is rendered with its text in
/// the first cell and the remaining cells empty. Diagram pages are written as
/// sibling PNG files (`<stem>-diagram-<n>.png`) and referenced with image
/// links.
pub struct MarkdownSink;

impl MarkdownSink {
    /// Render to a Markdown string, using `image_names` (one per diagram
    /// block, in order) for image references.
    fn render(document: &Document, image_names: &[String]) -> String {
        let mut out = String::new();
        let mut diagram_idx = 0usize;

        for block in &document.blocks {
            match block {
                Block::Paragraph(text) => {
                    out.push_str(text.trim());
                    out.push_str("\n\n");
                }
                Block::Table(table) => {
                    // GFM needs a header row; emit an empty one plus separator.
                    let header: String =
                        std::iter::repeat("|   ").take(table.columns).collect::<String>() + "|\n";
                    let sep: String =
                        std::iter::repeat("| --- ").take(table.columns).collect::<String>()
                            + "|\n";
                    out.push_str(&header);
                    out.push_str(&sep);
                    for row in &table.rows {
                        match row {
                            TableRow::Cells(cells) => {
                                for col in 0..table.columns {
                                    let cell = cells.get(col).map(String::as_str).unwrap_or("");
                                    out.push_str("| ");
                                    out.push_str(&escape_pipes(cell));
                                    out.push(' ');
                                }
                                out.push_str("|\n");
                            }
                            TableRow::Merged(text) => {
                                out.push_str("| ");
                                out.push_str(&escape_pipes(text));
                                out.push(' ');
                                for _ in 1..table.columns {
                                    out.push_str("| ");
                                }
                                out.push_str("|\n");
                            }
                        }
                    }
                    out.push('\n');
                }
                Block::DiagramPage(_) => {
                    let name = image_names
                        .get(diagram_idx)
                        .cloned()
                        .unwrap_or_else(|| format!("diagram-{}.png", diagram_idx + 1));
                    diagram_idx += 1;
                    out.push_str(&format!("![Mind map {}]({})\n\n", diagram_idx, name));
                }
            }
        }

        let trimmed = out.trim_end();
        if trimmed.is_empty() {
            String::from("\n")
        } else {
            format!("{trimmed}\n")
        }
    }

    /// Render to a Markdown string without touching the filesystem.
    ///
    /// Diagram pages are referenced by their default sibling-file names; use
    /// [`DocumentSink::persist`] to actually write the image files.
    pub fn render_to_string(document: &Document) -> String {
        let names: Vec<String> = (1..=count_diagrams(document))
            .map(|i| format!("diagram-{i}.png"))
            .collect();
        Self::render(document, &names)
    }
}

fn count_diagrams(document: &Document) -> usize {
    document
        .blocks
        .iter()
        .filter(|b| matches!(b, Block::DiagramPage(_)))
        .count()
}

fn escape_pipes(cell: &str) -> String {
    cell.trim().replace('|', "\\|")
}

impl DocumentSink for MarkdownSink {
    fn persist(&self, document: &Document, path: &Path) -> Result<(), NotesError> {
        let io_err = |source: std::io::Error| NotesError::PersistenceFailure {
            path: path.to_path_buf(),
            source,
        };

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "notes".to_string());

        // Write diagram PNGs beside the markdown file.
        let mut names = Vec::new();
        let mut n = 0usize;
        for block in &document.blocks {
            if let Block::DiagramPage(page) = block {
                n += 1;
                let name = format!("{stem}-diagram-{n}.png");
                let img_path = path.with_file_name(&name);
                std::fs::write(&img_path, &page.png).map_err(io_err)?;
                names.push(name);
            }
        }

        std::fs::write(path, Self::render(document, &names)).map_err(io_err)
    }
}

// ── JSON sink ─────────────────────────────────────────────────────────────

/// Serialises the full typed document as pretty JSON.
pub struct JsonSink;

impl DocumentSink for JsonSink {
    fn persist(&self, document: &Document, path: &Path) -> Result<(), NotesError> {
        let json = serde_json::to_string_pretty(document).map_err(|e| {
            NotesError::PersistenceFailure {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
            }
        })?;
        std::fs::write(path, json).map_err(|source| NotesError::PersistenceFailure {
            path: path.to_path_buf(),
            source,
        })
    }
}
