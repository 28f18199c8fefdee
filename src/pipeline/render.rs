//! Rendering stage: typed records → document blocks.
//!
//! One renderer per method, all appending to the shared cumulative
//! [`Document`]. Only the Mapping renderer touches a collaborator (the graph
//! layout); the rest are pure structure-to-structure transforms.

use crate::document::{Block, DiagramPage, Document, Table, TableRow};
use crate::error::NotesError;
use crate::graph::GraphLayout;
use crate::pipeline::parse::{MapSegment, ParsedNotes};
use tracing::debug;

/// Append the document blocks for `notes` to `document`.
pub fn render(
    document: &mut Document,
    notes: &ParsedNotes,
    graph: &dyn GraphLayout,
) -> Result<(), NotesError> {
    match notes {
        ParsedNotes::Outline(text) => {
            if !text.trim().is_empty() {
                document.push(Block::Paragraph(text.clone()));
            }
        }
        ParsedNotes::Cornell(entries) => {
            if !entries.is_empty() {
                let mut table = Table::new(2);
                for entry in entries {
                    table
                        .rows
                        .push(TableRow::Cells(vec![entry.cue.clone(), entry.note.clone()]));
                    table.rows.push(TableRow::Merged(entry.summary.clone()));
                }
                document.push(Block::Table(table));
            }
        }
        ParsedNotes::Boxing(boxes) => {
            if !boxes.is_empty() {
                let mut table = Table::new(1);
                for b in boxes {
                    table.rows.push(TableRow::Cells(vec![b.clone()]));
                }
                document.push(Block::Table(table));
            }
        }
        ParsedNotes::Charting(rows) => {
            if !rows.is_empty() {
                let mut table = Table::new(3);
                for row in rows {
                    table.rows.push(TableRow::Cells(vec![
                        row.topic.clone(),
                        row.definition.clone(),
                        row.example.clone(),
                    ]));
                }
                document.push(Block::Table(table));
            }
        }
        ParsedNotes::Mapping(segments) => {
            for segment in segments {
                let dot = segment_to_dot(segment);
                debug!("rendering mind-map segment with {} edges", segment.edges.len());
                let png = graph
                    .layout(&dot)
                    .map_err(|e| NotesError::GraphLayoutFailure {
                        detail: e.to_string(),
                    })?;
                document.push(Block::DiagramPage(DiagramPage::landscape(png)));
            }
        }
    }
    Ok(())
}

/// Build the DOT source for one mind-map segment.
fn segment_to_dot(segment: &MapSegment) -> String {
    let mut dot = String::from("digraph mind_map {\n  rankdir=TB;\n");
    for edge in &segment.edges {
        dot.push_str(&format!(
            "  \"{}\" -> \"{}\";\n",
            sanitize_label(&edge.parent),
            sanitize_label(&edge.child)
        ));
    }
    dot.push('}');
    dot
}

/// Strip characters that would break out of a quoted DOT node label.
fn sanitize_label(label: &str) -> String {
    label
        .chars()
        .filter(|c| !matches!(c, '"' | '\'' | '|' | ';'))
        .collect::<String>()
        .trim()
        .to_string()
}
