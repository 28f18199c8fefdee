//! The closed set of note-taking methods.
//!
//! Each [`MethodKind`] variant bundles everything that varies per method: the
//! prompt template sent to the model, the sampling preset for the inference
//! call, the parser that turns raw model output into a typed record, and the
//! renderer that appends the record to the document. Dispatching on a sum type
//! instead of comparing label strings makes the five-way branch exhaustive at
//! compile time; adding a sixth method is a compiler-guided change.

use crate::error::NotesError;
use crate::model::InferenceOptions;
use crate::prompts;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the five supported note-taking methods.
///
/// Selection is mutually exclusive: a run uses exactly one method for every
/// chunk of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MethodKind {
    /// Free-form hierarchical outline; output stays plain text.
    Outline,
    /// Cue / note / summary triples rendered as a two-column table.
    Cornell,
    /// Labelled boxes rendered as a one-column table.
    Boxing,
    /// Topic / definition / example triples rendered as a three-column table.
    Charting,
    /// Mind-map diagrams rendered as landscape image pages.
    Mapping,
}

impl MethodKind {
    /// All methods, in presentation order.
    pub const ALL: [MethodKind; 5] = [
        MethodKind::Outline,
        MethodKind::Cornell,
        MethodKind::Boxing,
        MethodKind::Charting,
        MethodKind::Mapping,
    ];

    /// Human-readable label, e.g. `"Cornell Method"`.
    pub fn label(&self) -> &'static str {
        match self {
            MethodKind::Outline => "Outline Method",
            MethodKind::Cornell => "Cornell Method",
            MethodKind::Boxing => "Boxing Method",
            MethodKind::Charting => "Charting Method",
            MethodKind::Mapping => "Mapping Method",
        }
    }

    /// Build the full prompt for one chunk of input text.
    pub fn prompt(&self, chunk: &str) -> String {
        match self {
            MethodKind::Outline => prompts::outline_prompt(chunk),
            MethodKind::Cornell => prompts::cornell_prompt(chunk),
            MethodKind::Boxing => prompts::boxing_prompt(chunk),
            MethodKind::Charting => prompts::charting_prompt(chunk),
            MethodKind::Mapping => prompts::mapping_prompt(chunk),
        }
    }

    /// The method's sampling preset.
    ///
    /// Presets are preserved verbatim from the original tuning so that output
    /// keeps its historical shape; the parsers depend on that shape.
    pub fn options(&self) -> InferenceOptions {
        prompts::preset(*self)
    }
}

impl fmt::Display for MethodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for MethodKind {
    type Err = NotesError;

    /// Accepts short names (`"cornell"`) and full labels (`"Cornell Method"`),
    /// case-insensitively. Anything else is [`NotesError::UnknownMethod`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "outline" | "outline method" => Ok(MethodKind::Outline),
            "cornell" | "cornell method" => Ok(MethodKind::Cornell),
            "boxing" | "boxing method" => Ok(MethodKind::Boxing),
            "charting" | "charting method" => Ok(MethodKind::Charting),
            "mapping" | "mapping method" => Ok(MethodKind::Mapping),
            _ => Err(NotesError::UnknownMethod { name: s.to_string() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_str_short_names() {
        for kind in MethodKind::ALL {
            let short = kind.label().split(' ').next().unwrap().to_lowercase();
            assert_eq!(short.parse::<MethodKind>().unwrap(), kind);
        }
    }

    #[test]
    fn from_str_full_label_case_insensitive() {
        assert_eq!(
            "cornell method".parse::<MethodKind>().unwrap(),
            MethodKind::Cornell
        );
        assert_eq!(
            "MAPPING".parse::<MethodKind>().unwrap(),
            MethodKind::Mapping
        );
    }

    #[test]
    fn from_str_unknown_is_error() {
        let err = "mindmap".parse::<MethodKind>().unwrap_err();
        assert!(matches!(err, NotesError::UnknownMethod { .. }));
    }

    #[test]
    fn prompt_embeds_chunk_text() {
        for kind in MethodKind::ALL {
            let p = kind.prompt("photosynthesis converts light to energy");
            assert!(
                p.contains("photosynthesis converts light to energy"),
                "{kind} prompt must embed the chunk"
            );
        }
    }
}
