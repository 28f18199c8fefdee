//! Prompt templates and sampling presets for the five note-taking methods.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth** — the parsers in
//!    [`crate::pipeline::parse`] depend on the soft output conventions these
//!    prompts request (pipe delimiters, numeric markers, the `%` terminator).
//!    Template and parser live one import apart, so a change to either is easy
//!    to mirror in the other.
//!
//! 2. **Testability** — unit tests can inspect prompts and presets directly
//!    without a running model.
//!
//! The wording and the sampling presets are preserved from the original tuning.
//! Small models follow these formatting conventions only loosely, which is why
//! every prompt repeats its structural requirement and why the parsers treat
//! the output as untrusted.

use crate::method::MethodKind;
use crate::model::InferenceOptions;

/// Stop sequences shared by every method.
const COMMON_STOPS: [&str; 6] = ["Q:", "Question", "Answer", "End", "Response", "- ["];

/// Extra stops for the table-like methods (Cornell, Boxing, Charting, Mapping).
const STRUCTURED_STOPS: [&str; 2] = ["###", "<"];

/// Outline Method: hierarchical plain-text summary.
pub fn outline_prompt(chunk: &str) -> String {
    format!(
        "Q: Summarize the following text using the Outline Method.\n\
         Use ALL CAPS for main ideas, bullet points (\u{2022}) for subpoints,\n\
         hyphens (-) for further detail, and lowercase letters (a, b, c) for examples.\n\
         \n\
         Text:\n\
         {chunk}\n\
         \n\
         Outline:\n"
    )
}

/// Cornell Method: numbered cue / note / summary sections.
pub fn cornell_prompt(chunk: &str) -> String {
    format!(
        "Q: Take structured notes using the Cornell Method.\n\
         Create three numbered sections: 1. Cues (key questions or terms),\n\
         2. Notes (main ideas), and 3. Summary (brief conclusion).\n\
         \n\
         Text:\n\
         {chunk}\n\
         \n\
         A:\n"
    )
}

/// Boxing Method: labelled boxes separated by a trailing pipe.
pub fn boxing_prompt(chunk: &str) -> String {
    format!(
        "Q: Organize the following information using the Boxing Method.\n\
         \n\
         Group related concepts into clearly separated sections (boxes),\n\
         each with a label and a short 1-2 sentence explanation.\n\
         \n\
         Make sure the pipe (|) character appears at the very end of the explanation,\n\
         not after the heading.\n\
         \n\
         Repeat: the | should be at the end of the explanation sentence, not after\n\
         the title or anywhere else. Do not add the pipe after the heading/title.\n\
         \n\
         Text:\n\
         {chunk}\n\
         \n\
         A:\n"
    )
}

/// Charting Method: pipe-delimited three-column rows.
pub fn charting_prompt(chunk: &str) -> String {
    format!(
        "Q: Summarize the following content using the Charting Method. Use a three-column format:\n\
         Topic | Definition | Example |\n\
         \n\
         Each row must be separated by a newline, and each column by a pipe symbol.\n\
         Keep entries short, clear, and informative.\n\
         \n\
         Text:\n\
         {chunk}\n\
         \n\
         A:\n"
    )
}

/// Mapping Method: percent-terminated edge lists for a mind map.
pub fn mapping_prompt(chunk: &str) -> String {
    format!(
        "You are a helpful assistant that creates structured mind maps from educational or technical content.\n\
         \n\
         Given a topic, create a mind map with:\n\
         - One single root node at the top.\n\
         - Clear top-down structure (root -> subtopics -> details).\n\
         Format:\n\
         \n\
         |Root Node| -> |Subtopic 1|;\n\
         |Root Node| -> |Subtopic 2|;\n\
         |Subtopic 1| -> |Detail A|;\n\
         |Subtopic 1| -> |Detail B|;\n\
         |Subtopic 2| -> |Detail C|;\n\
         \n\
         Limit each detail and subtopic to 30 characters.\n\
         Only display the mind map. Do not display the author.\n\
         Add a percentage (%) character at the end of the text.\n\
         Text:\n\
         {chunk}\n"
    )
}

/// The sampling preset for a method.
///
/// Values are carried over verbatim per method: the parsers were tuned against
/// output produced at exactly these settings.
pub fn preset(method: MethodKind) -> InferenceOptions {
    let mut stop: Vec<String> = COMMON_STOPS.iter().map(|s| s.to_string()).collect();
    if method != MethodKind::Outline {
        stop.extend(STRUCTURED_STOPS.iter().map(|s| s.to_string()));
    }
    if method == MethodKind::Mapping {
        stop.push("Written by".to_string());
    }

    match method {
        MethodKind::Outline => InferenceOptions {
            max_tokens: 768,
            temperature: 0.3,
            top_p: 0.9,
            repeat_penalty: 1.1,
            stop,
        },
        MethodKind::Cornell | MethodKind::Boxing => InferenceOptions {
            max_tokens: 640,
            temperature: 0.3,
            top_p: 0.85,
            repeat_penalty: 1.05,
            stop,
        },
        MethodKind::Charting => InferenceOptions {
            max_tokens: 512,
            temperature: 0.3,
            top_p: 0.85,
            repeat_penalty: 1.05,
            stop,
        },
        MethodKind::Mapping => InferenceOptions {
            max_tokens: 768,
            temperature: 0.3,
            top_p: 0.85,
            repeat_penalty: 1.05,
            stop,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_match_historical_tuning() {
        let outline = preset(MethodKind::Outline);
        assert_eq!(outline.max_tokens, 768);
        assert_eq!(outline.top_p, 0.9);
        assert_eq!(outline.repeat_penalty, 1.1);

        let cornell = preset(MethodKind::Cornell);
        assert_eq!(cornell.max_tokens, 640);
        assert_eq!(cornell.top_p, 0.85);

        let charting = preset(MethodKind::Charting);
        assert_eq!(charting.max_tokens, 512);

        let mapping = preset(MethodKind::Mapping);
        assert_eq!(mapping.max_tokens, 768);
    }

    #[test]
    fn mapping_stops_include_attribution() {
        let stops = preset(MethodKind::Mapping).stop;
        assert!(stops.iter().any(|s| s == "Written by"));
    }

    #[test]
    fn outline_has_no_structured_stops() {
        let stops = preset(MethodKind::Outline).stop;
        assert!(!stops.iter().any(|s| s == "###"));
        assert!(stops.iter().any(|s| s == "Q:"));
    }

    #[test]
    fn structural_conventions_are_requested() {
        assert!(charting_prompt("x").contains("Topic | Definition | Example |"));
        assert!(mapping_prompt("x").contains("percentage (%)"));
        assert!(boxing_prompt("x").contains("end of the explanation"));
    }
}
