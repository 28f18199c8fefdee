//! Chunking: split arbitrarily long input into bounded inference units.
//!
//! The budget is measured in characters, not tokens — a deliberately
//! conservative bound against the model's real context window that keeps this
//! stage independent of any tokenizer. Chunks break only at whitespace, never
//! mid-word, because a word split across two inference calls would be
//! summarised as two fragments.

use tracing::debug;

/// Splits text into chunks of at most `max_chars` characters.
#[derive(Debug, Clone, Copy)]
pub struct Chunker {
    max_chars: usize,
}

impl Chunker {
    /// A chunker with the given character budget (minimum 1).
    pub fn new(max_chars: usize) -> Self {
        Self {
            max_chars: max_chars.max(1),
        }
    }

    /// Lazily iterate the chunks of `text`.
    ///
    /// The iterator is finite and restartable — calling `split` again yields
    /// the same sequence. Empty (or all-whitespace) input yields an empty
    /// sequence. Whitespace runs inside a chunk are collapsed to single
    /// spaces; a single word longer than the budget is emitted as its own
    /// over-long chunk rather than split mid-word.
    pub fn split<'a>(&self, text: &'a str) -> Chunks<'a> {
        Chunks {
            words: text.split_whitespace(),
            pending: None,
            max_chars: self.max_chars,
        }
    }
}

/// Iterator over the chunks of one input text. Created by [`Chunker::split`].
pub struct Chunks<'a> {
    words: std::str::SplitWhitespace<'a>,
    /// A word read but not yet placed (it overflowed the previous chunk).
    pending: Option<&'a str>,
    max_chars: usize,
}

impl<'a> Iterator for Chunks<'a> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let first = self.pending.take().or_else(|| self.words.next())?;
        let mut chunk = String::with_capacity(self.max_chars.min(4096));
        chunk.push_str(first);

        for word in self.words.by_ref() {
            if chunk.len() + 1 + word.len() > self.max_chars {
                self.pending = Some(word);
                break;
            }
            chunk.push(' ');
            chunk.push_str(word);
        }

        debug!("chunk of {} chars", chunk.len());
        Some(chunk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_no_chunks() {
        assert_eq!(Chunker::new(100).split("").count(), 0);
        assert_eq!(Chunker::new(100).split("   \n\t ").count(), 0);
    }

    #[test]
    fn short_input_is_one_chunk() {
        let chunks: Vec<String> = Chunker::new(100).split("one two three").collect();
        assert_eq!(chunks, vec!["one two three"]);
    }

    #[test]
    fn no_chunk_exceeds_budget() {
        let text = "alpha beta gamma delta epsilon zeta eta theta iota kappa";
        for chunk in Chunker::new(12).split(text) {
            assert!(chunk.len() <= 12, "chunk {chunk:?} exceeds 12 chars");
        }
    }

    #[test]
    fn word_sequence_is_preserved() {
        let text = "  the quick\n brown   fox jumps over\tthe lazy dog  ";
        let joined: Vec<String> = Chunker::new(10)
            .split(text)
            .flat_map(|c| c.split(' ').map(str::to_string).collect::<Vec<_>>())
            .collect();
        let expected: Vec<String> = text.split_whitespace().map(str::to_string).collect();
        assert_eq!(joined, expected);
    }

    #[test]
    fn words_are_never_split() {
        let text = "antidisestablishmentarianism is a long word";
        for chunk in Chunker::new(15).split(text) {
            for word in chunk.split(' ') {
                assert!(text.split_whitespace().any(|w| w == word));
            }
        }
    }

    #[test]
    fn oversized_word_emitted_alone() {
        let chunks: Vec<String> = Chunker::new(5).split("tiny incomprehensible end").collect();
        assert_eq!(chunks, vec!["tiny", "incomprehensible", "end"]);
    }

    #[test]
    fn no_chunk_is_empty() {
        let text = "a b c d e f g h i j";
        assert!(Chunker::new(3).split(text).all(|c| !c.is_empty()));
    }

    #[test]
    fn restartable() {
        let chunker = Chunker::new(8);
        let text = "one two three four";
        let first: Vec<String> = chunker.split(text).collect();
        let second: Vec<String> = chunker.split(text).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn exact_boundary_fits() {
        // "ab cd" is exactly 5 chars — must be a single chunk at budget 5.
        let chunks: Vec<String> = Chunker::new(5).split("ab cd").collect();
        assert_eq!(chunks, vec!["ab cd"]);
    }
}
