//! Grouping of the word-token stream into lines

use poster_common::WordToken;
use serde::{Deserialize, Serialize};

/// Non-empty run of words between two boundary tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    words: Vec<WordToken>,
}

impl Line {
    /// Returns `None` for an empty word list; lines are never empty.
    #[must_use]
    pub fn new(words: Vec<WordToken>) -> Option<Self> {
        if words.is_empty() {
            None
        } else {
            Some(Self { words })
        }
    }

    #[must_use]
    pub fn words(&self) -> &[WordToken] {
        &self.words
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Word texts in order
    #[must_use]
    pub fn texts(&self) -> Vec<String> {
        self.words.iter().map(|w| w.text.clone()).collect()
    }
}

/// Streaming line builder: feed tokens one at a time, then `finish`.
#[derive(Debug, Default)]
pub struct Segmenter {
    pending: Vec<WordToken>,
    lines: Vec<Line>,
}

impl Segmenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, token: WordToken) {
        if token.is_boundary() {
            // A boundary only closes a line when words are pending, so runs
            // of boundaries collapse.
            self.close();
        } else {
            self.pending.push(token);
        }
    }

    fn close(&mut self) {
        if let Some(line) = Line::new(std::mem::take(&mut self.pending)) {
            self.lines.push(line);
        }
    }

    /// Close any trailing words and return the lines
    #[must_use]
    pub fn finish(mut self) -> Vec<Line> {
        self.close();
        self.lines
    }
}

/// Split a token stream into lines. Total over any input.
#[must_use]
pub fn segment<I>(tokens: I) -> Vec<Line>
where
    I: IntoIterator<Item = WordToken>,
{
    let mut segmenter = Segmenter::new();
    for token in tokens {
        segmenter.push(token);
    }
    segmenter.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use poster_common::tokens_from_words;

    fn texts(lines: &[Line]) -> Vec<Vec<String>> {
        lines.iter().map(Line::texts).collect()
    }

    #[test]
    fn test_no_boundaries_yields_single_line() {
        let tokens = tokens_from_words(["Samedi", "10/05/2024", "14h00", "Bal"]);
        let lines = segment(tokens.clone());
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].words(), tokens.as_slice());
    }

    #[test]
    fn test_empty_stream_yields_no_lines() {
        assert!(segment(Vec::new()).is_empty());
    }

    #[test]
    fn test_only_boundaries_yield_no_lines() {
        assert!(segment(tokens_from_words(["", "", "", ""])).is_empty());
    }

    #[test]
    fn test_consecutive_boundaries_collapse() {
        let tokens = tokens_from_words(["", "", "a", "b", "", "", "", "c", ""]);
        assert_eq!(
            texts(&segment(tokens)),
            vec![vec!["a".to_string(), "b".to_string()], vec!["c".to_string()]]
        );
    }

    #[test]
    fn test_trailing_words_are_flushed() {
        let tokens = tokens_from_words(["a", "", "b", "c"]);
        let lines = segment(tokens);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].len(), 2);
    }

    #[test]
    fn test_sequence_indices_are_preserved() {
        let lines = segment(tokens_from_words(["", "x", "y"]));
        let indices: Vec<usize> = lines[0].words().iter().map(|w| w.sequence_index).collect();
        assert_eq!(indices, vec![1, 2]);
    }

    #[test]
    fn test_line_new_rejects_empty() {
        assert!(Line::new(Vec::new()).is_none());
    }
}
