//! Vindications: recognizable words found in otherwise random pages.

use serde::Serialize;
use std::collections::HashSet;

/// Shortest run of letters that counts as a word.
pub const MIN_WORD_LEN: usize = 4;

/// One dictionary word found on a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Vindication {
    pub word: String,
    /// Line index on the page
    pub line: usize,
    /// Character offset of the first letter
    pub start: usize,
    /// Character offset one past the last letter
    pub end: usize,
}

/// Scans pages for dictionary words.
///
/// Only maximal runs of `a`–`z` are looked up: `"xbook"` does not vindicate
/// `"book"`.
#[derive(Debug, Clone, Default)]
pub struct VindicationScanner {
    words: HashSet<String>,
}

impl VindicationScanner {
    /// Builds a scanner; words are lowercased and those under [`MIN_WORD_LEN`] letters dropped.
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| w.chars().count() >= MIN_WORD_LEN)
            .collect();
        Self { words }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Every vindication on the page, in reading order.
    pub fn scan<S: AsRef<str>>(&self, lines: &[S]) -> Vec<Vindication> {
        let mut found = Vec::new();
        for (line_idx, line) in lines.iter().enumerate() {
            let chars: Vec<char> = line.as_ref().chars().collect();
            let mut pos = 0;
            while pos < chars.len() {
                if !chars[pos].is_ascii_lowercase() {
                    pos += 1;
                    continue;
                }
                let start = pos;
                while pos < chars.len() && chars[pos].is_ascii_lowercase() {
                    pos += 1;
                }
                if pos - start < MIN_WORD_LEN {
                    continue;
                }
                let word: String = chars[start..pos].iter().collect();
                if self.words.contains(&word) {
                    found.push(Vindication {
                        word,
                        line: line_idx,
                        start,
                        end: pos,
                    });
                }
            }
        }
        found
    }
}
