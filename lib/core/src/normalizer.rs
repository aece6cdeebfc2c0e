//! Text normalization shared by index build and query time.
//!
//! Both paths must go through the same [`TextNormalizer`]; any drift between
//! them makes document and query vectors incomparable.

use crate::stopwords::StopWords;

#[derive(Debug, Clone, Default)]
pub struct TextNormalizer {
    stop_words: StopWords,
}

impl TextNormalizer {
    #[must_use]
    pub fn new(stop_words: StopWords) -> Self {
        Self { stop_words }
    }

    #[must_use]
    pub fn english() -> Self {
        Self::new(StopWords::english())
    }

    /// Lowercase, drop everything but ASCII letters and whitespace, split on
    /// whitespace and remove stop words.
    ///
    /// Digits and punctuation are deleted without inserting a separator, so
    /// `"co-operate"` becomes `"cooperate"` and `"24 minutes"` loses the `24`.
    pub fn tokens(&self, text: &str) -> Vec<String> {
        let cleaned: String = text
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_lowercase() || c.is_whitespace())
            .collect();

        cleaned
            .split_whitespace()
            .filter(|token| !self.stop_words.contains(token))
            .map(str::to_string)
            .collect()
    }

    /// Normalized text: the surviving tokens joined by single spaces.
    pub fn normalize(&self, text: &str) -> String {
        self.tokens(text).join(" ")
    }
}
