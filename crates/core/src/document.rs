/// A submitted text with the counts the engine derives from it.
#[derive(Debug, Clone)]
pub struct TextDocument {
    text: String,
    word_count: usize,
    sentences: Vec<String>,
}

impl TextDocument {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let word_count = text.split_whitespace().count();
        let sentences = split_sentences(&text)
            .map(str::to_string)
            .collect();
        Self {
            text,
            word_count,
            sentences,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn word_count(&self) -> usize {
        self.word_count
    }

    pub fn sentences(&self) -> &[String] {
        &self.sentences
    }

    /// Words longer than three characters.
    pub fn significant_word_count(&self) -> usize {
        significant_words(&self.text)
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// blake3 of the raw text, hex encoded.
    pub fn content_hash(&self) -> String {
        blake3::hash(self.text.as_bytes()).to_hex().to_string()
    }
}

/// Trimmed, non-empty pieces between `.`, `!` and `?`.
pub fn split_sentences(text: &str) -> impl Iterator<Item = &str> {
    text.split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

pub fn significant_words(text: &str) -> usize {
    text.split_whitespace()
        .filter(|w| w.chars().count() > 3)
        .count()
}

/// Cut `text` to at most `max_chars` characters on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
