//! Text normalization
//!
//! Maps raw message bodies to a canonical form: lowercase ASCII letters
//! separated by single spaces, with links collapsed to the token `url`.

use regex::Regex;
use std::sync::OnceLock;

const URL_PATTERN: &str = r"http\S+";
const URL_REPLACEMENT: &str = " url ";

/// Regex-backed text normalizer
pub struct TextNormalizer {
    url: Regex,
}

impl TextNormalizer {
    /// Create a new normalizer
    pub fn new() -> Self {
        Self {
            url: Regex::new(URL_PATTERN).expect("URL pattern is a valid regex"),
        }
    }

    /// Normalize optional text; missing input yields an empty string
    pub fn normalize(&self, input: Option<&str>) -> String {
        match input {
            Some(text) => self.normalize_text(text),
            None => String::new(),
        }
    }

    /// Normalize a single message body
    pub fn normalize_text(&self, text: &str) -> String {
        let lowered = text.to_lowercase();
        let linked = self.url.replace_all(&lowered, URL_REPLACEMENT);

        let letters: String = linked
            .chars()
            .filter(|c| c.is_ascii_lowercase() || c.is_whitespace())
            .collect();

        letters.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

fn shared() -> &'static TextNormalizer {
    static NORMALIZER: OnceLock<TextNormalizer> = OnceLock::new();
    NORMALIZER.get_or_init(TextNormalizer::new)
}

/// Normalize optional text with the shared normalizer
pub fn normalize(input: Option<&str>) -> String {
    shared().normalize(input)
}

/// Normalize text with the shared normalizer
pub fn normalize_text(text: &str) -> String {
    shared().normalize_text(text)
}
