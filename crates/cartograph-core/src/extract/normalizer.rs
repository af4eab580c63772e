use regex::Regex;

/// Cleans raw document text before extraction.
///
/// Characters outside word characters, whitespace, CJK ideographs and basic
/// punctuation are stripped first, then whitespace runs collapse to a single
/// space and the ends are trimmed. Stripping before collapsing keeps the
/// operation idempotent: normalizing twice gives the same string.
pub struct TextNormalizer {
    disallowed: Regex,
    whitespace: Regex,
}

impl TextNormalizer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            disallowed: Regex::new(r"[^\w\s\u{4e00}-\u{9fff}.,!?;:]").unwrap(),
            whitespace: Regex::new(r"\s+").unwrap(),
        }
    }

    #[must_use]
    pub fn normalize(&self, text: &str) -> String {
        let stripped = self.disallowed.replace_all(text, "");
        let collapsed = self.whitespace.replace_all(&stripped, " ");
        collapsed.trim().to_string()
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}
