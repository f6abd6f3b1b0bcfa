//! Text preprocessing shared by every scorer.

/// Characters that terminate a sentence.
pub const SENTENCE_TERMINATORS: [char; 3] = ['.', '!', '?'];

/// Lowercase `text`, replace every non-word character with whitespace, and
/// split on whitespace.
///
/// Word characters are Unicode alphanumerics and `_`. An empty or
/// punctuation-only input yields no tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    let normalized: String = text
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| if is_word_char(c) { c } else { ' ' })
        .collect();
    normalized.split_whitespace().map(str::to_string).collect()
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Split on `.`, `!` and `?`, dropping fragments that are empty after
/// trimming.
pub fn sentences(text: &str) -> Vec<&str> {
    text.split(SENTENCE_TERMINATORS)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Whitespace-delimited word count of the raw text.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
